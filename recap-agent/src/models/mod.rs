//! Data models shared across the agent.

pub mod error;
pub mod memory;
pub mod pr;

pub use error::{AgentError, AgentResult};
pub use memory::{
    AuthorPreferences, CodebaseContext, Complexity, ContextSnapshot, DetailLevel,
    HistoricalPatterns, InteractionRecord, PatternUpdate, PreferenceUpdate, SummaryStyle,
};
pub use pr::{ChangeStats, Commit, FileEntry, PullRequest};
