//! Adaptive, memory-backed change-request summarization.
//!
//! The agent combines structural analysis of a change, persisted long-term
//! memory about the author and the repository, and a feedback loop that lets
//! that memory evolve. The pipeline per request: analyze the change, merge
//! the memory reads into a context bundle, generate the narrative, then learn
//! from the interaction. Every external call degrades to a deterministic
//! fallback; a summary is always produced.

pub mod clients;
pub mod core;
pub mod models;
pub mod utils;

pub use crate::core::config::Settings;
pub use crate::core::memory::MemoryStore;
pub use crate::core::orchestrator::{AgentStatus, SummaryAgent};
