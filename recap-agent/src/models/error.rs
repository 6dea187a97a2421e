//! Agent-level error types.

use thiserror::Error;

/// Errors raised at the agent's collaborator boundaries.
///
/// The orchestrator converts anything escaping the pipeline into the minimal
/// fallback summary; these variants exist so the boundaries (GitHub, diff
/// parsing, configuration) stay typed on the way there.
#[derive(Error, Debug)]
pub enum AgentError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("GitHub API error (status {status}): {message}")]
    GitHub {
        status: u16,
        message: String,
    },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Completion error: {0}")]
    Completion(#[from] recap_llm::LlmError),

    #[error("Malformed diff: {0}")]
    Diff(String),

    #[error("Unsupported event action: {0}")]
    UnsupportedEvent(String),
}

pub type AgentResult<T> = Result<T, AgentError>;
