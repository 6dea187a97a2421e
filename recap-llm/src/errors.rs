//! Error types for the completion client.

use thiserror::Error;

/// Errors that can occur during a completion round trip.
#[derive(Error, Debug)]
pub enum LlmError {
    /// Transport-level failure (connection refused, DNS, TLS, ...)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The provider answered with a non-success status
    #[error("API error (status {status}): {message}")]
    Api {
        /// HTTP status code returned by the provider
        status: u16,
        /// Error body, truncated by the client
        message: String,
    },

    /// The bounded request timeout elapsed
    #[error("Completion timed out after {seconds} seconds")]
    Timeout {
        /// Seconds waited before giving up
        seconds: u64,
    },

    /// The response carried no choices at all
    #[error("Completion response contained no choices")]
    EmptyChoices,

    /// Response body could not be deserialized
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
