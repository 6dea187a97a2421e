//! Chat completion client for the recap summarization agent.
//!
//! This crate owns the boundary to the completion provider: the
//! [`CompletionService`] trait that the agent pipeline programs against, the
//! typed request/response models for OpenAI-compatible chat completion
//! endpoints, and the [`OpenAiClient`] implementation over `reqwest`.
//!
//! Every round trip is bounded by a timeout; a timeout surfaces as
//! [`LlmError::Timeout`] and callers are expected to treat it like any other
//! completion failure (fall back, never crash).

mod client;
mod errors;
mod types;

pub use client::{OpenAiClient, OpenAiConfig};
pub use errors::LlmError;
pub use types::{ChatChoice, ChatMessage, ChatRequest, ChatResponse, ChoiceMessage, CompletionOptions};

use async_trait::async_trait;

/// Result type for completion operations.
pub type LlmResult<T> = Result<T, LlmError>;

/// A fallible chat completion round trip.
///
/// `Ok(None)` means the provider answered but produced no usable text; the
/// caller decides whether that triggers a deterministic fallback.
#[async_trait]
pub trait CompletionService: Send + Sync {
    /// Send a system/user prompt pair and return the trimmed reply text.
    async fn complete(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        options: CompletionOptions,
    ) -> LlmResult<Option<String>>;
}
