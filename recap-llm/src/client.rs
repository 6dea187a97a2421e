//! OpenAI-compatible completion client over `reqwest`.

use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::errors::LlmError;
use crate::types::{ChatMessage, ChatRequest, ChatResponse, CompletionOptions};
use crate::{CompletionService, LlmResult};

/// Default API endpoint base.
const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";

/// How much of an error body to keep in [`LlmError::Api`].
const ERROR_BODY_LIMIT: usize = 512;

/// Configuration for [`OpenAiClient`].
#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    pub api_key: String,
    pub model: String,
    /// API base URL, without the trailing `/chat/completions`.
    pub api_base: String,
    /// Bound applied to every round trip.
    pub timeout_seconds: u64,
}

impl OpenAiConfig {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: model.into(),
            api_base: DEFAULT_API_BASE.to_string(),
            timeout_seconds: 60,
        }
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    pub fn with_timeout_seconds(mut self, seconds: u64) -> Self {
        self.timeout_seconds = seconds;
        self
    }
}

/// Chat completion client against an OpenAI-compatible endpoint.
pub struct OpenAiClient {
    config: OpenAiConfig,
    client: reqwest::Client,
}

impl OpenAiClient {
    pub fn new(config: OpenAiConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.config.api_base.trim_end_matches('/'))
    }

    async fn send(&self, request: &ChatRequest) -> LlmResult<ChatResponse> {
        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.config.api_key)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let mut body = response.text().await.unwrap_or_default();
            body.truncate(ERROR_BODY_LIMIT);
            return Err(LlmError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        Ok(response.json::<ChatResponse>().await?)
    }
}

#[async_trait]
impl CompletionService for OpenAiClient {
    async fn complete(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        options: CompletionOptions,
    ) -> LlmResult<Option<String>> {
        let request = ChatRequest {
            model: self.config.model.clone(),
            messages: vec![
                ChatMessage::system(system_prompt),
                ChatMessage::user(user_prompt),
            ],
            temperature: options.temperature,
            max_tokens: options.max_tokens,
            seed: options.seed,
        };

        debug!(
            model = %self.config.model,
            max_tokens = options.max_tokens,
            "Sending chat completion request"
        );

        let timeout = Duration::from_secs(self.config.timeout_seconds);
        let response = match tokio::time::timeout(timeout, self.send(&request)).await {
            Ok(result) => result?,
            Err(_) => {
                warn!(
                    seconds = self.config.timeout_seconds,
                    "Chat completion timed out"
                );
                return Err(LlmError::Timeout {
                    seconds: self.config.timeout_seconds,
                });
            },
        };

        if response.choices.is_empty() {
            return Err(LlmError::EmptyChoices);
        }

        Ok(response.text())
    }
}
