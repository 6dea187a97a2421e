//! Typed views over the raw completion service.
//!
//! The pipeline never talks to [`CompletionService`] directly; this module
//! shapes each call (prompt, options, reply parsing) and keeps the
//! JSON-with-line-fallback parsing in one place.

use std::sync::Arc;

use anyhow::Result;
use recap_llm::CompletionService;
use tracing::debug;

use crate::core::prompts;
use crate::models::{AuthorPreferences, CodebaseContext, FileEntry};

/// Reply of the architecture analysis call.
#[derive(Debug, Clone, Default, serde::Deserialize)]
pub struct ArchitecturalAnalysis {
    #[serde(default)]
    pub architecture: String,
    #[serde(default)]
    pub conventions: Vec<String>,
}

/// Typed completion calls used by the pipeline.
#[derive(Clone)]
pub struct AiService {
    completion: Arc<dyn CompletionService>,
}

impl AiService {
    pub fn new(completion: Arc<dyn CompletionService>) -> Self {
        Self { completion }
    }

    /// Ask for qualitative architecture/convention labels.
    ///
    /// Failures propagate; the orchestrator owns the fallback for this stage.
    pub async fn analyze_architecture(
        &self,
        file_types: &[String],
        patterns: &[String],
        commit_messages: &[String],
    ) -> Result<ArchitecturalAnalysis> {
        let user = prompts::architecture_user_prompt(file_types, patterns, commit_messages);
        let reply = self
            .completion
            .complete(prompts::ARCHITECTURE_SYSTEM, &user, prompts::architecture_options())
            .await?
            .unwrap_or_default();

        Ok(parse_architecture_reply(&reply))
    }

    /// Ask for contextual recommendations. Failures propagate; the context
    /// builder falls back to its deterministic rule set.
    pub async fn recommendations(
        &self,
        files: &[FileEntry],
        context: &CodebaseContext,
        preferences: &AuthorPreferences,
    ) -> Result<Vec<String>> {
        let user = prompts::recommendations_user_prompt(files, context, preferences);
        let reply = self
            .completion
            .complete(
                prompts::RECOMMENDATIONS_SYSTEM,
                &user,
                prompts::recommendation_options(),
            )
            .await?
            .unwrap_or_default();

        Ok(parse_recommendations_reply(&reply))
    }

    /// Ask for the narrative summary. `Ok(None)` means the provider produced
    /// no usable text and the generator should use its fallback template.
    pub async fn narrative_summary(
        &self,
        technical: &str,
        user: &str,
        historical: &str,
        architectural: &str,
    ) -> Result<Option<String>> {
        let prompt = prompts::summary_user_prompt(technical, user, historical, architectural);
        let reply = self
            .completion
            .complete(prompts::SUMMARY_SYSTEM, &prompt, prompts::summary_options())
            .await?;
        Ok(reply)
    }
}

/// Parse the architecture reply: JSON first, line-based fallback otherwise.
fn parse_architecture_reply(reply: &str) -> ArchitecturalAnalysis {
    if let Ok(parsed) = serde_json::from_str::<ArchitecturalAnalysis>(reply) {
        return ArchitecturalAnalysis {
            architecture: if parsed.architecture.is_empty() {
                "Unknown architecture".to_string()
            } else {
                parsed.architecture
            },
            conventions: parsed.conventions,
        };
    }

    debug!("Architecture reply was not JSON, falling back to line parsing");
    let mut lines = reply.lines().map(str::trim).filter(|l| !l.is_empty());
    let architecture = lines
        .next()
        .map(String::from)
        .unwrap_or_else(|| "Unknown architecture".to_string());
    let conventions = lines.map(strip_bullet).collect();

    ArchitecturalAnalysis {
        architecture,
        conventions,
    }
}

/// Parse the recommendation reply: JSON array first, lines otherwise (capped
/// at 3 in the fallback, matching the deterministic path).
fn parse_recommendations_reply(reply: &str) -> Vec<String> {
    if let Ok(parsed) = serde_json::from_str::<Vec<String>>(reply) {
        return parsed;
    }

    debug!("Recommendation reply was not JSON, falling back to line parsing");
    reply
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(strip_bullet)
        .take(3)
        .collect()
}

fn strip_bullet(line: &str) -> String {
    line.trim_start_matches(['-', '*']).trim_start().to_string()
}
