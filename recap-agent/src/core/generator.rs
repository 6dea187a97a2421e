//! Narrative summary generation with a deterministic fallback.
//!
//! The provenance footer distinguishes AI-backed output from fallback output
//! and must stay verbatim: readers rely on it to judge how the text was
//! produced.

use tracing::warn;

use crate::core::ai::AiService;
use crate::core::context::EnhancedContext;
use crate::models::{ChangeStats, FileEntry};

/// Footer of an AI-generated summary.
pub const AI_FOOTER: &str = "*Generated with enhanced AI context and learning capabilities*";

/// Footer of a deterministic fallback summary.
pub const FALLBACK_FOOTER: &str =
    "*Generated with enhanced AI context and learning capabilities (fallback mode)*";

/// Heading under which recommendations are listed.
const RECOMMENDATIONS_HEADING: &str = "## 🤖 AI Recommendations";

/// File count above which the files-changed appendix is attached.
const FILE_LIST_THRESHOLD: usize = 3;

pub struct SummaryGenerator {
    ai: AiService,
}

impl SummaryGenerator {
    pub fn new(ai: AiService) -> Self {
        Self { ai }
    }

    /// Produce the final narrative. Completion failure or an empty reply both
    /// select the fallback template; neither escapes this method.
    pub async fn generate(&self, context: &EnhancedContext) -> String {
        let reply = self
            .ai
            .narrative_summary(
                &context.technical_context,
                &context.user_context,
                &context.historical_context,
                &context.architectural_context,
            )
            .await;

        match reply {
            Ok(Some(summary)) => finish(summary, &context.recommendations, AI_FOOTER),
            Ok(None) => {
                warn!("Completion returned no text, using fallback template");
                fallback_summary(context)
            },
            Err(err) => {
                warn!(%err, "Completion failed, using fallback template");
                fallback_summary(context)
            },
        }
    }
}

/// Deterministic template built purely from the change counts.
pub fn fallback_summary(context: &EnhancedContext) -> String {
    let summary = fallback_body(context.stats);
    finish(summary, &context.recommendations, FALLBACK_FOOTER)
}

fn fallback_body(stats: ChangeStats) -> String {
    let mut summary = format!(
        "This pull request introduces changes across {} modified files",
        stats.modified
    );
    if stats.added > 0 {
        summary.push_str(&format!(", {} new files", stats.added));
    }
    if stats.deleted > 0 {
        summary.push_str(&format!(", and {} deleted files", stats.deleted));
    }
    summary.push_str(&format!(
        ", with a total of {} code changes. The modifications appear to be part of ongoing \
         development work to enhance the codebase functionality and structure.",
        stats.total_chunks
    ));
    summary
}

/// Append the numbered recommendation list and the provenance footer.
fn finish(mut summary: String, recommendations: &[String], footer: &str) -> String {
    if !recommendations.is_empty() {
        summary.push_str("\n\n");
        summary.push_str(RECOMMENDATIONS_HEADING);
        summary.push('\n');
        for (index, recommendation) in recommendations.iter().enumerate() {
            summary.push_str(&format!("\n{}. {}", index + 1, recommendation));
        }
    }

    summary.push_str("\n\n---\n");
    summary.push_str(footer);
    summary
}

/// Attach the files-changed appendix when the change touches more than a few
/// files.
pub fn append_file_changes(summary: String, files: &[FileEntry]) -> String {
    if files.len() <= FILE_LIST_THRESHOLD {
        return summary;
    }

    let mut lines = Vec::new();
    for file in files {
        if file.is_deleted() {
            if let Some(origin) = &file.origin_path {
                lines.push(format!("- `{origin}` 🗑️ (deleted)"));
            }
        } else if file.is_created() {
            if let Some(result) = &file.result_path {
                lines.push(format!("- `{result}` ✨ (new)"));
            }
        } else if file.is_renamed() {
            if let (Some(origin), Some(result)) = (&file.origin_path, &file.result_path) {
                lines.push(format!("- `{origin}` ➜ `{result}` 📝 (renamed)"));
            }
        } else if let Some(result) = &file.result_path {
            lines.push(format!("- `{result}` 📝 (modified)"));
        }
    }

    format!("{summary}\n\n#### Files Changed\n{}", lines.join("\n"))
}
