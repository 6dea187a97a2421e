//! Per-request orchestration of the summarization pipeline.
//!
//! Analyze, build context, generate, learn. Anything escaping those stages is
//! caught exactly once here and converted into a minimal deterministic
//! summary; `summarize` never fails and `submit_feedback` never surfaces an
//! error.

use std::collections::HashSet;
use std::sync::Arc;

use anyhow::Result;
use recap_llm::CompletionService;
use tracing::{error, info};

use crate::core::ai::AiService;
use crate::core::analyzer::CodebaseAnalyzer;
use crate::core::config::AnalysisConfig;
use crate::core::context::ContextBuilder;
use crate::core::generator::{self, SummaryGenerator, FALLBACK_FOOTER};
use crate::core::learning::{LearningService, LearningSummary};
use crate::core::memory::MemoryStore;
use crate::models::{ChangeStats, FileEntry, PullRequest};

/// Description excerpt length in the minimal fallback summary.
const DESCRIPTION_EXCERPT: usize = 200;

/// Aggregate store counts surfaced by [`SummaryAgent::status`].
#[derive(Debug, Clone, Default)]
pub struct MemoryStatus {
    pub author_count: usize,
    pub interaction_count: usize,
    pub has_codebase_context: bool,
}

/// Full status report for a repository.
#[derive(Debug, Clone, Default)]
pub struct AgentStatus {
    pub memory: MemoryStatus,
    pub learning: LearningSummary,
}

/// The summarization agent.
///
/// Explicitly constructed and passed by reference; tests run any number of
/// isolated instances side by side.
pub struct SummaryAgent {
    store: Arc<MemoryStore>,
    analyzer: CodebaseAnalyzer,
    builder: ContextBuilder,
    generator: SummaryGenerator,
    learning: LearningService,
}

impl SummaryAgent {
    pub fn new(
        store: Arc<MemoryStore>,
        completion: Arc<dyn CompletionService>,
        analysis: AnalysisConfig,
    ) -> Self {
        let ai = AiService::new(completion);
        Self {
            analyzer: CodebaseAnalyzer::new(ai.clone(), analysis),
            builder: ContextBuilder::new(ai.clone()),
            generator: SummaryGenerator::new(ai),
            learning: LearningService::new(store.clone()),
            store,
        }
    }

    /// Produce a summary for the change request. Never fails: pipeline errors
    /// degrade to the minimal fallback summary.
    pub async fn summarize(&self, pr: &PullRequest, files: &[FileEntry]) -> String {
        match self.run_pipeline(pr, files).await {
            Ok(summary) => summary,
            Err(err) => {
                error!(number = pr.number, %err, "Pipeline failed, emitting minimal fallback");
                minimal_fallback(pr, files)
            },
        }
    }

    async fn run_pipeline(&self, pr: &PullRequest, files: &[FileEntry]) -> Result<String> {
        let repo = pr.slug();

        // Memory reads
        let preferences = self.store.preferences(&pr.author).await;
        let historical = self.store.patterns(&repo).await;

        // Structural analysis; architecture-call failure propagates here
        let codebase_context = self.analyzer.analyze(pr, files).await?;

        // Context bundle and narrative
        let enhanced = self
            .builder
            .build(pr, files, &codebase_context, &preferences, &historical)
            .await;
        let summary = self.generator.generate(&enhanced).await;

        // Learn, then refresh the snapshot
        self.learning
            .record_interaction(pr, &summary, &preferences, &codebase_context)
            .await;
        self.store.update_context(&repo, codebase_context).await;

        info!(number = pr.number, %repo, "Generated summary");
        Ok(generator::append_file_changes(summary, files))
    }

    /// Feed author feedback into the learning service. Errors are logged,
    /// never surfaced past this boundary.
    pub async fn submit_feedback(&self, request_number: u64, feedback: &str, author: &str) {
        self.learning
            .process_feedback(request_number, feedback, author)
            .await;
    }

    /// Aggregate counts for a repository, with empty defaults when nothing is
    /// stored yet.
    pub async fn status(&self, repo: &str) -> AgentStatus {
        let history = self.store.history(Some(repo), None).await;
        let snapshot = self.store.context(repo).await;
        let learning = self.learning.learning_summary(repo).await;

        let author_count = history
            .iter()
            .map(|r| r.author.as_str())
            .collect::<HashSet<_>>()
            .len();

        AgentStatus {
            memory: MemoryStatus {
                author_count,
                interaction_count: history.len(),
                has_codebase_context: snapshot.exists(),
            },
            learning,
        }
    }
}

/// Minimal deterministic summary built directly from the file list and the
/// request's description, bypassing context and memory entirely.
fn minimal_fallback(pr: &PullRequest, files: &[FileEntry]) -> String {
    let stats = ChangeStats::from_files(files, pr.commits.len());

    let mut summary = format!(
        "This pull request \"{}\" introduces changes across {} modified files",
        pr.title, stats.modified
    );
    if stats.added > 0 {
        summary.push_str(&format!(", {} new files", stats.added));
    }
    if stats.deleted > 0 {
        summary.push_str(&format!(", and {} deleted files", stats.deleted));
    }
    summary.push_str(&format!(
        ", with a total of {} code changes.",
        stats.total_chunks
    ));

    if !pr.description.is_empty() {
        let excerpt: String = pr.description.chars().take(DESCRIPTION_EXCERPT).collect();
        let ellipsis = if pr.description.chars().count() > DESCRIPTION_EXCERPT {
            "..."
        } else {
            ""
        };
        summary.push_str(&format!(
            " The PR description indicates: \"{excerpt}{ellipsis}\""
        ));
    }

    summary.push_str("\n\n---\n");
    summary.push_str(FALLBACK_FOOTER);
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use recap_llm::{CompletionOptions, LlmError, LlmResult};
    use tempfile::tempdir;

    /// Completion stub: scripted replies, or failure for every call.
    struct ScriptedCompletion {
        replies: std::sync::Mutex<Vec<LlmResult<Option<String>>>>,
    }

    impl ScriptedCompletion {
        fn failing() -> Self {
            Self {
                replies: std::sync::Mutex::new(vec![]),
            }
        }

        fn with_replies(replies: Vec<LlmResult<Option<String>>>) -> Self {
            Self {
                replies: std::sync::Mutex::new(replies),
            }
        }
    }

    #[async_trait]
    impl CompletionService for ScriptedCompletion {
        async fn complete(
            &self,
            _system: &str,
            _user: &str,
            _options: CompletionOptions,
        ) -> LlmResult<Option<String>> {
            let mut replies = self.replies.lock().unwrap();
            if replies.is_empty() {
                Err(LlmError::Timeout { seconds: 60 })
            } else {
                replies.remove(0)
            }
        }
    }

    fn pr() -> PullRequest {
        PullRequest {
            owner: "acme".to_string(),
            repo: "widgets".to_string(),
            number: 42,
            title: "Improve caching".to_string(),
            description: "d".repeat(250),
            author: "alice".to_string(),
            commits: vec![],
        }
    }

    fn files(count: usize) -> Vec<FileEntry> {
        (0..count)
            .map(|i| FileEntry {
                origin_path: Some(format!("src/f{i}.rs")),
                result_path: Some(format!("src/f{i}.rs")),
                chunk_count: 2,
            })
            .collect()
    }

    fn make_agent(completion: Arc<dyn CompletionService>) -> (SummaryAgent, Arc<MemoryStore>, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let store = Arc::new(MemoryStore::load(dir.path().join("memory.json")));
        let agent = SummaryAgent::new(store.clone(), completion, AnalysisConfig::default());
        (agent, store, dir)
    }

    #[tokio::test]
    async fn test_summarize_all_calls_timing_out_yields_minimal_fallback() {
        let (agent, store, _dir) = make_agent(Arc::new(ScriptedCompletion::failing()));

        let summary = agent.summarize(&pr(), &files(2)).await;

        assert!(summary.contains("\"Improve caching\""));
        assert!(summary.contains("across 2 modified files"));
        assert!(summary.contains("4 code changes"));
        // description is truncated at 200 characters with an ellipsis
        assert!(summary.contains(&format!("{}...", "d".repeat(200))));
        assert!(summary.ends_with(FALLBACK_FOOTER));
        // the architecture call failed, so nothing was recorded or snapshotted
        assert!(store.history(None, None).await.is_empty());
        assert!(!store.context("acme/widgets").await.exists());
    }

    #[tokio::test]
    async fn test_summarize_fallback_template_when_only_summary_call_dies() {
        // architecture and recommendations succeed, narrative summary times out
        let completion = ScriptedCompletion::with_replies(vec![
            Ok(Some(
                r#"{"architecture": "layered", "conventions": ["tests first"]}"#.to_string(),
            )),
            Ok(Some(r#"["run the tests"]"#.to_string())),
            Err(LlmError::Timeout { seconds: 60 }),
        ]);
        let (agent, store, _dir) = make_agent(Arc::new(completion));

        let summary = agent.summarize(&pr(), &files(2)).await;

        assert!(summary.contains("This pull request introduces changes across 2 modified files"));
        assert!(summary.contains("1. run the tests"));
        assert!(summary.contains(FALLBACK_FOOTER));
        // the pipeline completed, so the interaction and snapshot were stored
        assert_eq!(store.history(None, None).await.len(), 1);
        assert!(store.context("acme/widgets").await.exists());
    }

    #[tokio::test]
    async fn test_summarize_ai_path_appends_file_list_and_footer() {
        let completion = ScriptedCompletion::with_replies(vec![
            Ok(Some(r#"{"architecture": "layered", "conventions": []}"#.to_string())),
            Ok(Some("[]".to_string())),
            Ok(Some("A thoughtful narrative about the change.".to_string())),
        ]);
        let (agent, _store, _dir) = make_agent(Arc::new(completion));

        let summary = agent.summarize(&pr(), &files(5)).await;

        assert!(summary.starts_with("A thoughtful narrative"));
        assert!(summary.contains(generator::AI_FOOTER));
        assert!(summary.contains("#### Files Changed"));
        assert!(summary.contains("- `src/f0.rs` 📝 (modified)"));
    }

    #[tokio::test]
    async fn test_status_defaults_then_reflects_interactions() {
        let (agent, _store, _dir) = make_agent(Arc::new(ScriptedCompletion::failing()));

        let status = agent.status("acme/widgets").await;
        assert_eq!(status.memory.author_count, 0);
        assert_eq!(status.memory.interaction_count, 0);
        assert!(!status.memory.has_codebase_context);
        assert!(status.learning.recent_feedback.is_empty());

        // a successful run populates the counters
        let completion = ScriptedCompletion::with_replies(vec![
            Ok(Some(r#"{"architecture": "x", "conventions": []}"#.to_string())),
            Ok(Some("[]".to_string())),
            Ok(Some("narrative".to_string())),
        ]);
        let (agent, _store, _dir) = make_agent(Arc::new(completion));
        agent.summarize(&pr(), &files(1)).await;

        let status = agent.status("acme/widgets").await;
        assert_eq!(status.memory.author_count, 1);
        assert_eq!(status.memory.interaction_count, 1);
        assert!(status.memory.has_codebase_context);
        assert_eq!(status.learning.total_interactions, 1);
    }

    #[tokio::test]
    async fn test_submit_feedback_never_errors_and_updates_preferences() {
        let (agent, store, _dir) = make_agent(Arc::new(ScriptedCompletion::failing()));

        agent
            .submit_feedback(42, "too detailed and too technical", "alice")
            .await;

        let prefs = store.preferences("alice").await;
        assert_eq!(prefs.detail_level, crate::models::DetailLevel::Low);
        assert_eq!(prefs.summary_style, crate::models::SummaryStyle::Narrative);
    }

    #[tokio::test]
    async fn test_repeated_config_changes_become_successful_pattern() {
        let make_completion = || {
            ScriptedCompletion::with_replies(vec![
                Ok(Some(r#"{"architecture": "x", "conventions": []}"#.to_string())),
                Ok(Some("[]".to_string())),
                Ok(Some("narrative".to_string())),
            ])
        };
        let dir = tempdir().unwrap();
        let store = Arc::new(MemoryStore::load(dir.path().join("memory.json")));

        let config_files = vec![FileEntry {
            origin_path: Some("config/app.toml".to_string()),
            result_path: Some("config/app.toml".to_string()),
            chunk_count: 1,
        }];

        for number in 1..=3 {
            let agent = SummaryAgent::new(
                store.clone(),
                Arc::new(make_completion()),
                AnalysisConfig::default(),
            );
            let mut request = pr();
            request.number = number;
            agent.summarize(&request, &config_files).await;
        }

        let patterns = store.patterns("acme/widgets").await;
        assert!(patterns
            .successful_patterns
            .iter()
            .any(|p| p == "configuration-change"));
    }
}
