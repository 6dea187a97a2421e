//! Durable memory store.
//!
//! All long-term state lives in one JSON document: author preferences,
//! per-repository pattern history, codebase context snapshots, and the
//! interaction log. The document is loaded wholesale at construction and
//! rewritten wholesale after every mutating call.
//!
//! Store operations are total: internal I/O failure degrades to an
//! empty/default value plus a logged warning, never an error to the caller.
//! All access goes through one async mutex, so concurrent mutations serialize
//! and every mutation flushes before the lock is released.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::models::{
    AuthorPreferences, CodebaseContext, ContextSnapshot, HistoricalPatterns, InteractionRecord,
    PatternUpdate, PreferenceUpdate,
};

/// Interaction log cap; oldest entries are evicted first.
const MAX_INTERACTIONS: usize = 1000;

/// The single persisted document.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct MemoryData {
    #[serde(default)]
    pub author_preferences: HashMap<String, AuthorPreferences>,
    #[serde(default)]
    pub historical_patterns: HashMap<String, HistoricalPatterns>,
    #[serde(default)]
    pub codebase_contexts: HashMap<String, CodebaseContext>,
    #[serde(default)]
    pub interaction_history: Vec<InteractionRecord>,
}

/// Process-wide memory store.
///
/// Explicitly constructed and passed by reference (usually behind an `Arc`);
/// tests can run any number of isolated instances against temp files.
pub struct MemoryStore {
    path: PathBuf,
    state: Mutex<MemoryData>,
}

impl MemoryStore {
    /// Load the store from `path`. A missing or corrupt backing file yields an
    /// empty store, never an error.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let data = Self::read_document(&path);
        Self {
            path,
            state: Mutex::new(data),
        }
    }

    fn read_document(path: &Path) -> MemoryData {
        if !path.exists() {
            debug!(path = %path.display(), "No memory file yet, starting fresh");
            return MemoryData::default();
        }

        match std::fs::read_to_string(path) {
            Ok(raw) => match serde_json::from_str(&raw) {
                Ok(data) => data,
                Err(err) => {
                    warn!(path = %path.display(), %err, "Corrupt memory file, starting fresh");
                    MemoryData::default()
                },
            },
            Err(err) => {
                warn!(path = %path.display(), %err, "Failed to read memory file, starting fresh");
                MemoryData::default()
            },
        }
    }

    /// Rewrite the whole document. Failure is logged, not surfaced; the
    /// in-memory state stays authoritative for the rest of the process.
    fn flush(&self, data: &MemoryData) {
        let serialized = match serde_json::to_string_pretty(data) {
            Ok(s) => s,
            Err(err) => {
                warn!(%err, "Failed to serialize memory store");
                return;
            },
        };
        if let Err(err) = std::fs::write(&self.path, serialized) {
            warn!(path = %self.path.display(), %err, "Failed to persist memory store");
        }
    }

    /// Scoped store session: acquire, read, return.
    async fn read<R>(&self, f: impl FnOnce(&MemoryData) -> R) -> R {
        let guard = self.state.lock().await;
        f(&guard)
    }

    /// Scoped store session: acquire, mutate, flush before release.
    ///
    /// The flush happens on every exit path of the closure; failures inside
    /// the closure travel out as ordinary return values, never skipping the
    /// flush.
    async fn mutate<R>(&self, f: impl FnOnce(&mut MemoryData) -> R) -> R {
        let mut guard = self.state.lock().await;
        let out = f(&mut guard);
        self.flush(&guard);
        out
    }

    /// Preferences for `author`, or the fixed default record if none are
    /// stored yet. The default is not persisted until first mutation.
    pub async fn preferences(&self, author: &str) -> AuthorPreferences {
        self.read(|data| {
            data.author_preferences
                .get(author)
                .cloned()
                .unwrap_or_default()
        })
        .await
    }

    /// Shallow-merge `update` onto the author's current preferences, then
    /// persist the entire store.
    pub async fn update_preferences(&self, author: &str, update: PreferenceUpdate) {
        self.mutate(|data| {
            let prefs = data
                .author_preferences
                .entry(author.to_string())
                .or_default();
            prefs.merge(update);
        })
        .await
    }

    /// Pattern history for `repo`, or an empty record.
    pub async fn patterns(&self, repo: &str) -> HistoricalPatterns {
        self.read(|data| {
            data.historical_patterns
                .get(repo)
                .cloned()
                .unwrap_or_default()
        })
        .await
    }

    /// Merge-then-flush for pattern history, same discipline as preferences.
    pub async fn update_patterns(&self, repo: &str, update: PatternUpdate) {
        self.mutate(|data| {
            let patterns = data
                .historical_patterns
                .entry(repo.to_string())
                .or_default();
            patterns.merge(update);
        })
        .await
    }

    /// Append to the interaction log, evicting the oldest entries beyond the
    /// cap.
    pub async fn record_interaction(&self, record: InteractionRecord) {
        self.mutate(|data| {
            data.interaction_history.push(record);
            if data.interaction_history.len() > MAX_INTERACTIONS {
                let excess = data.interaction_history.len() - MAX_INTERACTIONS;
                data.interaction_history.drain(0..excess);
            }
        })
        .await
    }

    /// The codebase snapshot for `repo`, as a three-state result: absent
    /// (never computed), present but empty, or present and populated.
    pub async fn context(&self, repo: &str) -> ContextSnapshot {
        self.read(|data| match data.codebase_contexts.get(repo) {
            None => ContextSnapshot::Absent,
            Some(ctx) if ctx.is_empty() => ContextSnapshot::Empty(ctx.clone()),
            Some(ctx) => ContextSnapshot::Populated(ctx.clone()),
        })
        .await
    }

    /// Replace the snapshot wholesale; snapshots are never merged.
    pub async fn update_context(&self, repo: &str, context: CodebaseContext) {
        self.mutate(|data| {
            data.codebase_contexts.insert(repo.to_string(), context);
        })
        .await
    }

    /// Filtered copy of the interaction log, oldest first.
    pub async fn history(
        &self,
        repo: Option<&str>,
        author: Option<&str>,
    ) -> Vec<InteractionRecord> {
        self.read(|data| {
            data.interaction_history
                .iter()
                .filter(|r| repo.is_none_or(|repo| r.repo == repo))
                .filter(|r| author.is_none_or(|author| r.author == author))
                .cloned()
                .collect()
        })
        .await
    }

    /// Attach feedback text to the author's most recent interaction for the
    /// given request, if one exists.
    pub async fn attach_feedback(&self, request_number: u64, author: &str, feedback: &str) {
        self.mutate(|data| {
            if let Some(record) = data
                .interaction_history
                .iter_mut()
                .rev()
                .find(|r| r.request_number == request_number && r.author == author)
            {
                record.feedback = Some(feedback.to_string());
            }
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Complexity, DetailLevel, SummaryStyle};
    use chrono::Utc;
    use tempfile::tempdir;

    fn record(repo: &str, author: &str, number: u64) -> InteractionRecord {
        InteractionRecord {
            timestamp: Utc::now(),
            request_number: number,
            author: author.to_string(),
            repo: repo.to_string(),
            summary: "summary".to_string(),
            feedback: None,
            preferences: AuthorPreferences::default(),
            codebase_context: CodebaseContext::default(),
        }
    }

    #[tokio::test]
    async fn test_preferences_default_until_updated() {
        let dir = tempdir().unwrap();
        let store = MemoryStore::load(dir.path().join("memory.json"));

        let prefs = store.preferences("alice").await;
        assert_eq!(prefs, AuthorPreferences::default());

        store
            .update_preferences(
                "alice",
                PreferenceUpdate {
                    detail_level: Some(DetailLevel::High),
                    ..Default::default()
                },
            )
            .await;

        let prefs = store.preferences("alice").await;
        assert_eq!(prefs.detail_level, DetailLevel::High);
        // unspecified fields keep their previous values
        assert_eq!(prefs.summary_style, SummaryStyle::Technical);
        assert!(prefs.include_suggestions);
    }

    #[tokio::test]
    async fn test_updates_survive_reload() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("memory.json");

        {
            let store = MemoryStore::load(&path);
            store
                .update_preferences(
                    "bob",
                    PreferenceUpdate {
                        summary_style: Some(SummaryStyle::Concise),
                        ..Default::default()
                    },
                )
                .await;
        }

        let store = MemoryStore::load(&path);
        assert_eq!(
            store.preferences("bob").await.summary_style,
            SummaryStyle::Concise
        );
    }

    #[tokio::test]
    async fn test_corrupt_file_starts_fresh() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("memory.json");
        std::fs::write(&path, "{not valid json").unwrap();

        let store = MemoryStore::load(&path);
        assert_eq!(store.preferences("alice").await, AuthorPreferences::default());
        assert!(store.history(None, None).await.is_empty());
    }

    #[tokio::test]
    async fn test_interaction_log_caps_at_1000_fifo() {
        let dir = tempdir().unwrap();
        let store = MemoryStore::load(dir.path().join("memory.json"));

        for i in 0..1005 {
            store.record_interaction(record("acme/widgets", "alice", i)).await;
        }

        let history = store.history(None, None).await;
        assert_eq!(history.len(), 1000);
        // oldest five were evicted
        assert_eq!(history.first().unwrap().request_number, 5);
        assert_eq!(history.last().unwrap().request_number, 1004);
    }

    #[tokio::test]
    async fn test_context_snapshot_three_states() {
        let dir = tempdir().unwrap();
        let store = MemoryStore::load(dir.path().join("memory.json"));

        assert_eq!(store.context("acme/widgets").await, ContextSnapshot::Absent);

        store
            .update_context("acme/widgets", CodebaseContext::default())
            .await;
        assert!(matches!(
            store.context("acme/widgets").await,
            ContextSnapshot::Empty(_)
        ));

        let populated = CodebaseContext {
            architecture: "layered".to_string(),
            patterns: vec!["source-code-change".to_string()],
            conventions: vec![],
            tech_stack: vec!["rs".to_string()],
            complexity: Complexity::Medium,
        };
        store.update_context("acme/widgets", populated.clone()).await;

        match store.context("acme/widgets").await {
            ContextSnapshot::Populated(ctx) => assert_eq!(ctx, populated),
            other => panic!("expected populated snapshot, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_context_is_replaced_not_merged() {
        let dir = tempdir().unwrap();
        let store = MemoryStore::load(dir.path().join("memory.json"));

        let first = CodebaseContext {
            architecture: "first".to_string(),
            patterns: vec!["a".to_string(), "b".to_string()],
            ..Default::default()
        };
        let second = CodebaseContext {
            architecture: "second".to_string(),
            patterns: vec!["c".to_string()],
            ..Default::default()
        };

        store.update_context("r", first).await;
        store.update_context("r", second.clone()).await;

        assert_eq!(
            store.context("r").await.into_context().unwrap(),
            second
        );
    }

    #[tokio::test]
    async fn test_history_filters() {
        let dir = tempdir().unwrap();
        let store = MemoryStore::load(dir.path().join("memory.json"));

        store.record_interaction(record("r1", "alice", 1)).await;
        store.record_interaction(record("r1", "bob", 2)).await;
        store.record_interaction(record("r2", "alice", 3)).await;

        assert_eq!(store.history(Some("r1"), None).await.len(), 2);
        assert_eq!(store.history(None, Some("alice")).await.len(), 2);
        assert_eq!(store.history(Some("r1"), Some("alice")).await.len(), 1);
    }

    #[tokio::test]
    async fn test_attach_feedback_targets_latest_matching_record() {
        let dir = tempdir().unwrap();
        let store = MemoryStore::load(dir.path().join("memory.json"));

        store.record_interaction(record("r1", "alice", 7)).await;
        store.record_interaction(record("r1", "alice", 7)).await;

        store.attach_feedback(7, "alice", "too long").await;

        let history = store.history(Some("r1"), Some("alice")).await;
        assert_eq!(history[0].feedback, None);
        assert_eq!(history[1].feedback.as_deref(), Some("too long"));
    }

    #[tokio::test]
    async fn test_stores_are_isolated_per_key() {
        let dir = tempdir().unwrap();
        let store = MemoryStore::load(dir.path().join("memory.json"));

        store
            .update_patterns(
                "r1",
                PatternUpdate {
                    common_changes: Some(vec!["test-modification".to_string()]),
                    ..Default::default()
                },
            )
            .await;

        assert!(store.patterns("r2").await.common_changes.is_empty());
        assert_eq!(
            store.patterns("r1").await.common_changes,
            vec!["test-modification".to_string()]
        );
    }
}
