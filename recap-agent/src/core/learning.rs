//! Learning from interactions and feedback.
//!
//! Two independent write paths: pattern-history statistics after every
//! generated summary, and preference mutation driven by explicit feedback
//! text. Feedback interpretation is an ordered rule table; later rules
//! targeting the same field win, rules for different fields combine.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info};

use crate::core::memory::MemoryStore;
use crate::models::{
    AuthorPreferences, CodebaseContext, DetailLevel, InteractionRecord, PatternUpdate,
    PreferenceUpdate, PullRequest, SummaryStyle,
};

/// Pattern-history window size.
const PATTERN_WINDOW: usize = 20;

/// Occurrence count at which a tag becomes a successful pattern.
const SUCCESS_THRESHOLD: usize = 3;

/// How many feedback strings the learning summary surfaces.
const RECENT_FEEDBACK_LIMIT: usize = 5;

/// One feedback interpretation rule: any phrase match applies the action.
#[derive(Debug, Clone, Copy)]
enum RuleAction {
    Detail(DetailLevel),
    Style(SummaryStyle),
    Suggestions(bool),
    Focus(&'static str),
}

/// Fixed evaluation order; each rule sets at most one field.
const FEEDBACK_RULES: &[(&[&str], RuleAction)] = &[
    (&["too detailed", "too long"], RuleAction::Detail(DetailLevel::Low)),
    (&["not detailed enough", "too short"], RuleAction::Detail(DetailLevel::High)),
    (&["too technical", "too complex"], RuleAction::Style(SummaryStyle::Narrative)),
    (&["too casual", "more technical"], RuleAction::Style(SummaryStyle::Technical)),
    (&["concise", "brief"], RuleAction::Style(SummaryStyle::Concise)),
    (&["no suggestions", "skip recommendations"], RuleAction::Suggestions(false)),
    (&["need suggestions", "more recommendations"], RuleAction::Suggestions(true)),
    (&["focus on security"], RuleAction::Focus("security")),
    (&["focus on performance"], RuleAction::Focus("performance")),
];

/// Aggregate view surfaced by the status endpoint.
#[derive(Debug, Clone, Default)]
pub struct LearningSummary {
    pub total_interactions: usize,
    pub unique_authors: usize,
    pub common_patterns: Vec<String>,
    pub recent_feedback: Vec<String>,
}

pub struct LearningService {
    store: Arc<MemoryStore>,
}

impl LearningService {
    pub fn new(store: Arc<MemoryStore>) -> Self {
        Self { store }
    }

    /// Record the interaction and fold its pattern tags into the repository's
    /// history.
    pub async fn record_interaction(
        &self,
        pr: &PullRequest,
        summary: &str,
        preferences: &AuthorPreferences,
        codebase_context: &CodebaseContext,
    ) {
        let record = InteractionRecord {
            timestamp: Utc::now(),
            request_number: pr.number,
            author: pr.author.clone(),
            repo: pr.slug(),
            summary: summary.to_string(),
            feedback: None,
            preferences: preferences.clone(),
            codebase_context: codebase_context.clone(),
        };
        self.store.record_interaction(record).await;

        self.update_historical_patterns(&pr.slug(), codebase_context)
            .await;
    }

    /// Extend the pattern window with this interaction's tags, trim to the
    /// most recent 20, and recompute which tags have recurred enough to count
    /// as successful.
    async fn update_historical_patterns(&self, repo: &str, context: &CodebaseContext) {
        let current = self.store.patterns(repo).await;

        let mut window = current.common_changes;
        for pattern in &context.patterns {
            window.push(pattern.clone());
        }
        if window.len() > PATTERN_WINDOW {
            let excess = window.len() - PATTERN_WINDOW;
            window.drain(0..excess);
        }

        let successful = successful_patterns(&window);

        debug!(
            repo,
            window_len = window.len(),
            successful_count = successful.len(),
            "Updated historical patterns"
        );

        self.store
            .update_patterns(
                repo,
                PatternUpdate {
                    common_changes: Some(window),
                    successful_patterns: Some(successful),
                    ..Default::default()
                },
            )
            .await;
    }

    /// Interpret feedback text and merge the resulting preference update.
    pub async fn process_feedback(&self, request_number: u64, feedback: &str, author: &str) {
        let current = self.store.preferences(author).await;
        let update = interpret_feedback(&current, feedback);

        if update.is_empty() {
            debug!(author, "Feedback matched no preference rules");
        } else {
            self.store.update_preferences(author, update).await;
        }

        self.store
            .attach_feedback(request_number, author, feedback)
            .await;

        // Raw text is kept for inspection, not mined further.
        info!(
            request_number,
            author,
            feedback = %truncate(feedback, 100),
            "Learning from feedback"
        );
    }

    /// Aggregate counts for `status`.
    pub async fn learning_summary(&self, repo: &str) -> LearningSummary {
        let history = self.store.history(Some(repo), None).await;
        let patterns = self.store.patterns(repo).await;

        let unique_authors = history
            .iter()
            .map(|r| r.author.as_str())
            .collect::<HashSet<_>>()
            .len();

        let mut recent_feedback: Vec<String> = history
            .iter()
            .rev()
            .filter_map(|r| r.feedback.clone())
            .take(RECENT_FEEDBACK_LIMIT)
            .collect();
        recent_feedback.reverse();

        LearningSummary {
            total_interactions: history.len(),
            unique_authors,
            common_patterns: patterns.common_changes.iter().take(5).cloned().collect(),
            recent_feedback,
        }
    }
}

/// Tags occurring at least [`SUCCESS_THRESHOLD`] times within the window,
/// in order of first occurrence.
fn successful_patterns(window: &[String]) -> Vec<String> {
    let mut successful = Vec::new();
    for tag in window {
        if successful.contains(tag) {
            continue;
        }
        let count = window.iter().filter(|t| *t == tag).count();
        if count >= SUCCESS_THRESHOLD {
            successful.push(tag.clone());
        }
    }
    successful
}

/// Apply the rule table to lowercased feedback text.
fn interpret_feedback(current: &AuthorPreferences, feedback: &str) -> PreferenceUpdate {
    let text = feedback.to_lowercase();
    let mut update = PreferenceUpdate::default();

    for (phrases, action) in FEEDBACK_RULES {
        if !phrases.iter().any(|phrase| text.contains(phrase)) {
            continue;
        }
        match action {
            RuleAction::Detail(level) => update.detail_level = Some(*level),
            RuleAction::Style(style) => update.summary_style = Some(*style),
            RuleAction::Suggestions(include) => update.include_suggestions = Some(*include),
            RuleAction::Focus(area) => {
                let mut areas = update
                    .focus_areas
                    .clone()
                    .unwrap_or_else(|| current.focus_areas.clone());
                if !areas.iter().any(|a| a == area) {
                    areas.push((*area).to_string());
                    update.focus_areas = Some(areas);
                }
            },
        }
    }

    update
}

fn truncate(text: &str, limit: usize) -> String {
    if text.chars().count() <= limit {
        text.to_string()
    } else {
        let prefix: String = text.chars().take(limit).collect();
        format!("{prefix}...")
    }
}
