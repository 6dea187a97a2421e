//! Persisted memory entities: author preferences, historical patterns,
//! codebase context snapshots, and the interaction log.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// How the narrative should read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SummaryStyle {
    Technical,
    Narrative,
    Concise,
}

impl fmt::Display for SummaryStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SummaryStyle::Technical => write!(f, "technical"),
            SummaryStyle::Narrative => write!(f, "narrative"),
            SummaryStyle::Concise => write!(f, "concise"),
        }
    }
}

/// How much detail the narrative should carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DetailLevel {
    Low,
    Medium,
    High,
}

impl fmt::Display for DetailLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DetailLevel::Low => write!(f, "low"),
            DetailLevel::Medium => write!(f, "medium"),
            DetailLevel::High => write!(f, "high"),
        }
    }
}

/// Structural complexity classification of a change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Complexity {
    Low,
    Medium,
    High,
}

impl fmt::Display for Complexity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Complexity::Low => write!(f, "low"),
            Complexity::Medium => write!(f, "medium"),
            Complexity::High => write!(f, "high"),
        }
    }
}

impl Default for Complexity {
    fn default() -> Self {
        Complexity::Low
    }
}

/// Per-author summarization preferences.
///
/// Created lazily with defaults on first read, mutated only by the learning
/// service, never deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthorPreferences {
    pub summary_style: SummaryStyle,
    pub focus_areas: Vec<String>,
    pub detail_level: DetailLevel,
    pub include_suggestions: bool,
    pub preferred_language: String,
}

impl Default for AuthorPreferences {
    fn default() -> Self {
        Self {
            summary_style: SummaryStyle::Technical,
            focus_areas: vec![
                "architecture".to_string(),
                "performance".to_string(),
                "security".to_string(),
            ],
            detail_level: DetailLevel::Medium,
            include_suggestions: true,
            preferred_language: "en".to_string(),
        }
    }
}

/// Partial view of [`AuthorPreferences`], shallow-merged onto the current
/// value by the memory store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PreferenceUpdate {
    pub summary_style: Option<SummaryStyle>,
    pub focus_areas: Option<Vec<String>>,
    pub detail_level: Option<DetailLevel>,
    pub include_suggestions: Option<bool>,
    pub preferred_language: Option<String>,
}

impl PreferenceUpdate {
    pub fn is_empty(&self) -> bool {
        self.summary_style.is_none()
            && self.focus_areas.is_none()
            && self.detail_level.is_none()
            && self.include_suggestions.is_none()
            && self.preferred_language.is_none()
    }
}

impl AuthorPreferences {
    /// Shallow merge: fields present in the update replace the current value.
    pub fn merge(&mut self, update: PreferenceUpdate) {
        if let Some(style) = update.summary_style {
            self.summary_style = style;
        }
        if let Some(areas) = update.focus_areas {
            self.focus_areas = areas;
        }
        if let Some(level) = update.detail_level {
            self.detail_level = level;
        }
        if let Some(include) = update.include_suggestions {
            self.include_suggestions = include;
        }
        if let Some(language) = update.preferred_language {
            self.preferred_language = language;
        }
    }
}

/// Per-repository pattern history.
///
/// `common_changes` is an ordered window of the pattern tags of recent
/// interactions, bounded to the most recent 20. Duplicates across interactions
/// are retained so that `successful_patterns` (tags seen at least 3 times
/// within the window) is computable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HistoricalPatterns {
    pub common_changes: Vec<String>,
    pub frequent_issues: Vec<String>,
    pub team_preferences: Vec<String>,
    pub successful_patterns: Vec<String>,
}

impl HistoricalPatterns {
    pub fn is_empty(&self) -> bool {
        self.common_changes.is_empty()
            && self.frequent_issues.is_empty()
            && self.team_preferences.is_empty()
    }
}

/// Partial view of [`HistoricalPatterns`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PatternUpdate {
    pub common_changes: Option<Vec<String>>,
    pub frequent_issues: Option<Vec<String>>,
    pub team_preferences: Option<Vec<String>>,
    pub successful_patterns: Option<Vec<String>>,
}

impl HistoricalPatterns {
    /// Shallow merge, same discipline as preference updates.
    pub fn merge(&mut self, update: PatternUpdate) {
        if let Some(changes) = update.common_changes {
            self.common_changes = changes;
        }
        if let Some(issues) = update.frequent_issues {
            self.frequent_issues = issues;
        }
        if let Some(prefs) = update.team_preferences {
            self.team_preferences = prefs;
        }
        if let Some(patterns) = update.successful_patterns {
            self.successful_patterns = patterns;
        }
    }
}

/// Structural snapshot of a repository, overwritten wholesale on each update.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CodebaseContext {
    pub architecture: String,
    pub patterns: Vec<String>,
    pub conventions: Vec<String>,
    pub tech_stack: Vec<String>,
    pub complexity: Complexity,
}

impl CodebaseContext {
    /// A snapshot with no derived signals at all.
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty() && self.conventions.is_empty() && self.tech_stack.is_empty()
    }
}

/// Presence of a codebase snapshot for a repository.
///
/// A snapshot that was never computed is distinguishable from one that was
/// computed and came back empty.
#[derive(Debug, Clone, PartialEq)]
pub enum ContextSnapshot {
    /// No snapshot has ever been stored for this repository.
    Absent,
    /// A snapshot exists but carries no derived signals.
    Empty(CodebaseContext),
    /// A snapshot exists with at least one derived signal.
    Populated(CodebaseContext),
}

impl ContextSnapshot {
    pub fn exists(&self) -> bool {
        !matches!(self, ContextSnapshot::Absent)
    }

    pub fn into_context(self) -> Option<CodebaseContext> {
        match self {
            ContextSnapshot::Absent => None,
            ContextSnapshot::Empty(ctx) | ContextSnapshot::Populated(ctx) => Some(ctx),
        }
    }
}

/// One immutable entry of the append-only interaction log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InteractionRecord {
    pub timestamp: DateTime<Utc>,
    pub request_number: u64,
    pub author: String,
    pub repo: String,
    pub summary: String,
    #[serde(default)]
    pub feedback: Option<String>,
    pub preferences: AuthorPreferences,
    pub codebase_context: CodebaseContext,
}
