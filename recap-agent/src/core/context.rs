//! Context bundle assembly.
//!
//! The four text blocks are pure renderings of already-available data with
//! fixed field orderings; only the recommendation step reaches out to the
//! completion service, and that step degrades to a deterministic rule set.

use tracing::warn;

use crate::core::ai::AiService;
use crate::models::{
    AuthorPreferences, ChangeStats, CodebaseContext, Complexity, FileEntry, HistoricalPatterns,
    PullRequest,
};

/// Paths that indicate a dependency manifest was touched.
const MANIFEST_MARKERS: &[&str] = &[
    "package.json",
    "Cargo.toml",
    "go.mod",
    "requirements.txt",
    "pyproject.toml",
];

/// Upper bound on fallback recommendations.
const MAX_FALLBACK_RECOMMENDATIONS: usize = 3;

/// The transient context bundle consumed by summary generation.
#[derive(Debug, Clone)]
pub struct EnhancedContext {
    pub technical_context: String,
    pub user_context: String,
    pub historical_context: String,
    pub architectural_context: String,
    pub recommendations: Vec<String>,
    pub stats: ChangeStats,
}

pub struct ContextBuilder {
    ai: AiService,
}

impl ContextBuilder {
    pub fn new(ai: AiService) -> Self {
        Self { ai }
    }

    pub async fn build(
        &self,
        pr: &PullRequest,
        files: &[FileEntry],
        codebase_context: &CodebaseContext,
        preferences: &AuthorPreferences,
        historical: &HistoricalPatterns,
    ) -> EnhancedContext {
        let stats = ChangeStats::from_files(files, pr.commits.len());

        let technical_context = technical_block(pr, stats);
        let user_context = user_block(preferences, &pr.author);
        let historical_context = historical_block(historical);
        let architectural_context = architectural_block(codebase_context);

        let recommendations = match self
            .ai
            .recommendations(files, codebase_context, preferences)
            .await
        {
            Ok(recommendations) => recommendations,
            Err(err) => {
                warn!(%err, "Recommendation call failed, using rule-based fallback");
                fallback_recommendations(files, codebase_context)
            },
        };

        EnhancedContext {
            technical_context,
            user_context,
            historical_context,
            architectural_context,
            recommendations,
            stats,
        }
    }
}

fn technical_block(pr: &PullRequest, stats: ChangeStats) -> String {
    let description = if pr.description.is_empty() {
        "No description provided"
    } else {
        &pr.description
    };

    format!(
        "Technical Analysis:\n\
         - Files modified: {}\n\
         - Files added: {}\n\
         - Files deleted: {}\n\
         - Files renamed: {}\n\
         - Total changes: {}\n\
         - Commit count: {}\n\
         - PR Title: \"{}\"\n\
         - PR Description: \"{}\"",
        stats.modified,
        stats.added,
        stats.deleted,
        stats.renamed,
        stats.total_chunks,
        stats.commit_count,
        pr.title,
        description
    )
}

fn user_block(preferences: &AuthorPreferences, author: &str) -> String {
    format!(
        "User Context ({author}):\n\
         - Preferred style: {}\n\
         - Focus areas: {}\n\
         - Detail level: {}\n\
         - Include suggestions: {}\n\
         - Language: {}",
        preferences.summary_style,
        preferences.focus_areas.join(", "),
        preferences.detail_level,
        preferences.include_suggestions,
        preferences.preferred_language
    )
}

fn historical_block(historical: &HistoricalPatterns) -> String {
    if historical.is_empty() {
        return "Historical Context:\n\
                - This appears to be a new repository or user with no historical patterns yet"
            .to_string();
    }

    format!(
        "Historical Context:\n\
         - Common changes: {}\n\
         - Frequent issues: {}\n\
         - Team preferences: {}\n\
         - Successful patterns: {}",
        first_three(&historical.common_changes),
        first_three(&historical.frequent_issues),
        first_three(&historical.team_preferences),
        first_three(&historical.successful_patterns)
    )
}

fn architectural_block(context: &CodebaseContext) -> String {
    format!(
        "Architecture Context:\n\
         - Architecture: {}\n\
         - Tech stack: {}\n\
         - Complexity: {}\n\
         - Patterns: {}\n\
         - Conventions: {}",
        context.architecture,
        join_or(&context.tech_stack, "Not identified"),
        context.complexity,
        join_or(&context.patterns, "None identified"),
        if context.conventions.is_empty() {
            "None identified".to_string()
        } else {
            first_three(&context.conventions)
        }
    )
}

fn first_three(values: &[String]) -> String {
    let joined = values
        .iter()
        .take(3)
        .cloned()
        .collect::<Vec<_>>()
        .join(", ");
    if joined.is_empty() {
        "None recorded".to_string()
    } else {
        joined
    }
}

fn join_or(values: &[String], fallback: &str) -> String {
    if values.is_empty() {
        fallback.to_string()
    } else {
        values.join(", ")
    }
}

/// Deterministic recommendations, evaluated in fixed priority order and
/// capped at three.
pub fn fallback_recommendations(files: &[FileEntry], context: &CodebaseContext) -> Vec<String> {
    let mut recommendations = Vec::new();

    if context.patterns.iter().any(|p| p == "test-modification") {
        recommendations
            .push("Consider running the test suite to ensure all tests pass".to_string());
    }
    if context.patterns.iter().any(|p| p == "configuration-change") {
        recommendations
            .push("Verify configuration changes don't break existing functionality".to_string());
    }
    if context.complexity == Complexity::High {
        recommendations
            .push("Consider breaking down this large change into smaller, focused PRs".to_string());
    }
    if files.iter().any(|f| {
        f.path()
            .is_some_and(|p| MANIFEST_MARKERS.iter().any(|m| p.contains(m)))
    }) {
        recommendations.push("Update documentation if new dependencies were added".to_string());
    }

    recommendations.truncate(MAX_FALLBACK_RECOMMENDATIONS);
    recommendations
}
