//! Prompt construction for the three completion calls the pipeline makes.

use recap_llm::CompletionOptions;

use crate::models::{AuthorPreferences, CodebaseContext, FileEntry};

/// System prompt for the architecture/convention analysis call.
pub const ARCHITECTURE_SYSTEM: &str = "You are an expert software architect. Analyze the \
    provided file types, patterns, and commit messages to identify architectural patterns \
    and coding conventions. Be concise and specific.";

/// System prompt for the recommendation call.
pub const RECOMMENDATIONS_SYSTEM: &str = "You are an expert code reviewer. Generate 2-3 \
    actionable recommendations based on the code changes and context provided. Focus on \
    practical improvements.";

/// System prompt for the narrative summary call.
pub const SUMMARY_SYSTEM: &str = "You are an intelligent code review agent with deep \
    contextual understanding and learning capabilities. You have access to:\n\n\
    1. **Technical Context**: Detailed analysis of the changes\n\
    2. **User Context**: Individual preferences and style requirements\n\
    3. **Historical Context**: Patterns from previous reviews and team preferences\n\
    4. **Architectural Context**: Understanding of the codebase structure and conventions\n\n\
    Your role is to generate comprehensive, contextual summaries that:\n\
    - Match the user's preferred style and detail level\n\
    - Consider historical patterns and team preferences\n\
    - Provide insights based on architectural understanding\n\
    - Focus on the \"why\" and \"how\" of the changes, not just the \"what\"\n\n\
    Write in a confident, technical tone. Format your response as a single, coherent \
    technical narrative that flows naturally from introduction to conclusion.";

pub fn architecture_user_prompt(
    file_types: &[String],
    patterns: &[String],
    commit_messages: &[String],
) -> String {
    format!(
        "Analyze this codebase:\n\
         File types: {}\n\
         Patterns: {}\n\
         Commit messages: {}\n\n\
         Provide a JSON response with:\n\
         {{\n  \"architecture\": \"brief architectural description\",\n  \
         \"conventions\": [\"convention1\", \"convention2\", \"convention3\"]\n}}",
        file_types.join(", "),
        patterns.join(", "),
        commit_messages.join("\n")
    )
}

pub fn recommendations_user_prompt(
    files: &[FileEntry],
    context: &CodebaseContext,
    preferences: &AuthorPreferences,
) -> String {
    format!(
        "Based on these changes and context, provide recommendations:\n\
         Changes: {} files modified\n\
         Tech stack: {}\n\
         Complexity: {}\n\
         Patterns: {}\n\
         User preferences: {} style, {} detail\n\n\
         Provide a JSON array of recommendations: \
         [\"recommendation1\", \"recommendation2\", \"recommendation3\"]",
        files.len(),
        context.tech_stack.join(", "),
        context.complexity,
        context.patterns.join(", "),
        preferences.summary_style,
        preferences.detail_level
    )
}

pub fn summary_user_prompt(
    technical: &str,
    user: &str,
    historical: &str,
    architectural: &str,
) -> String {
    format!(
        "Generate a comprehensive code review summary using the following context:\n\n\
         {technical}\n\n{user}\n\n{historical}\n\n{architectural}\n\n\
         Write a detailed technical narrative that explains the changes, their impact, \
         and any relevant architectural considerations."
    )
}

/// Sampling options for the architecture analysis call.
pub fn architecture_options() -> CompletionOptions {
    CompletionOptions {
        temperature: 0.3,
        max_tokens: 1024,
        seed: None,
    }
}

/// Sampling options for the recommendation call.
pub fn recommendation_options() -> CompletionOptions {
    CompletionOptions {
        temperature: 0.4,
        max_tokens: 1024,
        seed: None,
    }
}

/// Sampling options for the narrative summary call. Seeded, so repeated runs
/// over identical context stay comparable.
pub fn summary_options() -> CompletionOptions {
    CompletionOptions {
        temperature: 0.4,
        max_tokens: 4096,
        seed: Some(69),
    }
}
