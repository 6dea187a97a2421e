use std::env;
use std::sync::Arc;

use anyhow::{Context, Result};
use recap_llm::{OpenAiClient, OpenAiConfig};
use serde::Deserialize;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use recap_agent::clients::GitHubClient;
use recap_agent::core::config::Settings;
use recap_agent::utils::diff::{filter_excluded, parse_diff};
use recap_agent::{MemoryStore, SummaryAgent};

/// Actions worth summarizing; everything else is skipped quietly.
const SUPPORTED_ACTIONS: &[&str] = &["opened", "synchronize"];

#[derive(Debug, Deserialize)]
struct EventPayload {
    #[serde(default)]
    action: String,
    pull_request: EventPull,
    repository: EventRepository,
}

#[derive(Debug, Deserialize)]
struct EventPull {
    number: u64,
}

#[derive(Debug, Deserialize)]
struct EventRepository {
    name: String,
    owner: EventOwner,
}

#[derive(Debug, Deserialize)]
struct EventOwner {
    login: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting agentic code summarization");

    let settings = Settings::new()?;

    let event_path =
        env::var("GITHUB_EVENT_PATH").context("GITHUB_EVENT_PATH is not set")?;
    let raw_event = std::fs::read_to_string(&event_path)
        .with_context(|| format!("Failed to read event file {event_path}"))?;
    let event: EventPayload =
        serde_json::from_str(&raw_event).context("Failed to parse event payload")?;

    if !SUPPORTED_ACTIONS.contains(&event.action.as_str()) {
        info!(action = %event.action, "Unsupported event action, nothing to do");
        return Ok(());
    }

    let owner = event.repository.owner.login;
    let repo = event.repository.name;
    let number = event.pull_request.number;

    let github = GitHubClient::new(&settings.github.token, &settings.github.api_base);
    let pr = github.pull_request(&owner, &repo, number).await?;
    info!(number, title = %pr.title, "Analyzing pull request");

    let diff = github.diff(&owner, &repo, number).await?;
    if diff.is_empty() {
        info!("No diff found");
        return Ok(());
    }

    let files = filter_excluded(parse_diff(&diff), &settings.analysis.exclude);

    let completion = Arc::new(OpenAiClient::new(
        OpenAiConfig::new(&settings.openai.api_key, &settings.openai.model)
            .with_api_base(&settings.openai.api_base)
            .with_timeout_seconds(settings.openai.timeout_seconds),
    ));
    let store = Arc::new(MemoryStore::load(&settings.memory.path));
    let agent = SummaryAgent::new(store, completion, settings.analysis.clone());

    let summary = agent.summarize(&pr, &files).await;
    github.post_comment(&owner, &repo, number, &summary).await?;

    let status = agent.status(&pr.slug()).await;
    info!(
        authors = status.memory.author_count,
        interactions = status.memory.interaction_count,
        has_codebase_context = status.memory.has_codebase_context,
        common_patterns = ?status.learning.common_patterns,
        "Agent status"
    );

    Ok(())
}
