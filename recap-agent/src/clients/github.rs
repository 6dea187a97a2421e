//! GitHub REST client: pull-request metadata, raw diff, and comments.

use serde::Deserialize;
use tracing::{debug, info};

use crate::models::{AgentError, AgentResult, Commit, PullRequest};

const USER_AGENT: &str = concat!("recap-agent/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Deserialize)]
struct PullPayload {
    title: String,
    #[serde(default)]
    body: Option<String>,
    user: UserPayload,
}

#[derive(Debug, Deserialize)]
struct UserPayload {
    login: String,
}

#[derive(Debug, Deserialize)]
struct CommitPayload {
    sha: String,
    commit: CommitDetail,
}

#[derive(Debug, Deserialize)]
struct CommitDetail {
    message: String,
}

pub struct GitHubClient {
    client: reqwest::Client,
    token: String,
    api_base: String,
}

impl GitHubClient {
    pub fn new(token: impl Into<String>, api_base: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            token: token.into(),
            api_base: api_base.into(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.api_base.trim_end_matches('/'))
    }

    async fn check(response: reqwest::Response) -> AgentResult<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let message = response.text().await.unwrap_or_default();
        Err(AgentError::GitHub {
            status: status.as_u16(),
            message,
        })
    }

    /// Fetch pull-request metadata and its commit list.
    pub async fn pull_request(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
    ) -> AgentResult<PullRequest> {
        let response = self
            .client
            .get(self.url(&format!("/repos/{owner}/{repo}/pulls/{number}")))
            .bearer_auth(&self.token)
            .header("User-Agent", USER_AGENT)
            .send()
            .await?;
        let payload: PullPayload = Self::check(response).await?.json().await?;

        let response = self
            .client
            .get(self.url(&format!("/repos/{owner}/{repo}/pulls/{number}/commits")))
            .bearer_auth(&self.token)
            .header("User-Agent", USER_AGENT)
            .send()
            .await?;
        let commits: Vec<CommitPayload> = Self::check(response).await?.json().await?;

        debug!(owner, repo, number, commit_count = commits.len(), "Fetched pull request");

        Ok(PullRequest {
            owner: owner.to_string(),
            repo: repo.to_string(),
            number,
            title: payload.title,
            description: payload.body.unwrap_or_default(),
            author: payload.user.login,
            commits: commits
                .into_iter()
                .map(|c| Commit {
                    id: c.sha,
                    message: c.commit.message,
                })
                .collect(),
        })
    }

    /// Fetch the unified diff of a pull request.
    pub async fn diff(&self, owner: &str, repo: &str, number: u64) -> AgentResult<String> {
        let response = self
            .client
            .get(self.url(&format!("/repos/{owner}/{repo}/pulls/{number}")))
            .bearer_auth(&self.token)
            .header("User-Agent", USER_AGENT)
            .header("Accept", "application/vnd.github.v3.diff")
            .send()
            .await?;
        Ok(Self::check(response).await?.text().await?)
    }

    /// Post the summary as an issue comment.
    pub async fn post_comment(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
        body: &str,
    ) -> AgentResult<()> {
        let response = self
            .client
            .post(self.url(&format!("/repos/{owner}/{repo}/issues/{number}/comments")))
            .bearer_auth(&self.token)
            .header("User-Agent", USER_AGENT)
            .json(&serde_json::json!({ "body": body }))
            .send()
            .await?;
        Self::check(response).await?;
        info!(owner, repo, number, "Posted summary comment");
        Ok(())
    }
}
