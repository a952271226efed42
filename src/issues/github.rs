//! GitHub issue lookups via octocrab.

use async_trait::async_trait;
use octocrab::Octocrab;
use tracing::debug;

use crate::error::IssueTrackerError;

use super::issue::Issue;
use super::retry::retry_with_backoff;
use super::tracker::{IssueTracker, is_closing_keyword};

/// Issue tracker backed by the GitHub REST API.
pub struct GitHubTracker {
    client: Octocrab,
}

impl GitHubTracker {
    /// Build a tracker authenticated with a personal token.
    pub fn new(token: &str) -> Result<Self, IssueTrackerError> {
        let client = Octocrab::builder()
            .personal_token(token.to_string())
            .build()
            .map_err(|e| IssueTrackerError::FetchIssue(Box::new(e)))?;
        Ok(Self { client })
    }

    /// Use a pre-configured octocrab client.
    ///
    /// This allows dependency injection for testing with mock servers.
    pub fn with_client(client: Octocrab) -> Self {
        Self { client }
    }

    async fn fetch_issue(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
    ) -> Result<Issue, IssueTrackerError> {
        debug!(owner, repo, number, "Fetching issue from GitHub");
        let issue = self
            .client
            .issues(owner, repo)
            .get(number)
            .await
            .map_err(|e| classify_error(e, owner, repo, number))?;

        Ok(Issue {
            number: issue.number,
            title: issue.title,
            body: issue.body,
            html_url: issue.html_url.to_string(),
            labels: issue.labels.into_iter().map(|l| l.name).collect(),
            pull_request: issue.pull_request.is_some(),
        })
    }
}

#[async_trait]
impl IssueTracker for GitHubTracker {
    async fn get_issue(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
    ) -> Result<Issue, IssueTrackerError> {
        retry_with_backoff(
            || self.fetch_issue(owner, repo, number),
            IssueTrackerError::is_transient,
            |e| IssueTrackerError::RetriesExhausted(Box::new(e)),
        )
        .await
    }

    fn is_issue_fix_word(&self, word: &str) -> bool {
        is_closing_keyword(word)
    }
}

/// Map an octocrab failure onto the tracker error taxonomy.
fn classify_error(e: octocrab::Error, owner: &str, repo: &str, number: u64) -> IssueTrackerError {
    // Check error content using both Display and Debug output
    // to handle different octocrab error formats
    let err_display = e.to_string();
    let err_debug = format!("{:?}", e);

    // GitHub returns 403 with a rate limit message
    if err_display.to_lowercase().contains("rate limit")
        || err_debug.to_lowercase().contains("rate limit")
    {
        return IssueTrackerError::RateLimited {
            reset_time: "unknown".to_string(),
        };
    }
    if err_display.contains("Bad credentials") || err_debug.contains("Bad credentials") {
        return IssueTrackerError::AuthenticationFailed;
    }
    if err_display.contains("Not Found") || err_debug.contains("Not Found") {
        return IssueTrackerError::IssueNotFound {
            owner: owner.to_string(),
            repo: repo.to_string(),
            number,
        };
    }
    IssueTrackerError::FetchIssue(Box::new(e))
}

/// Extract owner and repo from a git remote URL.
pub fn parse_github_remote(url: &str) -> Result<(String, String), IssueTrackerError> {
    // Handle SSH format: git@github.com:owner/repo.git
    if let Some(path) = url.strip_prefix("git@github.com:") {
        return parse_owner_repo_path(path);
    }

    // Handle HTTPS format: https://github.com/owner/repo.git
    if url.contains("github.com/") {
        let path = url
            .split("github.com/")
            .nth(1)
            .ok_or(IssueTrackerError::InvalidRepositoryUrl)?;
        return parse_owner_repo_path(path);
    }

    Err(IssueTrackerError::InvalidRepositoryUrl)
}

fn parse_owner_repo_path(path: &str) -> Result<(String, String), IssueTrackerError> {
    let path = path.strip_suffix(".git").unwrap_or(path);
    let parts: Vec<&str> = path.split('/').collect();

    if parts.len() >= 2 && !parts[0].is_empty() && !parts[1].is_empty() {
        Ok((parts[0].to_string(), parts[1].to_string()))
    } else {
        Err(IssueTrackerError::InvalidRepositoryUrl)
    }
}
