//! GitHub authentication detection.
//!
//! Auth order:
//! 1. `gh auth token` (gh CLI, when installed and logged in)
//! 2. GITHUB_TOKEN env var
//! 3. GH_TOKEN env var

use std::env;
use std::process::Command;

use tracing::debug;

use crate::error::IssueTrackerError;

/// Get a GitHub token using the configured auth strategy.
pub fn get_github_token() -> Result<String, IssueTrackerError> {
    if let Some(token) = get_token_from_gh_cli() {
        return Ok(token);
    }

    get_token_from_env().ok_or(IssueTrackerError::AuthenticationFailed)
}

/// GITHUB_TOKEN, then GH_TOKEN. Empty values are ignored.
fn get_token_from_env() -> Option<String> {
    ["GITHUB_TOKEN", "GH_TOKEN"]
        .iter()
        .filter_map(|name| env::var(name).ok())
        .find(|token| !token.is_empty())
}

/// Try to get a token from the gh CLI.
fn get_token_from_gh_cli() -> Option<String> {
    let gh = which::which("gh").ok()?;

    // First check if gh is authenticated
    let status = Command::new(&gh).args(["auth", "status"]).output().ok()?;
    if !status.status.success() {
        debug!("gh CLI found but not authenticated");
        return None;
    }

    let output = Command::new(&gh).args(["auth", "token"]).output().ok()?;
    if output.status.success() {
        let token = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if !token.is_empty() {
            return Some(token);
        }
    }

    None
}
