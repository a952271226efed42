//! The issue tracker boundary.

use async_trait::async_trait;

use crate::error::IssueTrackerError;

use super::issue::Issue;

/// Keywords that close an issue when they precede its reference.
pub const CLOSING_KEYWORDS: [&str; 9] = [
    "close", "closes", "closed", "fix", "fixes", "fixed", "resolve", "resolves", "resolved",
];

/// Case-insensitive check against [`CLOSING_KEYWORDS`].
pub fn is_closing_keyword(word: &str) -> bool {
    let word = word.to_lowercase();
    CLOSING_KEYWORDS.contains(&word.as_str())
}

/// Remote issue lookups.
///
/// This abstraction allows mocking the issue tracker in tests.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IssueTracker: Send + Sync {
    /// Fetch one issue (or pull request) from `owner/repo`.
    async fn get_issue(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
    ) -> Result<Issue, IssueTrackerError>;

    /// Whether `word` marks the following reference as fixed by the commit.
    fn is_issue_fix_word(&self, word: &str) -> bool;
}
