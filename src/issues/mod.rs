//! Issue lookups: the tracker boundary, GitHub access and the local cache.

pub mod auth;
pub mod cache;
pub mod github;
pub mod issue;
pub mod retry;
pub mod tracker;

pub use auth::get_github_token;
pub use cache::IssueCache;
pub use github::{GitHubTracker, parse_github_remote};
pub use issue::{Issue, issue_url};
pub use tracker::{IssueTracker, is_closing_keyword};
