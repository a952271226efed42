//! Error types for annalist modules using thiserror.

use thiserror::Error;

/// Errors from git operations.
#[derive(Error, Debug)]
pub enum GitError {
    #[error("Failed to open repository: {0}")]
    OpenRepository(#[source] git2::Error),

    #[error("Failed to find branch '{0}': {1}")]
    BranchNotFound(String, #[source] git2::Error),

    #[error("Failed to parse commit: {0}")]
    ParseCommit(#[source] git2::Error),

    #[error("Failed to walk commit history: {0}")]
    RevwalkError(#[source] git2::Error),

    #[error("Failed to enumerate tags: {0}")]
    TagEnumeration(#[source] git2::Error),

    #[error("Commit {hash} has invalid timestamp (seconds={seconds})")]
    InvalidTimestamp { hash: String, seconds: i64 },
}

/// Errors from issue tracker operations.
#[derive(Error, Debug)]
pub enum IssueTrackerError {
    #[error(
        "GitHub authentication failed: no valid auth found. Run 'gh auth login' or set GITHUB_TOKEN environment variable"
    )]
    AuthenticationFailed,

    #[error("Failed to fetch issue: {0}")]
    FetchIssue(#[source] Box<octocrab::Error>),

    #[error("Rate limited by GitHub API. Resets at: {reset_time}")]
    RateLimited { reset_time: String },

    #[error("Issue not found: {owner}/{repo}#{number}")]
    IssueNotFound {
        owner: String,
        repo: String,
        number: u64,
    },

    #[error("Failed to parse repository URL")]
    InvalidRepositoryUrl,

    #[error("All retry attempts failed: {0}")]
    RetriesExhausted(#[source] Box<IssueTrackerError>),
}

impl IssueTrackerError {
    /// Whether a failed lookup should only leave the reference unexpanded.
    ///
    /// Authentication and rate limit failures will hit every remaining lookup
    /// too, so they abort resolution of the current version instead.
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::AuthenticationFailed | Self::RateLimited { .. } => false,
            Self::RetriesExhausted(inner) => inner.is_recoverable(),
            _ => true,
        }
    }

    /// Whether retrying the same lookup could succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::FetchIssue(_))
    }
}

/// Errors from the local issue cache.
#[derive(Error, Debug)]
pub enum IssueCacheError {
    #[error("Failed to read issue records: {0}")]
    ReadFailed(#[source] std::io::Error),

    #[error("Failed to write issue records: {0}")]
    WriteFailed(#[source] std::io::Error),

    #[error("Issue records are not valid JSON: {0}")]
    ParseFailed(#[source] serde_json::Error),

    #[error("Failed to serialize issue records: {0}")]
    SerializeFailed(#[source] serde_json::Error),
}

/// Errors from configuration validation.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be specified")]
    MissingField(&'static str),

    #[error("{bound} is a commit bound but processing is set to versions")]
    CommitBoundInVersionMode { bound: &'static str },

    #[error("{bound} is a version bound but processing is set to commits")]
    VersionBoundInCommitMode { bound: &'static str },

    #[error("max_commits is 0 and no from_commit_id is set. No output would be produced")]
    NoCommitLimit,

    #[error("Invalid version tag pattern '{pattern}': {message}")]
    InvalidTagPattern { pattern: String, message: String },
}

/// Errors that stop a version history from being built.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum HistoryError {
    #[error(
        "Changelog has been set to process versions, but no versions exist using the configuration given"
    )]
    NoVersionsFound,

    #[error("to_version_id is set to '{version}', but no such version exists")]
    VersionNotFound { version: String },

    #[error("to_commit_id is set to '{commit}', but no such commit exists")]
    CommitNotFound { commit: String },
}

/// Errors from changelog output operations.
#[derive(Error, Debug)]
pub enum ChangelogError {
    #[error("Failed to write changelog: {0}")]
    WriteFailed(#[source] std::io::Error),

    #[error("Failed to create backup: {0}")]
    BackupFailed(#[source] std::io::Error),
}
