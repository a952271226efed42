//! annalist - generates change logs from git tags and the issues commits fix.
//!
//! # Overview
//!
//! annalist walks a branch newest-first, partitions its commits into versions
//! at tag boundaries, expands `#123` and `owner/repo#123` references into
//! links using an issue tracker, and groups the fixed issues by label.

pub mod changelog;
pub mod config;
pub mod error;
pub mod git;
pub mod history;
pub mod issues;

// Re-export commonly used types
pub use config::{ChangelogConfig, ChangelogConfigBuilder, LabelGroup, ProcessingMode, VersionTagFilter};
pub use error::{ChangelogError, ConfigError, GitError, HistoryError, IssueCacheError, IssueTrackerError};
pub use git::{Commit, Identity, Tag, TagKind};
pub use history::{VersionRecord, generate_history};
pub use issues::{GitHubTracker, Issue, IssueCache, IssueTracker};
