//! Commit data and newest-first commit extraction.

use std::path::Path;

use chrono::{DateTime, TimeZone, Utc};
use git2::{BranchType, Repository, Signature};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::GitError;

/// Author or committer identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub name: String,
    pub email: String,
}

impl Identity {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
        }
    }

    fn from_signature(signature: &Signature<'_>) -> Self {
        Self {
            name: signature.name().unwrap_or("").to_string(),
            email: signature.email().unwrap_or("").to_string(),
        }
    }
}

/// A commit as read from the repository. Never mutated after extraction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commit {
    pub hash: String,
    pub message: String,
    pub author: Identity,
    pub committer: Identity,
    pub timestamp: DateTime<Utc>,
}

impl Commit {
    /// Create a Commit from a git2 Commit.
    pub fn from_git2_commit(commit: &git2::Commit) -> Result<Self, GitError> {
        let hash = commit.id().to_string();
        let time = commit.time();
        let timestamp = Utc.timestamp_opt(time.seconds(), 0).single().ok_or_else(|| {
            GitError::InvalidTimestamp {
                hash: hash.clone(),
                seconds: time.seconds(),
            }
        })?;

        Ok(Self {
            message: commit.message().unwrap_or("").to_string(),
            author: Identity::from_signature(&commit.author()),
            committer: Identity::from_signature(&commit.committer()),
            timestamp,
            hash,
        })
    }

    /// First line of the commit message.
    pub fn short_message(&self) -> &str {
        self.message.lines().next().unwrap_or("")
    }

    /// Abbreviated hash for display.
    pub fn short_hash(&self) -> &str {
        self.hash.get(..7).unwrap_or(&self.hash)
    }
}

/// Open the repository at `path`.
pub fn open_repository(path: &Path) -> Result<Repository, GitError> {
    Repository::open(path).map_err(GitError::OpenRepository)
}

/// Extract every commit reachable from `branch`, newest first.
pub fn fetch_commits(repo: &Repository, branch: &str) -> Result<Vec<Commit>, GitError> {
    let tip = resolve_branch(repo, branch)?;

    let mut revwalk = repo.revwalk().map_err(GitError::RevwalkError)?;
    revwalk
        .set_sorting(git2::Sort::TOPOLOGICAL | git2::Sort::TIME)
        .map_err(GitError::RevwalkError)?;
    revwalk.push(tip).map_err(GitError::RevwalkError)?;

    let mut commits = Vec::new();

    for oid_result in revwalk {
        let oid = oid_result.map_err(GitError::RevwalkError)?;
        let commit = repo.find_commit(oid).map_err(GitError::ParseCommit)?;
        commits.push(Commit::from_git2_commit(&commit)?);
    }

    debug!(branch, count = commits.len(), "Extracted commits");
    Ok(commits)
}

/// Resolve a branch name to the OID of its tip commit.
///
/// Local branches are tried first; anything else `revparse` understands
/// (remote branches, `HEAD`) is accepted as a fallback.
fn resolve_branch(repo: &Repository, branch: &str) -> Result<git2::Oid, GitError> {
    if let Ok(local) = repo.find_branch(branch, BranchType::Local) {
        if let Some(oid) = local.get().target() {
            return Ok(oid);
        }
    }

    repo.revparse_single(branch)
        .and_then(|obj| obj.peel_to_commit())
        .map(|commit| commit.id())
        .map_err(|e| GitError::BranchNotFound(branch.to_string(), e))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_commit(hash: &str, message: &str) -> Commit {
        Commit {
            hash: hash.to_string(),
            message: message.to_string(),
            author: Identity::new("Test User", "test@example.com"),
            committer: Identity::new("Test User", "test@example.com"),
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn test_short_message_is_first_line() {
        let commit = make_commit("abc", "Fix widget\n\nLonger explanation");
        assert_eq!(commit.short_message(), "Fix widget");
    }

    #[test]
    fn test_short_message_empty() {
        let commit = make_commit("abc", "");
        assert_eq!(commit.short_message(), "");
    }

    #[test]
    fn test_short_hash_truncates() {
        let commit = make_commit("0123456789abcdef", "msg");
        assert_eq!(commit.short_hash(), "0123456");
    }

    #[test]
    fn test_short_hash_keeps_short_ids() {
        let commit = make_commit("c0", "msg");
        assert_eq!(commit.short_hash(), "c0");
    }
}
