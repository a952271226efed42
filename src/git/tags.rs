//! Tag data, pseudo-tags and tag enumeration.

use chrono::{DateTime, TimeZone, Utc};
use git2::Repository;
use semver::Version;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::GitError;

use super::commits::{Commit, Identity};

/// What a tag marks.
///
/// `CurrentBuild` and `CommitRange` are synthesized while building a history
/// and never written back to the repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TagKind {
    Version,
    CurrentBuild,
    CommitRange,
}

impl TagKind {
    pub fn is_pseudo(&self) -> bool {
        !matches!(self, Self::Version)
    }
}

/// A tag attached to a commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub name: String,
    pub kind: TagKind,
    pub release_date: DateTime<Utc>,
    pub commit_date: DateTime<Utc>,
    pub tagger: Identity,
    pub description: String,
    pub commit_hash: String,
}

impl Tag {
    /// Pseudo-tag for an untagged latest commit.
    pub fn current_build(commit: &Commit, name: &str) -> Self {
        Self::pseudo(
            commit,
            name,
            TagKind::CurrentBuild,
            "Pseudo tag on latest commit",
        )
    }

    /// Pseudo-tag used as the boundary of a plain commit range.
    pub fn commit_range(commit: &Commit) -> Self {
        Self::pseudo(
            commit,
            "Commit range",
            TagKind::CommitRange,
            "Pseudo tag on range of commits",
        )
    }

    fn pseudo(commit: &Commit, name: &str, kind: TagKind, description: &str) -> Self {
        Self {
            name: name.to_string(),
            kind,
            release_date: commit.timestamp,
            commit_date: commit.timestamp,
            tagger: commit.committer.clone(),
            description: description.to_string(),
            commit_hash: commit.hash.clone(),
        }
    }

    /// The path segment used when linking to the repository tree.
    ///
    /// Real tags route to themselves; pseudo-tags have no ref of their own and
    /// route to the branch being processed.
    pub fn url_segment<'a>(&'a self, branch: &'a str) -> &'a str {
        if self.kind.is_pseudo() { branch } else { &self.name }
    }
}

/// Get all tags from the repository, resolved to the commits they mark.
///
/// Annotated tags contribute their tagger, message and tagging time;
/// lightweight tags fall back to the commit's committer and time.
pub fn get_all_tags(repo: &Repository) -> Result<Vec<Tag>, GitError> {
    let mut raw = Vec::new();

    repo.tag_foreach(|oid, name_bytes| {
        if let Ok(name_str) = std::str::from_utf8(name_bytes) {
            let name = name_str
                .strip_prefix("refs/tags/")
                .unwrap_or(name_str)
                .to_string();
            raw.push((oid, name));
        } else {
            warn!("Skipping tag with OID {} - name is not valid UTF-8", oid);
        }
        true // Continue iteration
    })
    .map_err(GitError::TagEnumeration)?;

    let mut tags = Vec::with_capacity(raw.len());
    for (oid, name) in raw {
        match resolve_tag(repo, oid, &name)? {
            Some(tag) => tags.push(tag),
            None => debug!(tag = %name, "Tag does not point at a commit, skipping"),
        }
    }

    Ok(tags)
}

fn resolve_tag(repo: &Repository, oid: git2::Oid, name: &str) -> Result<Option<Tag>, GitError> {
    if let Ok(tag_obj) = repo.find_tag(oid) {
        let Ok(target) = tag_obj.target().and_then(|t| t.peel_to_commit()) else {
            return Ok(None);
        };
        let commit = Commit::from_git2_commit(&target)?;
        let (tagger, release_date) = match tag_obj.tagger() {
            Some(sig) => (
                Identity::new(sig.name().unwrap_or(""), sig.email().unwrap_or("")),
                Utc.timestamp_opt(sig.when().seconds(), 0)
                    .single()
                    .unwrap_or(commit.timestamp),
            ),
            None => (commit.committer.clone(), commit.timestamp),
        };

        return Ok(Some(Tag {
            name: name.to_string(),
            kind: TagKind::Version,
            release_date,
            commit_date: commit.timestamp,
            tagger,
            description: tag_obj.message().unwrap_or("").trim().to_string(),
            commit_hash: commit.hash,
        }));
    }

    // Lightweight tag: the reference points straight at the commit
    let Ok(target) = repo.find_commit(oid) else {
        return Ok(None);
    };
    let commit = Commit::from_git2_commit(&target)?;

    Ok(Some(Tag {
        name: name.to_string(),
        kind: TagKind::Version,
        release_date: commit.timestamp,
        commit_date: commit.timestamp,
        tagger: commit.committer,
        description: String::new(),
        commit_hash: commit.hash,
    }))
}

/// Extract semver version from a tag name.
/// Handles both "v1.2.3" and "1.2.3" formats.
pub fn get_version_from_tag(tag_name: &str) -> Option<Version> {
    let version_str = tag_name.strip_prefix('v').unwrap_or(tag_name);
    Version::parse(version_str).ok()
}
