//! Commit-to-tag lookup for one generation run.

use std::collections::HashMap;

use tracing::{debug, warn};

use crate::config::{ChangelogConfig, VersionTagFilter};
use crate::git::{Commit, Tag};

/// Maps a commit hash to the single tag that marks it.
#[derive(Debug, Clone, Default)]
pub struct TagIndex {
    by_commit: HashMap<String, Tag>,
}

impl TagIndex {
    /// Index `tags` by the commit they mark.
    ///
    /// When several tags mark the same commit, a tag `filter` accepts as a
    /// version beats one it rejects; otherwise the last one wins.
    pub fn build(tags: &[Tag], filter: &VersionTagFilter) -> Self {
        let mut by_commit: HashMap<String, Tag> = HashMap::with_capacity(tags.len());
        for tag in tags {
            let Some(existing) = by_commit.get(&tag.commit_hash) else {
                by_commit.insert(tag.commit_hash.clone(), tag.clone());
                continue;
            };

            let keep_existing =
                filter.is_version_tag(existing) && !filter.is_version_tag(tag);
            let (kept, dropped) = if keep_existing {
                (existing.name.clone(), tag.name.clone())
            } else {
                (tag.name.clone(), existing.name.clone())
            };
            warn!(
                commit = %tag.commit_hash,
                %kept,
                %dropped,
                "Commit carries more than one tag"
            );
            if !keep_existing {
                by_commit.insert(tag.commit_hash.clone(), tag.clone());
            }
        }
        Self { by_commit }
    }

    pub fn get(&self, commit_hash: &str) -> Option<&Tag> {
        self.by_commit.get(commit_hash)
    }

    pub fn len(&self) -> usize {
        self.by_commit.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_commit.is_empty()
    }

    /// Tag the newest commit with a current build pseudo-tag when it has no
    /// tag of its own and `auto_tag_latest_commit` is on.
    ///
    /// Returns whether a pseudo-tag was added.
    pub fn ensure_latest_tagged(&mut self, commits: &[Commit], config: &ChangelogConfig) -> bool {
        if !config.auto_tag_latest_commit {
            return false;
        }
        let Some(latest) = commits.first() else {
            return false;
        };
        self.insert_pseudo_tag(Tag::current_build(latest, &config.current_build_tag_name))
    }

    /// Add a pseudo-tag unless the commit is already tagged.
    pub(crate) fn insert_pseudo_tag(&mut self, tag: Tag) -> bool {
        if self.by_commit.contains_key(&tag.commit_hash) {
            return false;
        }
        debug!(commit = %tag.commit_hash, tag = %tag.name, kind = ?tag.kind, "Adding pseudo tag");
        self.by_commit.insert(tag.commit_hash.clone(), tag);
        true
    }
}
