//! Partitions a newest-first commit sequence into version records.
//!
//! The walk is a single forward pass over a [`CommitCursor`]. In version mode
//! it has two phases: collating versions until the earliest requested one has
//! been opened, then collecting that final version's trailing commits until
//! the next version tag.

use tracing::{debug, warn};

use crate::config::{ChangelogConfig, ProcessingMode};
use crate::error::HistoryError;
use crate::git::{Commit, Tag, TagKind};

use super::record::VersionRecord;
use super::tag_index::TagIndex;

/// Forward-only position over an already materialized commit sequence.
#[derive(Debug, Clone)]
pub struct CommitCursor<'c> {
    commits: &'c [Commit],
    position: usize,
}

impl<'c> CommitCursor<'c> {
    pub fn new(commits: &'c [Commit]) -> Self {
        Self {
            commits,
            position: 0,
        }
    }

    /// Advance past the next commit and return it.
    pub fn next_commit(&mut self) -> Option<&'c Commit> {
        let commit = self.commits.get(self.position)?;
        self.position += 1;
        Some(commit)
    }

    /// Number of commits already consumed.
    pub fn position(&self) -> usize {
        self.position
    }

    pub fn remaining(&self) -> usize {
        self.commits.len() - self.position
    }
}

/// Builds the ordered list of version records (newest first).
pub struct VersionHistoryBuilder<'a> {
    config: &'a ChangelogConfig,
}

impl<'a> VersionHistoryBuilder<'a> {
    pub fn new(config: &'a ChangelogConfig) -> Self {
        Self { config }
    }

    /// Walk `commits` (newest first) against `tags`.
    ///
    /// An empty commit sequence yields an empty history.
    pub fn build(&self, commits: &[Commit], tags: &[Tag]) -> Result<Vec<VersionRecord>, HistoryError> {
        if commits.is_empty() {
            warn!("There are no commits to build a change log from");
            return Ok(Vec::new());
        }

        let mut index = TagIndex::build(tags, &self.config.version_tag_filter);
        let mut cursor = CommitCursor::new(commits);

        match self.config.processing_mode {
            ProcessingMode::Versions => {
                index.ensure_latest_tagged(commits, self.config);
                self.process_as_versions(&index, &mut cursor)
            }
            ProcessingMode::Commits => self.process_as_commits(&mut index, &mut cursor),
        }
    }

    /// The tag of `commit` if it marks a version boundary.
    ///
    /// Current build pseudo-tags always count; real tags count when the
    /// configured filter accepts them.
    fn version_tag<'i>(&self, index: &'i TagIndex, commit: &Commit) -> Option<&'i Tag> {
        index.get(&commit.hash).filter(|tag| match tag.kind {
            TagKind::CurrentBuild => true,
            TagKind::Version => self.config.version_tag_filter.is_version_tag(tag),
            TagKind::CommitRange => false,
        })
    }

    fn process_as_versions(
        &self,
        index: &TagIndex,
        cursor: &mut CommitCursor<'_>,
    ) -> Result<Vec<VersionRecord>, HistoryError> {
        debug!("Looking for the most recent required version to start the process");
        let to_version = self.config.to_version_id.as_deref();

        let (start_commit, start_tag) = loop {
            let Some(commit) = cursor.next_commit() else {
                return Err(match to_version {
                    Some(version) => HistoryError::VersionNotFound {
                        version: version.to_string(),
                    },
                    None => HistoryError::NoVersionsFound,
                });
            };
            if let Some(tag) = self.version_tag(index, commit) {
                if to_version.is_none_or(|to| to == tag.name) {
                    break (commit, tag);
                }
                debug!(tag = %tag.name, "Skipping version newer than to_version_id");
            }
        };

        let mut records = Vec::new();
        let mut current = self.open_version(start_tag, start_commit);
        let mut completed = self.is_earliest_version(start_tag, records.len() + 1);

        // Phase 1: collate versions until the earliest required one is open
        while !completed {
            let Some(commit) = cursor.next_commit() else {
                break;
            };
            match self.version_tag(index, commit) {
                Some(tag) => {
                    records.push(std::mem::replace(&mut current, self.open_version(tag, commit)));
                    completed = self.is_earliest_version(tag, records.len() + 1);
                }
                None => current.add_commit(commit.clone(), self.config),
            }
        }

        // Phase 2: the final version may still own older commits
        self.collect_trailing_commits(index, cursor, &mut current);

        records.push(current);
        Ok(records)
    }

    fn open_version(&self, tag: &Tag, commit: &Commit) -> VersionRecord {
        debug!(tag = %tag.name, commit = %commit.hash, "New version added");
        let mut record = VersionRecord::new(tag.clone(), self.config);
        record.add_commit(commit.clone(), self.config);
        record
    }

    /// Whether the version just opened is the last one required.
    fn is_earliest_version(&self, tag: &Tag, versions_opened: usize) -> bool {
        let max = self.config.max_versions as usize;
        if max > 0 && versions_opened >= max {
            debug!(max, earliest = %tag.name, "Maximum required number of versions reached");
            return true;
        }
        let matched = self.config.from_version_id.as_deref() == Some(tag.name.as_str());
        if matched {
            debug!(earliest = %tag.name, "from_version_id reached");
        }
        matched
    }

    fn collect_trailing_commits(
        &self,
        index: &TagIndex,
        cursor: &mut CommitCursor<'_>,
        record: &mut VersionRecord,
    ) {
        while let Some(commit) = cursor.next_commit() {
            if self.version_tag(index, commit).is_some() {
                debug!(
                    discarded = cursor.remaining() + 1,
                    "Earliest version complete, discarding older commits"
                );
                return;
            }
            record.add_commit(commit.clone(), self.config);
        }
    }

    fn process_as_commits(
        &self,
        index: &mut TagIndex,
        cursor: &mut CommitCursor<'_>,
    ) -> Result<Vec<VersionRecord>, HistoryError> {
        let start = match self.config.to_commit_id.as_deref() {
            None => match cursor.next_commit() {
                Some(commit) => commit,
                None => return Ok(Vec::new()),
            },
            Some(to_commit) => loop {
                match cursor.next_commit() {
                    Some(commit) if commit.hash == to_commit => break commit,
                    Some(_) => {}
                    None => {
                        return Err(HistoryError::CommitNotFound {
                            commit: to_commit.to_string(),
                        });
                    }
                }
            },
        };

        let range_tag = Tag::commit_range(start);
        index.insert_pseudo_tag(range_tag.clone());
        let mut record = self.open_version(&range_tag, start);
        let mut appended = 1usize;
        let mut last = start;

        while !self.commits_completed(appended, last) {
            let Some(commit) = cursor.next_commit() else {
                break;
            };
            if let Some(tag) = self.version_tag(index, commit) {
                debug!(tag = %tag.name, "Reached a version tag, commit range complete");
                break;
            }
            record.add_commit(commit.clone(), self.config);
            appended += 1;
            last = commit;
        }

        Ok(vec![record])
    }

    fn commits_completed(&self, appended: usize, last: &Commit) -> bool {
        match self.config.from_commit_id.as_deref() {
            None => appended >= self.config.max_commits as usize,
            Some(from_commit) => last.hash == from_commit,
        }
    }
}
