//! Local issue records, to reduce calls to the remote issue tracker.

use std::collections::BTreeMap;
use std::io::{Read, Write};
use std::path::Path;

use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::error::{IssueCacheError, IssueTrackerError};

use super::issue::{Issue, issue_url};
use super::tracker::IssueTracker;

/// Issues keyed by canonical URL.
///
/// Scoped to one generation run (or one persisted file). Nothing is evicted.
#[derive(Debug, Clone)]
pub struct IssueCache {
    base_url: String,
    issues: BTreeMap<String, Issue>,
}

impl IssueCache {
    /// An empty cache whose keys are built from `base_url`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            issues: BTreeMap::new(),
        }
    }

    /// Return the cached issue, or fetch it from `tracker` and remember it.
    pub async fn get_issue<T>(
        &mut self,
        tracker: &T,
        owner: &str,
        repo: &str,
        number: u64,
    ) -> Result<Issue, IssueTrackerError>
    where
        T: IssueTracker + ?Sized,
    {
        let url = issue_url(&self.base_url, owner, repo, number);
        if let Some(issue) = self.issues.get(&url) {
            debug!(%url, "Returning cached issue");
            return Ok(issue.clone());
        }

        debug!(%url, "No cached issue, retrieving from issue tracker");
        let issue = tracker.get_issue(owner, repo, number).await?;
        self.issues.insert(url, issue.clone());
        Ok(issue)
    }

    pub fn is_cached(&self, issue_url: &str) -> bool {
        self.issues.contains_key(issue_url)
    }

    pub fn get(&self, issue_url: &str) -> Option<&Issue> {
        self.issues.get(issue_url)
    }

    pub fn insert(&mut self, issue_url: impl Into<String>, issue: Issue) {
        self.issues.insert(issue_url.into(), issue);
    }

    pub fn len(&self) -> usize {
        self.issues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn issues(&self) -> &BTreeMap<String, Issue> {
        &self.issues
    }

    /// Replace the cached map with the JSON object read from `reader`.
    pub fn load<R: Read>(&mut self, reader: R) -> Result<(), IssueCacheError> {
        let loaded: BTreeMap<String, Issue> =
            serde_json::from_reader(reader).map_err(IssueCacheError::ParseFailed)?;
        self.issues = loaded;
        Ok(())
    }

    /// Write the cached map as a JSON object keyed by issue URL.
    pub fn save<W: Write>(&self, writer: W) -> Result<(), IssueCacheError> {
        serde_json::to_writer_pretty(writer, &self.issues).map_err(IssueCacheError::SerializeFailed)
    }

    /// Load from `path` if it exists. Returns whether a file was loaded.
    pub fn load_file(&mut self, path: &Path) -> Result<bool, IssueCacheError> {
        if !path.exists() {
            info!(
                path = %path.display(),
                "No issue records file found, all issue data will be retrieved from the issue tracker"
            );
            return Ok(false);
        }

        let file = std::fs::File::open(path).map_err(IssueCacheError::ReadFailed)?;
        self.load(std::io::BufReader::new(file))?;
        info!(
            path = %path.display(),
            count = self.len(),
            "Loaded issue records, only additional issues will be retrieved from the issue tracker"
        );
        Ok(true)
    }

    /// Save to `path` atomically: written to a sibling temp file, then renamed.
    pub fn save_file(&self, path: &Path) -> Result<(), IssueCacheError> {
        let dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));

        let mut temp = NamedTempFile::new_in(dir).map_err(IssueCacheError::WriteFailed)?;
        self.save(&mut temp)?;
        temp.flush().map_err(IssueCacheError::WriteFailed)?;
        temp.persist(path)
            .map_err(|e| IssueCacheError::WriteFailed(e.error))?;

        debug!(path = %path.display(), count = self.len(), "Saved issue records");
        Ok(())
    }
}
