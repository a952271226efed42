//! Shared test utilities for integration tests.
//!
//! Not all functions are used by every test file, but they're shared across tests.
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;

use annalist::config::{ChangelogConfig, ChangelogConfigBuilder};
use annalist::error::IssueTrackerError;
use annalist::issues::{Issue, IssueTracker, is_closing_keyword};
use async_trait::async_trait;
use git2::{Oid, Repository, Signature};

/// Create a temporary directory for test output.
pub fn temp_test_dir() -> tempfile::TempDir {
    tempfile::tempdir().expect("Failed to create temp directory")
}

/// A test git repository builder for integration tests.
///
/// Commits go to `main` regardless of the local git configuration.
pub struct TestRepo {
    pub dir: tempfile::TempDir,
    pub repo: Repository,
    counter: std::cell::Cell<u32>,
}

impl TestRepo {
    /// Create a new empty git repository in a temp directory.
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp directory");
        let repo = Repository::init(dir.path()).expect("Failed to init git repo");
        repo.set_head("refs/heads/main")
            .expect("Failed to point HEAD at main");
        Self {
            dir,
            repo,
            counter: std::cell::Cell::new(0),
        }
    }

    /// Get the test signature for commits.
    fn signature(&self) -> Signature<'_> {
        Signature::now("Test User", "test@example.com").expect("Failed to create signature")
    }

    /// Create a commit with the given message. Returns the commit OID.
    pub fn commit(&self, message: &str) -> Oid {
        let sig = self.signature();
        let n = self.counter.get() + 1;
        self.counter.set(n);

        // Each commit changes the file so the tree differs
        let file_path = self.dir.path().join("test.txt");
        std::fs::write(&file_path, format!("{message}\n{n}")).expect("Failed to write test file");

        let mut index = self.repo.index().expect("Failed to get index");
        index.add_path(std::path::Path::new("test.txt")).expect("Failed to add file");
        index.write().expect("Failed to write index");
        let tree_id = index.write_tree().expect("Failed to write tree");
        let tree = self.repo.find_tree(tree_id).expect("Failed to find tree");

        let parent = self.repo.head().ok().and_then(|h| h.peel_to_commit().ok());
        let parents: Vec<&git2::Commit> = parent.iter().collect();

        self.repo
            .commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)
            .expect("Failed to create commit")
    }

    /// Create a lightweight tag pointing to the given OID.
    pub fn tag_lightweight(&self, name: &str, oid: Oid) {
        let obj = self.repo.find_object(oid, None).expect("Failed to find object");
        self.repo.tag_lightweight(name, &obj, false).expect("Failed to create lightweight tag");
    }

    /// Create an annotated tag pointing to the given OID.
    pub fn tag_annotated(&self, name: &str, oid: Oid, message: &str) {
        let sig = self.signature();
        let obj = self.repo.find_object(oid, None).expect("Failed to find object");
        self.repo.tag(name, &obj, &sig, message, false).expect("Failed to create annotated tag");
    }

    /// Create a branch pointing to the given OID.
    pub fn branch(&self, name: &str, oid: Oid) {
        let commit = self.repo.find_commit(oid).expect("Failed to find commit");
        self.repo.branch(name, &commit, false).expect("Failed to create branch");
    }
}

/// Config builder for the `acme/widgets` project used across tests.
pub fn widgets_config() -> ChangelogConfigBuilder {
    ChangelogConfig::builder()
        .project_name("widgets")
        .remote_repo_user("acme")
}

/// Build an issue as GitHub would report it for `owner/repo`.
pub fn make_issue(owner: &str, repo: &str, number: u64, labels: &[&str]) -> Issue {
    Issue {
        number,
        title: format!("Issue {number}"),
        body: None,
        html_url: format!("https://github.com/{owner}/{repo}/issues/{number}"),
        labels: labels.iter().map(|l| l.to_string()).collect(),
        pull_request: false,
    }
}

/// In-memory issue tracker that counts lookups.
#[derive(Default)]
pub struct StubTracker {
    issues: HashMap<(String, String, u64), Issue>,
    unauthorized: Vec<(String, String, u64)>,
    calls: Mutex<Vec<(String, String, u64)>>,
}

impl StubTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_issue(mut self, owner: &str, repo: &str, issue: Issue) -> Self {
        self.issues
            .insert((owner.to_string(), repo.to_string(), issue.number), issue);
        self
    }

    /// Answer lookups of this issue with an authentication failure.
    pub fn unauthorized_for(mut self, owner: &str, repo: &str, number: u64) -> Self {
        self.unauthorized
            .push((owner.to_string(), repo.to_string(), number));
        self
    }

    /// Number of lookups that reached the tracker.
    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl IssueTracker for StubTracker {
    async fn get_issue(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
    ) -> Result<Issue, IssueTrackerError> {
        let key = (owner.to_string(), repo.to_string(), number);
        self.calls.lock().unwrap().push(key.clone());
        if self.unauthorized.contains(&key) {
            return Err(IssueTrackerError::AuthenticationFailed);
        }
        self.issues
            .get(&key)
            .cloned()
            .ok_or(IssueTrackerError::IssueNotFound {
                owner: owner.to_string(),
                repo: repo.to_string(),
                number,
            })
    }

    fn is_issue_fix_word(&self, word: &str) -> bool {
        is_closing_keyword(word)
    }
}
