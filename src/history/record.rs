//! The per-version aggregate of commits and the issues they fix.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::config::ChangelogConfig;
use crate::git::{Commit, Identity, Tag};
use crate::issues::Issue;

/// A commit together with its message after reference expansion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExpandedCommit {
    pub commit: Commit,
    pub expanded_message: String,
    pub expanded_short_message: String,
}

impl ExpandedCommit {
    pub fn new(commit: Commit, expanded_message: String) -> Self {
        let expanded_short_message = expanded_message.lines().next().unwrap_or("").to_string();
        Self {
            commit,
            expanded_message,
            expanded_short_message,
        }
    }
}

/// Issues collected under one label group, in first-seen order without duplicates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IssueGroup {
    pub name: String,
    pub issues: Vec<Issue>,
}

impl IssueGroup {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            issues: Vec::new(),
        }
    }
}

/// One version window: its tag, its commits and what they resolved.
#[derive(Debug, Clone, Serialize)]
pub struct VersionRecord {
    pub tag: Tag,
    /// Commits in walk order (newest first).
    pub commits: Vec<Commit>,
    /// Commits carrying an exclusion tag. Kept for audit, never resolved.
    pub excluded_commits: Vec<Commit>,
    /// Label groups in configured order.
    pub fixes_by_group: Vec<IssueGroup>,
    pub pull_requests: Vec<Issue>,
    pub expanded_commits: Vec<ExpandedCommit>,
}

impl VersionRecord {
    pub fn new(tag: Tag, config: &ChangelogConfig) -> Self {
        Self {
            tag,
            commits: Vec::new(),
            excluded_commits: Vec::new(),
            fixes_by_group: initial_groups(config),
            pull_requests: Vec::new(),
            expanded_commits: Vec::new(),
        }
    }

    pub fn tag_name(&self) -> &str {
        &self.tag.name
    }

    /// Ref used when linking to this version's tree.
    pub fn tag_ref<'a>(&'a self, branch: &'a str) -> &'a str {
        self.tag.url_segment(branch)
    }

    pub fn release_date(&self) -> DateTime<Utc> {
        self.tag.release_date
    }

    pub fn commit_date(&self) -> DateTime<Utc> {
        self.tag.commit_date
    }

    pub fn tagger(&self) -> &Identity {
        &self.tag.tagger
    }

    pub fn has_commits(&self) -> bool {
        !self.commits.is_empty()
    }

    pub fn group(&self, name: &str) -> Option<&IssueGroup> {
        self.fixes_by_group.iter().find(|g| g.name == name)
    }

    /// File the commit as included or excluded.
    pub fn add_commit(&mut self, commit: Commit, config: &ChangelogConfig) {
        if config.is_excluded(&commit.message) {
            self.excluded_commits.push(commit);
        } else {
            self.commits.push(commit);
        }
    }

    /// Drop any earlier resolution output.
    pub(crate) fn reset_resolution(&mut self, config: &ChangelogConfig) {
        self.fixes_by_group = initial_groups(config);
        self.pull_requests.clear();
        self.expanded_commits.clear();
    }

    /// Bucket a fix reference by pull request status and labels.
    pub(crate) fn classify(&mut self, issue: &Issue, config: &ChangelogConfig) {
        if issue.pull_request && config.separate_pull_requests {
            push_unique(&mut self.pull_requests, issue);
            return;
        }

        for label_group in &config.label_groups {
            if !label_group.labels.iter().any(|label| issue.has_label(label)) {
                continue;
            }
            if let Some(group) = self
                .fixes_by_group
                .iter_mut()
                .find(|g| g.name == label_group.name)
            {
                push_unique(&mut group.issues, issue);
            }
        }
    }

    /// Drop all resolution output after a failed resolution.
    ///
    /// The raw commits stay; no groups or expanded messages are left.
    pub(crate) fn mark_unresolved(&mut self) {
        self.fixes_by_group.clear();
        self.pull_requests.clear();
        self.expanded_commits.clear();
    }

    /// Put pull requests under their own heading and drop empty groups.
    pub(crate) fn finish_grouping(&mut self, config: &ChangelogConfig) {
        if config.separate_pull_requests {
            if let Some(group) = self
                .fixes_by_group
                .iter_mut()
                .find(|g| g.name == config.pull_request_title)
            {
                group.issues = self.pull_requests.clone();
            }
        }
        self.fixes_by_group.retain(|g| !g.issues.is_empty());
    }
}

fn initial_groups(config: &ChangelogConfig) -> Vec<IssueGroup> {
    config
        .label_groups
        .iter()
        .map(|g| IssueGroup::new(&g.name))
        .collect()
}

fn push_unique(issues: &mut Vec<Issue>, issue: &Issue) {
    if !issues.iter().any(|i| i.html_url == issue.html_url) {
        issues.push(issue.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LabelGroup;

    fn commit(hash: &str, message: &str) -> Commit {
        Commit {
            hash: hash.to_string(),
            message: message.to_string(),
            author: Identity::new("a", "a@example.com"),
            committer: Identity::new("a", "a@example.com"),
            timestamp: Utc::now(),
        }
    }

    fn issue(number: u64, labels: &[&str], pull_request: bool) -> Issue {
        Issue {
            number,
            title: format!("issue {number}"),
            body: None,
            html_url: format!("https://github.com/acme/widgets/issues/{number}"),
            labels: labels.iter().map(|l| l.to_string()).collect(),
            pull_request,
        }
    }

    fn config() -> ChangelogConfig {
        ChangelogConfig::builder()
            .project_name("widgets")
            .remote_repo_user("acme")
            .exclusion_tags(["{{javadoc}}"])
            .build()
            .unwrap()
    }

    fn record(config: &ChangelogConfig) -> VersionRecord {
        VersionRecord::new(Tag::commit_range(&commit("c0", "")), config)
    }

    #[test]
    fn test_add_commit_partitions_on_exclusion_tag() {
        let config = config();
        let mut record = record(&config);
        record.add_commit(commit("c0", "Add widget"), &config);
        record.add_commit(commit("c1", "{{javadoc}} tidy"), &config);
        record.add_commit(commit("c2", "Fix spinner"), &config);

        let included: Vec<&str> = record.commits.iter().map(|c| c.hash.as_str()).collect();
        let excluded: Vec<&str> = record.excluded_commits.iter().map(|c| c.hash.as_str()).collect();
        assert_eq!(included, ["c0", "c2"]);
        assert_eq!(excluded, ["c1"]);
    }

    #[test]
    fn test_groups_start_in_configured_order() {
        let config = config();
        let record = record(&config);
        let names: Vec<&str> = record.fixes_by_group.iter().map(|g| g.name.as_str()).collect();
        let expected: Vec<&str> = config.label_groups.iter().map(|g| g.name.as_str()).collect();
        assert_eq!(names, expected);
    }

    #[test]
    fn test_issue_lands_in_every_matching_group() {
        let config = config();
        let mut record = record(&config);
        record.classify(&issue(16, &["enhancement", "documentation"], false), &config);
        record.classify(&issue(5, &["rubbish"], false), &config);
        record.finish_grouping(&config);

        let names: Vec<&str> = record.fixes_by_group.iter().map(|g| g.name.as_str()).collect();
        assert_eq!(names, ["Enhancements", "Documentation"]);
    }

    #[test]
    fn test_duplicate_issue_is_grouped_once() {
        let config = config();
        let mut record = record(&config);
        // two labels in the same group
        record.classify(&issue(15, &["performance", "enhancement"], false), &config);
        record.classify(&issue(15, &["performance", "enhancement"], false), &config);
        record.finish_grouping(&config);

        assert_eq!(record.group("Enhancements").unwrap().issues.len(), 1);
    }

    #[test]
    fn test_pull_requests_get_their_own_group() {
        let config = config();
        let mut record = record(&config);
        record.classify(&issue(4, &["testing"], true), &config);
        record.classify(&issue(1, &["bug"], false), &config);
        record.finish_grouping(&config);

        assert_eq!(record.pull_requests.len(), 1);
        let names: Vec<&str> = record.fixes_by_group.iter().map(|g| g.name.as_str()).collect();
        assert_eq!(names, ["Pull Requests", "Fixes"]);
        assert_eq!(record.group("Pull Requests").unwrap().issues[0].number, 4);
        assert!(record.group("Quality").is_none());
    }

    #[test]
    fn test_pull_requests_merged_by_label_when_not_separate() {
        let config = ChangelogConfig::builder()
            .project_name("widgets")
            .remote_repo_user("acme")
            .separate_pull_requests(false)
            .build()
            .unwrap();
        let mut record = record(&config);
        record.classify(&issue(4, &["testing"], true), &config);
        record.finish_grouping(&config);

        assert!(record.pull_requests.is_empty());
        let names: Vec<&str> = record.fixes_by_group.iter().map(|g| g.name.as_str()).collect();
        assert_eq!(names, ["Quality"]);
    }

    #[test]
    fn test_custom_groups_keep_their_order() {
        let config = ChangelogConfig::builder()
            .project_name("widgets")
            .remote_repo_user("acme")
            .label_groups(vec![
                LabelGroup::new("Zebra", ["z"]),
                LabelGroup::new("Alpha", ["a"]),
            ])
            .build()
            .unwrap();
        let mut record = record(&config);
        record.classify(&issue(1, &["a"], false), &config);
        record.classify(&issue(2, &["z"], false), &config);
        record.finish_grouping(&config);

        let names: Vec<&str> = record.fixes_by_group.iter().map(|g| g.name.as_str()).collect();
        assert_eq!(names, ["Zebra", "Alpha"]);
    }

    #[test]
    fn test_expanded_short_message() {
        let expanded = ExpandedCommit::new(
            commit("c0", "Fixes #1\n\nbody"),
            "Fixes [1](url)\n\nbody".to_string(),
        );
        assert_eq!(expanded.expanded_short_message, "Fixes [1](url)");
    }

    #[test]
    fn test_unresolved_record_keeps_commits_only() {
        let config = config();
        let mut record = record(&config);
        record.add_commit(commit("c0", "Fixes #1"), &config);
        record.classify(&issue(1, &["bug"], false), &config);

        record.mark_unresolved();

        assert!(record.fixes_by_group.is_empty());
        assert!(record.pull_requests.is_empty());
        assert!(record.expanded_commits.is_empty());
        assert_eq!(record.commits.len(), 1);
    }
}
