//! Expands issue references in commit messages and collects fix references.

use tracing::{debug, warn};

use crate::config::ChangelogConfig;
use crate::error::IssueTrackerError;
use crate::git::Commit;
use crate::issues::{Issue, IssueCache, IssueTracker};

use super::record::{ExpandedCommit, VersionRecord};

/// Characters that separate tokens in a commit message.
pub const TOKEN_DELIMITERS: &[char] = &[
    ' ', '\t', '\n', '\r', ',', '.', ':', ';', '*', '?', '`', '!', '[', ']', '\'',
];

/// Split `message` into non-empty tokens with their byte offsets.
pub fn tokenize(message: &str) -> Vec<(usize, &str)> {
    let mut tokens = Vec::new();
    let mut start = None;

    for (i, c) in message.char_indices() {
        if TOKEN_DELIMITERS.contains(&c) {
            if let Some(s) = start.take() {
                tokens.push((s, &message[s..i]));
            }
        } else if start.is_none() {
            start = Some(i);
        }
    }
    if let Some(s) = start {
        tokens.push((s, &message[s..]));
    }
    tokens
}

/// Where a `#` token points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IssueReference {
    /// `#12`: an issue of the project being documented.
    Project { number: u64 },
    /// `owner/repo#7`
    Repository {
        owner: String,
        repo: String,
        number: u64,
    },
}

/// Parse a token as an issue reference.
///
/// Tokens of any other shape are plain text.
pub fn parse_reference(token: &str) -> Option<IssueReference> {
    if token.len() < 2 || !token.contains('#') {
        return None;
    }

    let parts: Vec<&str> = token.split('#').collect();
    let [prefix, suffix] = parts.as_slice() else {
        debug!(token, "Ignoring token with more than one '#'");
        return None;
    };
    if suffix.is_empty() {
        return None;
    }

    let number = match suffix.parse::<u64>() {
        Ok(n) => n,
        Err(_) => {
            warn!(token, "Issue reference is not numeric, leaving it as text");
            return None;
        }
    };

    if prefix.is_empty() {
        return Some(IssueReference::Project { number });
    }

    match prefix.split('/').collect::<Vec<_>>().as_slice() {
        [owner, repo] if !owner.is_empty() && !repo.is_empty() => {
            Some(IssueReference::Repository {
                owner: owner.to_string(),
                repo: repo.to_string(),
                number,
            })
        }
        _ => {
            debug!(token, "Issue reference prefix is not owner/repo, leaving it as text");
            None
        }
    }
}

/// Resolves the issue references of one version record at a time.
pub struct CommitMessageResolver<'a, T: IssueTracker + ?Sized> {
    config: &'a ChangelogConfig,
    tracker: &'a T,
    cache: &'a mut IssueCache,
}

impl<'a, T: IssueTracker + ?Sized> CommitMessageResolver<'a, T> {
    pub fn new(config: &'a ChangelogConfig, tracker: &'a T, cache: &'a mut IssueCache) -> Self {
        Self {
            config,
            tracker,
            cache,
        }
    }

    /// Expand every included commit of `record` and group its fix references.
    ///
    /// Returns the fix references in first-seen order. Lookups that fail with
    /// a recoverable error leave the reference as text; any other failure
    /// aborts the record.
    pub async fn resolve(
        &mut self,
        record: &mut VersionRecord,
    ) -> Result<Vec<Issue>, IssueTrackerError> {
        record.reset_resolution(self.config);

        let mut fixes: Vec<Issue> = Vec::new();
        let mut expanded = Vec::with_capacity(record.commits.len());

        for commit in &record.commits {
            let (message, commit_fixes) = self.expand_commit(commit).await?;
            expanded.push(ExpandedCommit::new(commit.clone(), message));

            for issue in commit_fixes {
                if !fixes.iter().any(|f| f.html_url == issue.html_url) {
                    fixes.push(issue);
                }
            }
        }

        for issue in &fixes {
            record.classify(issue, self.config);
        }
        record.expanded_commits = expanded;
        record.finish_grouping(self.config);

        debug!(
            tag = %record.tag_name(),
            commits = record.commits.len(),
            fixes = fixes.len(),
            "Resolved version"
        );
        Ok(fixes)
    }

    async fn expand_commit(
        &mut self,
        commit: &Commit,
    ) -> Result<(String, Vec<Issue>), IssueTrackerError> {
        let message = self.config.correct_typos_in(&commit.message);
        let tokens = tokenize(&message);

        let mut output = String::with_capacity(message.len());
        let mut copied_to = 0;
        let mut fixes = Vec::new();
        let mut previous: Option<&str> = None;

        for &(offset, token) in &tokens {
            if let Some(reference) = parse_reference(token)
                && let Some(issue) = self.lookup(&reference, token).await?
            {
                if previous.is_some_and(|word| self.tracker.is_issue_fix_word(word)) {
                    fixes.push(issue.clone());
                }
                output.push_str(&message[copied_to..offset]);
                output.push_str(&issue.markdown_link());
                copied_to = offset + token.len();
            }
            previous = Some(token);
        }
        output.push_str(&message[copied_to..]);

        Ok((output, fixes))
    }

    async fn lookup(
        &mut self,
        reference: &IssueReference,
        token: &str,
    ) -> Result<Option<Issue>, IssueTrackerError> {
        let (owner, repo, number) = match reference {
            IssueReference::Project { number } => (
                self.config.remote_repo_user.as_str(),
                self.config.project_name.as_str(),
                *number,
            ),
            IssueReference::Repository {
                owner,
                repo,
                number,
            } => (owner.as_str(), repo.as_str(), *number),
        };

        match self.cache.get_issue(self.tracker, owner, repo, number).await {
            Ok(issue) => Ok(Some(issue)),
            Err(e) if e.is_recoverable() => {
                warn!(token, error = %e, "Could not resolve issue reference, leaving it as text");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }
}
