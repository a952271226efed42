//! Changelog generation settings.
//!
//! A [`ChangelogConfig`] is built once through [`ChangelogConfigBuilder`],
//! validated in [`ChangelogConfigBuilder::build`], and then only read.

use std::collections::BTreeSet;

use regex_lite::Regex;

use crate::error::ConfigError;
use crate::git::{Tag, get_version_from_tag};

pub const DEFAULT_PULL_REQUESTS_TITLE: &str = "Pull Requests";
pub const DEFAULT_CURRENT_BUILD_TAG_NAME: &str = "current build";
pub const DEFAULT_ISSUES_FILENAME: &str = "issueRecords.json";
pub const DEFAULT_TRACKER_BASE_URL: &str = "https://github.com";
pub const DEFAULT_MAX_VERSIONS: u32 = 50;
pub const DEFAULT_MAX_COMMITS: u32 = 1000;

/// Keywords whose `#` is commonly typed without a separating space.
const TYPO_KEYWORDS: [&str; 7] = [
    "Fix", "Fixes", "See", "Close", "Closes", "Resolve", "Resolves",
];

/// How commits are partitioned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProcessingMode {
    /// One record per version tag.
    #[default]
    Versions,
    /// A single record for a range of commits.
    Commits,
}

/// Decides which repository tags mark a release boundary.
#[derive(Debug, Clone, Default)]
pub enum VersionTagFilter {
    /// Every tag is a version tag.
    #[default]
    AllTags,
    /// Tags whose name is a semver version, with or without a `v` prefix.
    Semver,
    /// Tags whose name matches the pattern.
    Pattern(Regex),
}

impl VersionTagFilter {
    /// Compile a pattern filter.
    pub fn pattern(pattern: &str) -> Result<Self, ConfigError> {
        Regex::new(pattern)
            .map(Self::Pattern)
            .map_err(|e| ConfigError::InvalidTagPattern {
                pattern: pattern.to_string(),
                message: e.to_string(),
            })
    }

    pub fn is_version_tag(&self, tag: &Tag) -> bool {
        match self {
            Self::AllTags => true,
            Self::Semver => get_version_from_tag(&tag.name).is_some(),
            Self::Pattern(re) => re.is_match(&tag.name),
        }
    }
}

/// A named bucket of issue labels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelGroup {
    pub name: String,
    pub labels: BTreeSet<String>,
}

impl LabelGroup {
    pub fn new<I, S>(name: impl Into<String>, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            labels: labels.into_iter().map(Into::into).collect(),
        }
    }
}

/// Label groups in presentation order.
pub fn default_label_groups() -> Vec<LabelGroup> {
    vec![
        // pull requests do not need label mapping
        LabelGroup::new(DEFAULT_PULL_REQUESTS_TITLE, Vec::<String>::new()),
        LabelGroup::new("Fixes", ["bug"]),
        LabelGroup::new("Quality", ["testing", "quality"]),
        LabelGroup::new("Enhancements", ["enhancement", "performance"]),
        LabelGroup::new("Tasks", ["task"]),
        LabelGroup::new("Documentation", ["documentation"]),
    ]
}

/// Replacements applied in order when typo correction is on, e.g. `Fix#` -> `Fix #`.
pub fn default_typo_map() -> Vec<(String, String)> {
    TYPO_KEYWORDS
        .iter()
        .flat_map(|word| [word.to_string(), word.to_lowercase()])
        .map(|word| (format!("{word}#"), format!("{word} #")))
        .collect()
}

/// Immutable settings for one changelog generation run.
#[derive(Debug, Clone)]
pub struct ChangelogConfig {
    pub project_name: String,
    pub remote_repo_user: String,
    pub tracker_base_url: String,
    pub processing_mode: ProcessingMode,
    pub from_version_id: Option<String>,
    pub to_version_id: Option<String>,
    pub from_commit_id: Option<String>,
    pub to_commit_id: Option<String>,
    pub max_versions: u32,
    pub max_commits: u32,
    pub branch: String,
    pub version_tag_filter: VersionTagFilter,
    pub auto_tag_latest_commit: bool,
    pub current_build_tag_name: String,
    pub exclusion_tags: BTreeSet<String>,
    pub correct_typos: bool,
    pub typo_map: Vec<(String, String)>,
    pub label_groups: Vec<LabelGroup>,
    pub separate_pull_requests: bool,
    pub pull_request_title: String,
    pub show_detail: bool,
    pub use_stored_issues: bool,
    pub store_issues_locally: bool,
    pub issues_filename: String,
}

impl ChangelogConfig {
    pub fn builder() -> ChangelogConfigBuilder {
        ChangelogConfigBuilder::default()
    }

    pub fn processing_as_versions(&self) -> bool {
        self.processing_mode == ProcessingMode::Versions
    }

    /// Whether the message carries any exclusion tag verbatim.
    pub fn is_excluded(&self, message: &str) -> bool {
        self.exclusion_tags
            .iter()
            .any(|exclusion| message.contains(exclusion.as_str()))
    }

    /// Apply the typo map if correction is enabled.
    pub fn correct_typos_in(&self, message: &str) -> String {
        if !self.correct_typos {
            return message.to_string();
        }
        self.typo_map
            .iter()
            .fold(message.to_string(), |text, (typo, fixed)| {
                text.replace(typo.as_str(), fixed)
            })
    }
}

/// Fluent builder for [`ChangelogConfig`].
#[derive(Debug, Clone)]
pub struct ChangelogConfigBuilder {
    config: ChangelogConfig,
}

impl Default for ChangelogConfigBuilder {
    fn default() -> Self {
        Self {
            config: ChangelogConfig {
                project_name: String::new(),
                remote_repo_user: String::new(),
                tracker_base_url: DEFAULT_TRACKER_BASE_URL.to_string(),
                processing_mode: ProcessingMode::Versions,
                from_version_id: None,
                to_version_id: None,
                from_commit_id: None,
                to_commit_id: None,
                max_versions: DEFAULT_MAX_VERSIONS,
                max_commits: DEFAULT_MAX_COMMITS,
                branch: "main".to_string(),
                version_tag_filter: VersionTagFilter::AllTags,
                auto_tag_latest_commit: true,
                current_build_tag_name: DEFAULT_CURRENT_BUILD_TAG_NAME.to_string(),
                exclusion_tags: BTreeSet::new(),
                correct_typos: false,
                typo_map: default_typo_map(),
                label_groups: default_label_groups(),
                separate_pull_requests: true,
                pull_request_title: DEFAULT_PULL_REQUESTS_TITLE.to_string(),
                show_detail: true,
                use_stored_issues: true,
                store_issues_locally: true,
                issues_filename: DEFAULT_ISSUES_FILENAME.to_string(),
            },
        }
    }
}

impl ChangelogConfigBuilder {
    pub fn project_name(mut self, name: impl Into<String>) -> Self {
        self.config.project_name = name.into();
        self
    }

    pub fn remote_repo_user(mut self, user: impl Into<String>) -> Self {
        self.config.remote_repo_user = user.into();
        self
    }

    pub fn tracker_base_url(mut self, url: impl Into<String>) -> Self {
        self.config.tracker_base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn process_as_versions(mut self) -> Self {
        self.config.processing_mode = ProcessingMode::Versions;
        self
    }

    pub fn process_as_commits(mut self) -> Self {
        self.config.processing_mode = ProcessingMode::Commits;
        self
    }

    pub fn from_version_id(mut self, id: impl Into<String>) -> Self {
        self.config.from_version_id = Some(id.into());
        self
    }

    pub fn to_version_id(mut self, id: impl Into<String>) -> Self {
        self.config.to_version_id = Some(id.into());
        self
    }

    pub fn from_commit_id(mut self, id: impl Into<String>) -> Self {
        self.config.from_commit_id = Some(id.into());
        self
    }

    pub fn to_commit_id(mut self, id: impl Into<String>) -> Self {
        self.config.to_commit_id = Some(id.into());
        self
    }

    /// Maximum number of versions; 0 means unlimited.
    pub fn max_versions(mut self, max: u32) -> Self {
        self.config.max_versions = max;
        self
    }

    pub fn max_commits(mut self, max: u32) -> Self {
        self.config.max_commits = max;
        self
    }

    pub fn branch(mut self, branch: impl Into<String>) -> Self {
        self.config.branch = branch.into();
        self
    }

    pub fn version_tag_filter(mut self, filter: VersionTagFilter) -> Self {
        self.config.version_tag_filter = filter;
        self
    }

    pub fn auto_tag_latest_commit(mut self, value: bool) -> Self {
        self.config.auto_tag_latest_commit = value;
        self
    }

    pub fn current_build_tag_name(mut self, name: impl Into<String>) -> Self {
        self.config.current_build_tag_name = name.into();
        self
    }

    pub fn exclusion_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.exclusion_tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn correct_typos(mut self, value: bool) -> Self {
        self.config.correct_typos = value;
        self
    }

    pub fn typo_map(mut self, typo_map: Vec<(String, String)>) -> Self {
        self.config.typo_map = typo_map;
        self
    }

    pub fn label_groups(mut self, groups: Vec<LabelGroup>) -> Self {
        self.config.label_groups = groups;
        self
    }

    pub fn separate_pull_requests(mut self, value: bool) -> Self {
        self.config.separate_pull_requests = value;
        self
    }

    pub fn pull_request_title(mut self, title: impl Into<String>) -> Self {
        self.config.pull_request_title = title.into();
        self
    }

    pub fn show_detail(mut self, value: bool) -> Self {
        self.config.show_detail = value;
        self
    }

    pub fn use_stored_issues(mut self, value: bool) -> Self {
        self.config.use_stored_issues = value;
        self
    }

    pub fn store_issues_locally(mut self, value: bool) -> Self {
        self.config.store_issues_locally = value;
        self
    }

    pub fn issues_filename(mut self, name: impl Into<String>) -> Self {
        self.config.issues_filename = name.into();
        self
    }

    /// Validate and freeze the configuration.
    pub fn build(self) -> Result<ChangelogConfig, ConfigError> {
        let config = self.config;

        if config.project_name.is_empty() {
            return Err(ConfigError::MissingField("project_name"));
        }
        if config.remote_repo_user.is_empty() {
            return Err(ConfigError::MissingField("remote_repo_user"));
        }

        match config.processing_mode {
            ProcessingMode::Versions => {
                if config.from_commit_id.is_some() {
                    return Err(ConfigError::CommitBoundInVersionMode {
                        bound: "from_commit_id",
                    });
                }
                if config.to_commit_id.is_some() {
                    return Err(ConfigError::CommitBoundInVersionMode {
                        bound: "to_commit_id",
                    });
                }
            }
            ProcessingMode::Commits => {
                if config.from_version_id.is_some() {
                    return Err(ConfigError::VersionBoundInCommitMode {
                        bound: "from_version_id",
                    });
                }
                if config.to_version_id.is_some() {
                    return Err(ConfigError::VersionBoundInCommitMode {
                        bound: "to_version_id",
                    });
                }
                if config.from_commit_id.is_none() && config.max_commits == 0 {
                    return Err(ConfigError::NoCommitLimit);
                }
            }
        }

        Ok(config)
    }
}
