//! Issue records as returned by an issue tracker.

use serde::{Deserialize, Serialize};

/// An issue or pull request. Treated as immutable once obtained.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    pub number: u64,
    pub title: String,
    #[serde(default)]
    pub body: Option<String>,
    pub html_url: String,
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default)]
    pub pull_request: bool,
}

impl Issue {
    pub fn has_label(&self, label: &str) -> bool {
        self.labels.iter().any(|l| l == label)
    }

    /// Markdown link used in place of the reference in commit text.
    pub fn markdown_link(&self) -> String {
        format!("[{}]({})", self.number, self.html_url)
    }
}

/// Canonical URL of an issue, used as its cache key.
pub fn issue_url(base_url: &str, owner: &str, repo: &str, number: u64) -> String {
    format!(
        "{}/{}/{}/issues/{}",
        base_url.trim_end_matches('/'),
        owner,
        repo,
        number
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issue_url() {
        assert_eq!(
            issue_url("https://github.com/", "org", "other", 7),
            "https://github.com/org/other/issues/7"
        );
    }

    #[test]
    fn test_markdown_link() {
        let issue = Issue {
            number: 12,
            title: "Widget breaks".to_string(),
            body: None,
            html_url: "https://github.com/acme/widgets/issues/12".to_string(),
            labels: vec!["bug".to_string()],
            pull_request: false,
        };
        assert_eq!(
            issue.markdown_link(),
            "[12](https://github.com/acme/widgets/issues/12)"
        );
        assert!(issue.has_label("bug"));
        assert!(!issue.has_label("task"));
    }

    #[test]
    fn test_deserialize_with_missing_optional_fields() {
        let json = r#"{"number": 3, "title": "t", "html_url": "https://x/3"}"#;
        let issue: Issue = serde_json::from_str(json).unwrap();
        assert_eq!(issue.number, 3);
        assert!(issue.labels.is_empty());
        assert!(!issue.pull_request);
    }
}
