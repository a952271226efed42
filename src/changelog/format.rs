//! Markdown rendering of version records.

use crate::config::ChangelogConfig;
use crate::git::Commit;
use crate::history::VersionRecord;

/// Base URL of the project on its tracker, e.g. `https://github.com/acme/widgets`.
pub fn project_url(config: &ChangelogConfig) -> String {
    format!(
        "{}/{}/{}",
        config.tracker_base_url.trim_end_matches('/'),
        config.remote_repo_user,
        config.project_name
    )
}

/// Render the whole changelog document.
pub fn render_changelog(records: &[VersionRecord], config: &ChangelogConfig) -> String {
    let mut doc = format!("# {} Change Log\n\n", config.project_name);
    for record in records {
        doc.push_str(&format_version_section(record, config));
    }
    doc
}

/// Format one version: heading, issue groups and optionally its commits.
pub fn format_version_section(record: &VersionRecord, config: &ChangelogConfig) -> String {
    let base = project_url(config);
    let mut section = format!(
        "## [{}]({}/tree/{}) - {}\n\n",
        record.tag_name(),
        base,
        record.tag_ref(&config.branch),
        record.release_date().format("%Y-%m-%d")
    );

    for group in record.fixes_by_group.iter().filter(|g| !g.issues.is_empty()) {
        section.push_str(&format!("### {}\n\n", group.name));
        for issue in &group.issues {
            section.push_str(&format!("- {} {}\n", issue.markdown_link(), issue.title));
        }
        section.push('\n');
    }

    if config.show_detail && record.has_commits() {
        section.push_str("### Commits\n\n");
        if record.expanded_commits.is_empty() {
            for commit in &record.commits {
                section.push_str(&commit_line(&base, commit, commit.short_message()));
            }
        } else {
            for expanded in &record.expanded_commits {
                section.push_str(&commit_line(
                    &base,
                    &expanded.commit,
                    &expanded.expanded_short_message,
                ));
            }
        }
        section.push('\n');
    }

    section
}

fn commit_line(base: &str, commit: &Commit, message: &str) -> String {
    format!(
        "- [{}]({base}/commit/{}) {message}\n",
        commit.short_hash(),
        commit.hash
    )
}

/// One-line summary for the user.
pub fn generate_summary(records: &[VersionRecord]) -> String {
    let versions = records.len();
    let fixes: usize = records
        .iter()
        .flat_map(|r| &r.fixes_by_group)
        .map(|g| g.issues.len())
        .sum();
    let version_word = if versions == 1 { "version" } else { "versions" };
    format!("Wrote {versions} {version_word} with {fixes} grouped issue references")
}
