//! annalist - CLI entry point.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use git2::Repository;
use tracing_subscriber::EnvFilter;

use annalist::changelog::{generate_summary, render_changelog, write_changelog};
use annalist::config::{ChangelogConfig, LabelGroup, VersionTagFilter};
use annalist::git::{fetch_commits, get_all_tags, open_repository};
use annalist::history::generate_history;
use annalist::issues::{GitHubTracker, IssueCache, get_github_token, parse_github_remote};

/// Generate a versioned change log from git tags and the issues commits fix.
#[derive(Parser, Debug)]
#[command(name = "annalist")]
#[command(about = "Generate a versioned change log from git tags and the issues commits fix")]
#[command(version)]
struct Cli {
    /// Path to the git repository
    #[arg(short = 'C', long, default_value = ".")]
    repo: PathBuf,

    /// Branch to walk
    #[arg(short, long, default_value = "main")]
    branch: String,

    /// GitHub owner (defaults to the owner of the 'origin' remote)
    #[arg(long)]
    owner: Option<String>,

    /// GitHub repository name (defaults to the 'origin' remote)
    #[arg(long)]
    project: Option<String>,

    /// Produce one record for a range of commits instead of versions
    #[arg(long)]
    commits: bool,

    /// Earliest version to include
    #[arg(long, conflicts_with = "commits")]
    from_version: Option<String>,

    /// Latest version to include
    #[arg(long, conflicts_with = "commits")]
    to_version: Option<String>,

    /// Oldest commit to include in commit mode
    #[arg(long, requires = "commits")]
    from_commit: Option<String>,

    /// Newest commit to include in commit mode
    #[arg(long, requires = "commits")]
    to_commit: Option<String>,

    /// Maximum number of versions (0 for no limit)
    #[arg(long, default_value_t = annalist::config::DEFAULT_MAX_VERSIONS)]
    max_versions: u32,

    /// Maximum number of commits in commit mode without --from-commit
    #[arg(long, default_value_t = annalist::config::DEFAULT_MAX_COMMITS)]
    max_commits: u32,

    /// Only treat semver tags as versions
    #[arg(long, conflicts_with = "tag_pattern")]
    semver_tags: bool,

    /// Only treat tags matching this regex as versions
    #[arg(long)]
    tag_pattern: Option<String>,

    /// Don't add a current build pseudo-tag to an untagged latest commit
    #[arg(long)]
    no_auto_tag: bool,

    /// Name of the current build pseudo-tag
    #[arg(long)]
    current_build_name: Option<String>,

    /// Issue tracker base URL used for issue links
    #[arg(long, default_value = annalist::config::DEFAULT_TRACKER_BASE_URL)]
    tracker_url: String,

    /// Commits whose message contains this text are left out (repeatable)
    #[arg(long = "exclude")]
    exclusion_tags: Vec<String>,

    /// Rewrite malformed references such as "Fix#12" before parsing
    #[arg(long)]
    correct_typos: bool,

    /// Typo correction as FROM=TO (repeatable, replaces the defaults)
    #[arg(long = "typo", value_parser = parse_typo)]
    typos: Vec<(String, String)>,

    /// Label group as NAME=label1,label2 (repeatable, replaces the defaults)
    #[arg(long = "label-group", value_parser = parse_label_group)]
    label_groups: Vec<LabelGroup>,

    /// Classify pull requests by label like issues
    #[arg(long)]
    merge_pull_requests: bool,

    /// Heading of the pull request group
    #[arg(long, default_value = annalist::config::DEFAULT_PULL_REQUESTS_TITLE)]
    pull_request_title: String,

    /// Leave the commit list out of each version
    #[arg(long)]
    no_detail: bool,

    /// Issue records file
    #[arg(long, default_value = annalist::config::DEFAULT_ISSUES_FILENAME)]
    issues_file: PathBuf,

    /// Don't read previously stored issue records
    #[arg(long)]
    no_stored_issues: bool,

    /// Don't store issue records after the run
    #[arg(long)]
    no_store_issues: bool,

    /// Path to changelog file
    #[arg(short = 'o', long, default_value = "CHANGELOG.md")]
    output: PathBuf,

    /// Dry run - print changelog without writing
    #[arg(long)]
    dry_run: bool,

    /// Show debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn parse_label_group(value: &str) -> Result<LabelGroup, String> {
    let (name, labels) = value
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=label1,label2, got '{value}'"))?;
    if name.trim().is_empty() {
        return Err("label group name must not be empty".to_string());
    }
    let labels = labels
        .split(',')
        .map(str::trim)
        .filter(|l| !l.is_empty());
    Ok(LabelGroup::new(name.trim(), labels))
}

fn parse_typo(value: &str) -> Result<(String, String), String> {
    let (from, to) = value
        .split_once('=')
        .ok_or_else(|| format!("expected FROM=TO, got '{value}'"))?;
    if from.is_empty() {
        return Err("typo must not be empty".to_string());
    }
    Ok((from.to_string(), to.to_string()))
}

/// Issue records are stored only when the run writes its output.
fn should_store_issues(config: &ChangelogConfig, dry_run: bool) -> bool {
    config.store_issues_locally && !dry_run
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "annalist=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    // Step 1: Open git repository
    let repo = open_repository(&cli.repo)
        .context("Not a git repository. Run annalist from within a git repository or pass --repo.")?;

    // Step 2: Work out which GitHub project the references belong to
    let (owner, project) = project_coordinates(&repo, cli.owner.clone(), cli.project.clone())?;
    let config = build_config(&cli, owner, project)?;

    // Step 3: Read commits and tags
    let commits = fetch_commits(&repo, &config.branch).context("Failed to fetch commits")?;
    let tags = get_all_tags(&repo).context("Failed to read tags")?;
    println!("Found {} commits and {} tags", commits.len(), tags.len());

    if commits.is_empty() {
        println!("No commits on {}. Nothing to add.", config.branch);
        return Ok(());
    }

    // Step 4: Issue tracker and stored issue records
    let token = get_github_token().context("GitHub authentication required for issue lookups")?;
    let tracker = GitHubTracker::new(&token).context("Failed to create GitHub client")?;

    let issues_path = Path::new(&config.issues_filename);
    let mut cache = IssueCache::new(&config.tracker_base_url);
    if config.use_stored_issues {
        cache
            .load_file(issues_path)
            .context("Failed to read stored issue records")?;
    }

    // Step 5: Build and resolve the version history
    let records = generate_history(&commits, &tags, &config, &tracker, &mut cache)
        .await
        .context("Failed to build version history")?;

    if should_store_issues(&config, cli.dry_run) {
        cache
            .save_file(issues_path)
            .context("Failed to store issue records")?;
    }

    // Step 6: Write or display changelog
    let document = render_changelog(&records, &config);
    if cli.dry_run {
        println!("\n--- Dry Run Output ---\n");
        print!("{document}");
    } else {
        write_changelog(&cli.output, &document).context("Failed to write changelog")?;
        println!("✓ {} to {}", generate_summary(&records), display(&cli.output));
    }

    Ok(())
}

/// Owner and repository from the flags, falling back to the 'origin' remote.
fn project_coordinates(
    repo: &Repository,
    owner: Option<String>,
    project: Option<String>,
) -> Result<(String, String)> {
    if let (Some(owner), Some(project)) = (&owner, &project) {
        return Ok((owner.clone(), project.clone()));
    }

    let remote = repo
        .find_remote("origin")
        .context("No 'origin' remote found; pass --owner and --project")?;
    let url = remote.url().context("Remote has no URL")?;
    let (remote_owner, remote_project) =
        parse_github_remote(url).context("Could not parse GitHub remote URL")?;

    Ok((
        owner.unwrap_or(remote_owner),
        project.unwrap_or(remote_project),
    ))
}

fn build_config(cli: &Cli, owner: String, project: String) -> Result<ChangelogConfig> {
    let mut builder = ChangelogConfig::builder()
        .project_name(project)
        .remote_repo_user(owner)
        .branch(&cli.branch)
        .max_versions(cli.max_versions)
        .max_commits(cli.max_commits)
        .auto_tag_latest_commit(!cli.no_auto_tag)
        .exclusion_tags(cli.exclusion_tags.iter().cloned())
        .correct_typos(cli.correct_typos)
        .tracker_base_url(&cli.tracker_url)
        .separate_pull_requests(!cli.merge_pull_requests)
        .pull_request_title(&cli.pull_request_title)
        .show_detail(!cli.no_detail)
        .use_stored_issues(!cli.no_stored_issues)
        .store_issues_locally(!cli.no_store_issues)
        .issues_filename(display(&cli.issues_file));

    builder = if cli.commits {
        builder.process_as_commits()
    } else {
        builder.process_as_versions()
    };

    if let Some(version) = &cli.from_version {
        builder = builder.from_version_id(version);
    }
    if let Some(version) = &cli.to_version {
        builder = builder.to_version_id(version);
    }
    if let Some(commit) = &cli.from_commit {
        builder = builder.from_commit_id(commit);
    }
    if let Some(commit) = &cli.to_commit {
        builder = builder.to_commit_id(commit);
    }

    if let Some(name) = &cli.current_build_name {
        builder = builder.current_build_tag_name(name);
    }
    if !cli.typos.is_empty() {
        builder = builder.typo_map(cli.typos.clone());
    }
    if !cli.label_groups.is_empty() {
        builder = builder.label_groups(cli.label_groups.clone());
    }

    if cli.semver_tags {
        builder = builder.version_tag_filter(VersionTagFilter::Semver);
    } else if let Some(pattern) = &cli.tag_pattern {
        builder = builder.version_tag_filter(VersionTagFilter::pattern(pattern)?);
    }

    Ok(builder.build()?)
}

fn display(path: &Path) -> String {
    path.display().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_typo() {
        assert_eq!(
            parse_typo("Fix#=Fix #"),
            Ok(("Fix#".to_string(), "Fix #".to_string()))
        );
    }

    #[test]
    fn test_parse_typo_keeps_spaces() {
        let (from, to) = parse_typo("fixes  #=fixes #").unwrap();
        assert_eq!(from, "fixes  #");
        assert_eq!(to, "fixes #");
    }

    #[test]
    fn test_parse_typo_rejects_malformed() {
        assert!(parse_typo("Fix#").is_err());
        assert!(parse_typo("=Fix #").is_err());
    }

    #[test]
    fn test_parse_label_group() {
        let group = parse_label_group("Bugs=bug, defect,").unwrap();
        assert_eq!(group.name, "Bugs");
        let labels: Vec<&str> = group.labels.iter().map(String::as_str).collect();
        assert_eq!(labels, ["bug", "defect"]);
    }

    #[test]
    fn test_typo_flag_reaches_config() {
        let cli = Cli::parse_from(["annalist", "--typo", "Fix#=Fix #", "--typo", "fix#=fix #"]);
        let config = build_config(&cli, "acme".into(), "widgets".into()).unwrap();
        assert_eq!(
            config.typo_map,
            [
                ("Fix#".to_string(), "Fix #".to_string()),
                ("fix#".to_string(), "fix #".to_string()),
            ]
        );
    }

    #[test]
    fn test_dry_run_does_not_store_issues() {
        let cli = Cli::parse_from(["annalist", "--dry-run"]);
        let config = build_config(&cli, "acme".into(), "widgets".into()).unwrap();
        assert!(config.store_issues_locally);
        assert!(!should_store_issues(&config, cli.dry_run));
    }

    #[test]
    fn test_issues_stored_after_normal_run() {
        let cli = Cli::parse_from(["annalist"]);
        let config = build_config(&cli, "acme".into(), "widgets".into()).unwrap();
        assert!(should_store_issues(&config, cli.dry_run));
    }
}
