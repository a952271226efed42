//! Integration tests for reading commits and tags from a repository.
//!
//! Tests `fetch_commits` and `get_all_tags` from `src/git/` using
//! temporary git repositories.

mod common;

use annalist::error::GitError;
use annalist::git::{TagKind, fetch_commits, get_all_tags, open_repository};
use common::TestRepo;

// =============================================================================
// COMMITS
// =============================================================================

#[test]
fn test_fetch_commits_newest_first() {
    let test_repo = TestRepo::new();

    let first = test_repo.commit("Initial commit");
    let second = test_repo.commit("Add spinner");
    let third = test_repo.commit("Fixes #3");

    let commits = fetch_commits(&test_repo.repo, "main").expect("Failed to fetch commits");

    let hashes: Vec<String> = commits.iter().map(|c| c.hash.clone()).collect();
    assert_eq!(
        hashes,
        vec![third.to_string(), second.to_string(), first.to_string()]
    );
    assert_eq!(commits[0].message, "Fixes #3");
    assert_eq!(commits[0].author.name, "Test User");
    assert_eq!(commits[0].committer.email, "test@example.com");
}

#[test]
fn test_fetch_commits_from_other_branch() {
    let test_repo = TestRepo::new();

    let first = test_repo.commit("Initial commit");
    test_repo.branch("release", first);
    test_repo.commit("Later work on main");

    let commits = fetch_commits(&test_repo.repo, "release").expect("Failed to fetch commits");

    assert_eq!(commits.len(), 1);
    assert_eq!(commits[0].hash, first.to_string());
}

#[test]
fn test_fetch_commits_accepts_revspec() {
    let test_repo = TestRepo::new();
    test_repo.commit("Initial commit");
    test_repo.commit("Second");

    let commits = fetch_commits(&test_repo.repo, "HEAD").expect("Failed to fetch commits");
    assert_eq!(commits.len(), 2);
}

#[test]
fn test_fetch_commits_unknown_branch() {
    let test_repo = TestRepo::new();
    test_repo.commit("Initial commit");

    assert!(fetch_commits(&test_repo.repo, "does-not-exist").is_err());
}

#[test]
fn test_open_repository_at_work_tree() {
    let test_repo = TestRepo::new();
    let oid = test_repo.commit("Initial commit");

    let repo = open_repository(test_repo.dir.path()).expect("Failed to open repository");
    let commits = fetch_commits(&repo, "main").expect("Failed to fetch commits");
    assert_eq!(commits[0].hash, oid.to_string());
}

#[test]
fn test_open_repository_outside_git() {
    let dir = common::temp_test_dir();

    let result = open_repository(dir.path());
    assert!(matches!(result, Err(GitError::OpenRepository(_))));
}

// =============================================================================
// TAGS
// =============================================================================

#[test]
fn test_get_all_tags_empty_repo() {
    let test_repo = TestRepo::new();
    test_repo.commit("Initial commit");

    let tags = get_all_tags(&test_repo.repo).expect("Failed to read tags");
    assert!(tags.is_empty());
}

#[test]
fn test_lightweight_tag_uses_commit_details() {
    let test_repo = TestRepo::new();
    let commit = test_repo.commit("Initial commit");
    test_repo.tag_lightweight("v1.0.0", commit);

    let tags = get_all_tags(&test_repo.repo).expect("Failed to read tags");

    assert_eq!(tags.len(), 1);
    let tag = &tags[0];
    assert_eq!(tag.name, "v1.0.0");
    assert_eq!(tag.kind, TagKind::Version);
    assert_eq!(tag.commit_hash, commit.to_string());
    assert_eq!(tag.release_date, tag.commit_date);
    assert_eq!(tag.tagger.name, "Test User");
    assert!(tag.description.is_empty());
}

#[test]
fn test_annotated_tag_resolves_to_commit() {
    let test_repo = TestRepo::new();
    let commit = test_repo.commit("Initial commit");
    test_repo.commit("Second commit");
    test_repo.tag_annotated("v0.9.0", commit, "First beta\n");

    let tags = get_all_tags(&test_repo.repo).expect("Failed to read tags");

    assert_eq!(tags.len(), 1);
    let tag = &tags[0];
    assert_eq!(tag.name, "v0.9.0");
    assert_eq!(tag.commit_hash, commit.to_string());
    assert_eq!(tag.description, "First beta");
    assert_eq!(tag.tagger.email, "test@example.com");
}

#[test]
fn test_mixed_tags_are_all_read() {
    let test_repo = TestRepo::new();
    let first = test_repo.commit("Initial commit");
    let second = test_repo.commit("Second commit");
    test_repo.tag_lightweight("v1.0.0", first);
    test_repo.tag_annotated("v2.0.0", second, "Second release");

    let mut names: Vec<String> = get_all_tags(&test_repo.repo)
        .expect("Failed to read tags")
        .into_iter()
        .map(|t| t.name)
        .collect();
    names.sort();

    assert_eq!(names, vec!["v1.0.0".to_string(), "v2.0.0".to_string()]);
}
