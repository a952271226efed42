//! Git operations using git2-rs.

pub mod commits;
pub mod tags;

pub use commits::{Commit, Identity, fetch_commits, open_repository};
pub use tags::{Tag, TagKind, get_all_tags, get_version_from_tag};
