//! Version history: partitioning commits into versions and resolving their
//! issue references.

pub mod builder;
pub mod record;
pub mod resolver;
pub mod tag_index;

pub use builder::{CommitCursor, VersionHistoryBuilder};
pub use record::{ExpandedCommit, IssueGroup, VersionRecord};
pub use resolver::{CommitMessageResolver, IssueReference, parse_reference, tokenize};
pub use tag_index::TagIndex;

use tracing::{error, info};

use crate::config::ChangelogConfig;
use crate::error::HistoryError;
use crate::git::{Commit, Tag};
use crate::issues::{IssueCache, IssueTracker};

/// Build the version records for `commits` and resolve each one.
///
/// A record whose resolution fails is logged and kept unresolved, so the
/// remaining versions are still produced.
pub async fn generate_history<T>(
    commits: &[Commit],
    tags: &[Tag],
    config: &ChangelogConfig,
    tracker: &T,
    cache: &mut IssueCache,
) -> Result<Vec<VersionRecord>, HistoryError>
where
    T: IssueTracker + ?Sized,
{
    let mut records = VersionHistoryBuilder::new(config).build(commits, tags)?;
    info!(versions = records.len(), "Built version history");

    let mut resolver = CommitMessageResolver::new(config, tracker, cache);
    for record in &mut records {
        if let Err(e) = resolver.resolve(record).await {
            error!(tag = %record.tag_name(), error = %e, "Failed to resolve issues for version");
            record.mark_unresolved();
        }
    }

    Ok(records)
}
