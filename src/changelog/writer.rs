//! Write the rendered changelog document.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::ChangelogError;

/// Backup path for an existing changelog, e.g. `CHANGELOG.md.bak`.
pub fn backup_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(".bak");
    PathBuf::from(name)
}

/// Write `content` to `path`.
///
/// - Creates the file if it doesn't exist
/// - Backs up an existing file to `<filename>.bak` first
///
/// Returns the backup path when one was made.
pub fn write_changelog(path: &Path, content: &str) -> Result<Option<PathBuf>, ChangelogError> {
    let backup = if path.exists() {
        let backup = backup_path(path);
        std::fs::copy(path, &backup).map_err(ChangelogError::BackupFailed)?;
        debug!(backup = %backup.display(), "Backed up existing changelog");
        Some(backup)
    } else {
        None
    };

    std::fs::write(path, content).map_err(ChangelogError::WriteFailed)?;
    Ok(backup)
}
