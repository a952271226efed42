//! Changelog rendering and writing.

pub mod format;
pub mod writer;

pub use format::{format_version_section, generate_summary, project_url, render_changelog};
pub use writer::write_changelog;
