//! Project root discovery
//!
//! Walks up from a starting directory to the nearest ancestor that carries
//! a project marker. Callers compute the root once and thread it through a
//! [`MirrorEnv`](crate::MirrorEnv); nothing is cached here.

use std::path::Path;

use mirror_fs::NormalizedPath;

use crate::Result;

/// Files or directories whose presence marks a project root.
pub const DEFAULT_MARKERS: &[&str] = &["Cargo.toml", "package.json", ".git"];

/// Find the nearest ancestor of `start` (inclusive) containing one of
/// [`DEFAULT_MARKERS`].
pub fn find_project_root(start: impl AsRef<Path>) -> Result<Option<NormalizedPath>> {
    find_project_root_with(start, DEFAULT_MARKERS)
}

/// Find the nearest ancestor of `start` (inclusive) containing any of
/// `markers`.
///
/// `start` is canonicalized first, so it must exist.
pub fn find_project_root_with(
    start: impl AsRef<Path>,
    markers: &[&str],
) -> Result<Option<NormalizedPath>> {
    let mut current = Some(NormalizedPath::canonicalize(start)?);

    while let Some(dir) = current {
        if let Some(marker) = markers.iter().find(|m| dir.join(m).exists()) {
            tracing::debug!(root = %dir, marker = *marker, "Found project root");
            return Ok(Some(dir));
        }
        current = dir.parent();
    }

    tracing::debug!("No project root marker found");
    Ok(None)
}
