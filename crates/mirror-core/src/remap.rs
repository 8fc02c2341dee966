//! Re-rooting item paths from the project tree into the target tree

use std::path::PathBuf;

use mirror_fs::NormalizedPath;
use serde::Serialize;

use crate::shared::remove_shared_root_path;
use crate::{Error, Result};

/// Slack allowed between the mapped path and the item before the remainder
/// is trimmed.
///
/// The target root is measured in components including the filesystem root
/// while the item is measured in segments, so an offset of one keeps the
/// mapped path at exactly the item's segment count.
pub const TRIM_THRESHOLD_OFFSET: usize = 1;

/// A request to map one item under the target root.
#[derive(Debug, Clone)]
pub struct RemapRequest {
    /// Absolute, or relative to `project_root`.
    pub item: PathBuf,
    pub project_root: NormalizedPath,
    pub target_root: NormalizedPath,
    /// Segment count of the configured target root.
    pub target_root_depth: usize,
}

/// Where an item lives and where its mirror goes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct RemapResult {
    pub original_path: NormalizedPath,
    pub target_path: NormalizedPath,
}

/// Whether a remainder of `remainder_len` segments would make the mapped
/// path longer than the item it came from.
pub fn exceeds_item_length(
    remainder_len: usize,
    target_root_depth: usize,
    original_len: usize,
) -> bool {
    let target_components = target_root_depth + 1;
    remainder_len + target_components > original_len + TRIM_THRESHOLD_OFFSET
}

/// Map `request.item` to its location under `request.target_root`.
///
/// The item's segments past its shared prefix with the project root are
/// trimmed from the front until the mapped path is no longer than the item,
/// then joined onto the target root.
pub fn remap(request: &RemapRequest) -> Result<RemapResult> {
    if !request.project_root.is_absolute() {
        return Err(Error::configuration(format!(
            "project root must be absolute, got '{}'",
            request.project_root
        )));
    }
    if !request.target_root.is_absolute() {
        return Err(Error::configuration(format!(
            "target root must be absolute, got '{}'",
            request.target_root
        )));
    }
    if request.target_root_depth == 0 {
        return Err(Error::configuration("target root depth must be at least 1"));
    }

    let item = NormalizedPath::resolve(&request.project_root, &request.item);
    let original_len = item.segment_count();
    tracing::debug!(item = %item, segments = ?item.segments(), "Remapping item");

    let split = remove_shared_root_path(&[request.project_root.clone(), item.clone()])?;
    let remainder = &split.remainders[1].remainder;
    tracing::debug!(
        original_len,
        target_root_depth = request.target_root_depth,
        shared = %split.shared,
        ?remainder,
        "Remainder before trim"
    );

    let mut start = 0;
    while start < remainder.len()
        && exceeds_item_length(remainder.len() - start, request.target_root_depth, original_len)
    {
        start += 1;
    }
    let kept = &remainder[start..];
    tracing::debug!(?kept, "Remainder after trim");

    let target_path = request.target_root.join_segments(kept);
    tracing::debug!(target = %target_path, "Remapped");

    Ok(RemapResult {
        original_path: item,
        target_path,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(item: &str, project: &str, target: &str, depth: usize) -> RemapRequest {
        RemapRequest {
            item: item.into(),
            project_root: NormalizedPath::new(project),
            target_root: NormalizedPath::new(target),
            target_root_depth: depth,
        }
    }

    #[test]
    fn test_threshold_boundary() {
        // remainder == original - depth: kept as is
        assert!(!exceeds_item_length(2, 2, 4));
        // one more segment: trimmed
        assert!(exceeds_item_length(3, 2, 4));
    }

    #[test]
    fn test_sibling_source_and_target_dirs() {
        let result = remap(&request(
            "/proj/test/test-src/example.js",
            "/proj",
            "/proj/test/test-target",
            3,
        ))
        .unwrap();
        assert_eq!(result.target_path.as_str(), "/proj/test/test-target/example.js");
    }

    #[test]
    fn test_fully_trimmed_remainder_lands_on_target_root() {
        let result = remap(&request("/proj/a.js", "/proj", "/x/y/z/w", 4)).unwrap();
        assert_eq!(result.target_path.as_str(), "/x/y/z/w");
    }

    #[test]
    fn test_zero_depth_is_configuration_error() {
        let err = remap(&request("/proj/a.js", "/proj", "/out", 0)).unwrap_err();
        assert!(matches!(err, Error::Configuration { .. }));
    }
}
