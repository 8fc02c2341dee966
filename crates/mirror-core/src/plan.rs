//! Directory plans for mirrored paths
//!
//! A plan lists, outermost first, the directories under a target root that
//! must exist before a mirrored path can be written. Building a plan is
//! pure; materializing it is left to a
//! [`DirectoryMaterializer`](mirror_fs::DirectoryMaterializer).

use std::collections::HashSet;

use mirror_fs::NormalizedPath;

use crate::{Error, Result, Warning};

/// Whether a planned path is a file (its leaf is not a directory to create)
/// or a directory (its leaf is created too).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathKind {
    File,
    Directory,
}

impl PathKind {
    /// Classify an on-disk path. Paths that do not exist yet are files.
    pub fn of(path: &NormalizedPath) -> Self {
        if path.is_dir() {
            Self::Directory
        } else {
            Self::File
        }
    }
}

/// Ordered directories to create under `target_root`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryPlan {
    pub target_root: NormalizedPath,
    /// Outermost first; every entry's parent is `target_root` or an earlier
    /// entry.
    pub directories: Vec<NormalizedPath>,
    pub warnings: Vec<Warning>,
}

impl DirectoryPlan {
    fn empty(target_root: &NormalizedPath) -> Self {
        Self {
            target_root: target_root.clone(),
            directories: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.directories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.directories.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, NormalizedPath> {
        self.directories.iter()
    }
}

impl<'a> IntoIterator for &'a DirectoryPlan {
    type Item = &'a NormalizedPath;
    type IntoIter = std::slice::Iter<'a, NormalizedPath>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Plan the directories needed to hold `path` under `target_root`.
///
/// With `l` the segment count of `target_root`, every prefix of `path`'s
/// containing segments that is at least `l` long contributes its segments
/// past index `l`, joined onto `target_root`. The target root itself is not
/// part of the plan. A path that does not reach `l` segments gets an empty
/// plan and a [`Warning::ShallowPath`].
pub fn plan_directories(
    target_root: &NormalizedPath,
    path: &NormalizedPath,
    kind: PathKind,
) -> Result<DirectoryPlan> {
    target_root.require_absolute()?;
    path.require_absolute()?;

    let root_len = target_root.segment_count();
    let mut items = path.segments();
    if kind == PathKind::File {
        items.pop();
    }
    tracing::trace!(root_len, items = items.len(), "Planning directories");

    let mut plan = DirectoryPlan::empty(target_root);
    if items.len() < root_len {
        let warning = Warning::ShallowPath {
            path: path.clone(),
            target_root: target_root.clone(),
        };
        tracing::warn!("{warning}");
        plan.warnings.push(warning);
        return Ok(plan);
    }

    loop {
        if items.len() < root_len {
            break;
        }
        let slice = &items[root_len..];
        if !slice.is_empty() {
            plan.directories.push(target_root.join_segments(slice));
        }
        if items.pop().is_none() {
            break;
        }
    }
    plan.directories.reverse();

    tracing::debug!(path = %path, dirs = ?plan.directories, "Directory plan");
    Ok(plan)
}

/// Like [`plan_directories`], classifying `path` by looking at the disk.
pub fn plan_directories_on_disk(
    target_root: &NormalizedPath,
    path: &NormalizedPath,
) -> Result<DirectoryPlan> {
    plan_directories(target_root, path, PathKind::of(path))
}

/// Whether some entry of `paths` other than `paths[index]` lies at or below
/// `candidate`.
///
/// Comparison is by whole segments: `/a/bc` is not below `/a/b`.
pub fn path_already_in_list(
    paths: &[NormalizedPath],
    candidate: &NormalizedPath,
    index: usize,
) -> bool {
    paths
        .iter()
        .enumerate()
        .any(|(i, path)| i != index && is_within(path, candidate))
}

/// Whether `path` is `ancestor` or lies below it, by whole segments.
pub(crate) fn is_within(path: &NormalizedPath, ancestor: &NormalizedPath) -> bool {
    if path.root() != ancestor.root() {
        return false;
    }
    path.segments().starts_with(&ancestor.segments())
}

/// Plan the directories for a batch of paths as one sequence.
///
/// Paths are reduced to their containing directories. A directory lying at
/// or above another entry is skipped because the deeper entry's plan
/// creates it, and directories shared between plans appear once, so the
/// result stays parent-before-child when replayed in order.
pub fn plan_batch(
    target_root: &NormalizedPath,
    paths: &[(NormalizedPath, PathKind)],
) -> Result<DirectoryPlan> {
    let mut containing: Vec<NormalizedPath> = Vec::with_capacity(paths.len());
    for (path, kind) in paths {
        let dir = match kind {
            PathKind::Directory => path.clone(),
            PathKind::File => path
                .parent()
                .ok_or_else(|| Error::invariant(format!("file path {path} has no parent")))?,
        };
        if !containing.contains(&dir) {
            containing.push(dir);
        }
    }

    let mut batch = DirectoryPlan::empty(target_root);
    let mut seen = HashSet::new();
    for (index, dir) in containing.iter().enumerate() {
        if path_already_in_list(&containing, dir, index) {
            tracing::trace!(dir = %dir, "Covered by a deeper plan");
            continue;
        }
        let plan = plan_directories(target_root, dir, PathKind::Directory)?;
        batch.warnings.extend(plan.warnings);
        for planned in plan.directories {
            if seen.insert(planned.clone()) {
                batch.directories.push(planned);
            }
        }
    }
    Ok(batch)
}
