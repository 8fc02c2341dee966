//! Mirroring configuration
//!
//! [`MirrorConfig`] is the raw, deserializable form. [`MirrorEnv`] is the
//! validated form, built once at startup and passed by reference to
//! everything that remaps or plans.

use std::path::{Path, PathBuf};

use mirror_fs::{ConfigStore, NormalizedPath};
use serde::{Deserialize, Serialize};

use crate::plan::{DirectoryPlan, PathKind, plan_directories};
use crate::remap::{RemapRequest, RemapResult, remap};
use crate::{Error, Result};

/// Suffix appended to the source dir when no target dir is configured.
pub const DEFAULT_TARGET_SUFFIX: &str = "-target";

/// Raw mirroring configuration as found in a config file.
///
/// # Example
///
/// ```toml
/// project_root = "/home/me/project"
/// source_dir = "test"
/// source_src_dir = "test/src"
/// target_dir = "test-target"
/// debug = true
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MirrorConfig {
    /// Root of the tree being mirrored. Must be absolute.
    pub project_root: Option<PathBuf>,
    /// Subtree handed to the transform step, relative to the project root
    /// or absolute.
    #[serde(default)]
    pub source_dir: Option<PathBuf>,
    #[serde(default)]
    pub source_src_dir: Option<PathBuf>,
    /// Root of the mirror. Defaults to `<source_dir>-target`.
    #[serde(default)]
    pub target_dir: Option<PathBuf>,
    /// Logical segment count of the target root. Defaults to the target
    /// dir's own segment count.
    #[serde(default)]
    pub target_root_depth: Option<usize>,
    #[serde(default)]
    pub debug: bool,
}

impl MirrorConfig {
    /// Load from a `.toml`, `.json`, `.yaml` or `.yml` file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        Ok(ConfigStore::new().load(&NormalizedPath::new(path))?)
    }

    /// Check the configuration and resolve every path.
    pub fn validate(&self) -> Result<MirrorEnv> {
        let project_root = self
            .project_root
            .as_ref()
            .map(NormalizedPath::new)
            .ok_or_else(|| Error::configuration("project_root is not set"))?;
        if !project_root.is_absolute() {
            return Err(Error::configuration(format!(
                "project_root must be absolute, got '{project_root}'"
            )));
        }

        let resolve = |p: &PathBuf| NormalizedPath::resolve(&project_root, p);
        let source_dir = self.source_dir.as_ref().map(resolve);
        let source_src_dir = self.source_src_dir.as_ref().map(resolve);

        let target_dir = match (&self.target_dir, &source_dir) {
            (Some(target), _) => resolve(target),
            (None, Some(source)) if source.file_name().is_some() => {
                NormalizedPath::new(format!("{source}{DEFAULT_TARGET_SUFFIX}"))
            }
            _ => {
                return Err(Error::configuration(
                    "target_dir is not set and cannot be derived from source_dir",
                ));
            }
        };

        let target_root_depth = match self.target_root_depth {
            Some(0) => {
                return Err(Error::configuration("target_root_depth must be at least 1"));
            }
            Some(depth) => depth,
            None => target_dir.segment_count(),
        };
        if target_root_depth == 0 {
            return Err(Error::configuration(format!(
                "target dir '{target_dir}' has no segments; the filesystem root cannot be a mirror"
            )));
        }

        tracing::debug!(
            project_root = %project_root,
            target_dir = %target_dir,
            target_root_depth,
            "Validated mirror configuration"
        );

        Ok(MirrorEnv {
            project_root,
            source_dir,
            source_src_dir,
            target_dir,
            target_root_depth,
            debug: self.debug,
        })
    }
}

/// Validated, immutable mirroring environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MirrorEnv {
    project_root: NormalizedPath,
    source_dir: Option<NormalizedPath>,
    source_src_dir: Option<NormalizedPath>,
    target_dir: NormalizedPath,
    target_root_depth: usize,
    debug: bool,
}

impl MirrorEnv {
    pub fn project_root(&self) -> &NormalizedPath {
        &self.project_root
    }

    pub fn source_dir(&self) -> Option<&NormalizedPath> {
        self.source_dir.as_ref()
    }

    pub fn source_src_dir(&self) -> Option<&NormalizedPath> {
        self.source_src_dir.as_ref()
    }

    pub fn target_dir(&self) -> &NormalizedPath {
        &self.target_dir
    }

    pub fn target_root_depth(&self) -> usize {
        self.target_root_depth
    }

    pub fn debug(&self) -> bool {
        self.debug
    }

    pub fn remap_request(&self, item: impl AsRef<Path>) -> RemapRequest {
        RemapRequest {
            item: item.as_ref().to_path_buf(),
            project_root: self.project_root.clone(),
            target_root: self.target_dir.clone(),
            target_root_depth: self.target_root_depth,
        }
    }

    /// Map an item into the target tree.
    pub fn remap(&self, item: impl AsRef<Path>) -> Result<RemapResult> {
        remap(&self.remap_request(item))
    }

    /// Plan the directories for a path under the target dir.
    pub fn plan_directories(&self, path: &NormalizedPath, kind: PathKind) -> Result<DirectoryPlan> {
        plan_directories(&self.target_dir, path, kind)
    }
}
