//! Batch mirroring
//!
//! Ties the engine together for a caller: remap each item, materialize its
//! directory plan, then hand the source and target paths to a
//! [`Transform`]. One item's failure is recorded and the batch moves on.

use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use mirror_fs::{DirectoryMaterializer, FsMaterializer, NormalizedPath, RobustnessConfig, io};

use crate::config::MirrorEnv;
use crate::plan::{PathKind, is_within};
use crate::remap::RemapResult;
use crate::{Error, Result, Warning};

/// Produces a target file from a source file.
///
/// This is where a transpiler would plug in; [`CopyTransform`] just copies.
pub trait Transform: Send + Sync {
    /// Short name used in errors and logs.
    fn name(&self) -> &str;

    /// Write the transformed `source` to `target`. The target's directory
    /// already exists.
    fn transform(&self, source: &NormalizedPath, target: &NormalizedPath) -> Result<()>;
}

/// Copies bytes unchanged.
#[derive(Debug, Default, Clone, Copy)]
pub struct CopyTransform {
    robustness: RobustnessConfig,
}

impl CopyTransform {
    pub fn new(robustness: RobustnessConfig) -> Self {
        Self { robustness }
    }
}

impl Transform for CopyTransform {
    fn name(&self) -> &str {
        "copy"
    }

    fn transform(&self, source: &NormalizedPath, target: &NormalizedPath) -> Result<()> {
        let bytes = io::copy_file(source, target, self.robustness)?;
        tracing::trace!(source = %source, target = %target, bytes, "Copied");
        Ok(())
    }
}

/// Sends each file to the transform registered for its extension and
/// everything else to a fallback, [`CopyTransform`] unless replaced.
///
/// Extensions are matched without the dot and ignoring ASCII case.
///
/// ```
/// use mirror_core::{CopyTransform, ExtensionTransform};
///
/// let transform = ExtensionTransform::new().route(&["js", "jsx"], CopyTransform::default());
/// assert!(transform.handles("JSX"));
/// assert!(!transform.handles("json"));
/// ```
pub struct ExtensionTransform {
    routes: HashMap<String, Arc<dyn Transform>>,
    fallback: Arc<dyn Transform>,
}

impl ExtensionTransform {
    pub fn new() -> Self {
        Self {
            routes: HashMap::new(),
            fallback: Arc::new(CopyTransform::default()),
        }
    }

    /// Use `transform` for files with any of `extensions`.
    pub fn route(mut self, extensions: &[&str], transform: impl Transform + 'static) -> Self {
        let transform: Arc<dyn Transform> = Arc::new(transform);
        for extension in extensions {
            let key = extension.trim_start_matches('.').to_ascii_lowercase();
            self.routes.insert(key, Arc::clone(&transform));
        }
        self
    }

    pub fn with_fallback(mut self, transform: impl Transform + 'static) -> Self {
        self.fallback = Arc::new(transform);
        self
    }

    /// Whether `extension` has its own route.
    pub fn handles(&self, extension: &str) -> bool {
        self.routes.contains_key(&extension.to_ascii_lowercase())
    }

    fn select(&self, source: &NormalizedPath) -> &dyn Transform {
        source
            .extension()
            .and_then(|ext| self.routes.get(&ext.to_ascii_lowercase()))
            .unwrap_or(&self.fallback)
            .as_ref()
    }
}

impl Default for ExtensionTransform {
    fn default() -> Self {
        Self::new()
    }
}

impl Transform for ExtensionTransform {
    fn name(&self) -> &str {
        "by-extension"
    }

    fn transform(&self, source: &NormalizedPath, target: &NormalizedPath) -> Result<()> {
        let selected = self.select(source);
        tracing::trace!(source = %source, transform = selected.name(), "Routed");
        apply_transform(selected, source, target)
    }
}

/// Run `transform`, attributing any error that is not already a transform
/// error to it.
fn apply_transform(
    transform: &dyn Transform,
    source: &NormalizedPath,
    target: &NormalizedPath,
) -> Result<()> {
    transform.transform(source, target).map_err(|e| match e {
        Error::Transform { .. } => e,
        other => Error::Transform {
            transform: transform.name().to_string(),
            path: source.to_native(),
            message: other.to_string(),
        },
    })
}

/// What happened to one successfully mirrored item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemOutcome {
    pub mapping: RemapResult,
    pub kind: PathKind,
    pub directories_created: usize,
    pub files_written: usize,
    pub warnings: Vec<Warning>,
}

/// An item that could not be mirrored.
#[derive(Debug)]
pub struct ItemFailure {
    pub item: PathBuf,
    pub error: Error,
}

/// Aggregated result of a batch.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub mirrored: Vec<ItemOutcome>,
    pub failures: Vec<ItemFailure>,
}

impl BatchReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn files_written(&self) -> usize {
        self.mirrored.iter().map(|o| o.files_written).sum()
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Warning> {
        self.mirrored.iter().flat_map(|o| o.warnings.iter())
    }

    fn record(&mut self, item: &Path, result: Result<ItemOutcome>) {
        match result {
            Ok(outcome) => self.mirrored.push(outcome),
            Err(error) => {
                tracing::error!(item = %item.display(), %error, "Failed to mirror item");
                self.failures.push(ItemFailure {
                    item: item.to_path_buf(),
                    error,
                });
            }
        }
    }
}

/// Mirrors items from the project tree into the target tree.
pub struct Mirror<'env, M = FsMaterializer> {
    env: &'env MirrorEnv,
    materializer: M,
}

impl<'env> Mirror<'env, FsMaterializer> {
    pub fn new(env: &'env MirrorEnv) -> Self {
        Self::with_materializer(env, FsMaterializer)
    }
}

impl<'env, M: DirectoryMaterializer> Mirror<'env, M> {
    pub fn with_materializer(env: &'env MirrorEnv, materializer: M) -> Self {
        Self { env, materializer }
    }

    pub fn env(&self) -> &MirrorEnv {
        self.env
    }

    pub fn materializer(&self) -> &M {
        &self.materializer
    }

    /// Mirror every item in order.
    ///
    /// Fails outright only when `items` is empty or the target root cannot
    /// be created; per-item errors land in the report.
    pub fn run<P: AsRef<Path>>(
        &self,
        items: &[P],
        transform: &dyn Transform,
    ) -> Result<BatchReport> {
        self.prepare(items.len())?;
        let mut report = BatchReport::default();
        for item in items {
            let item = item.as_ref();
            report.record(item, self.mirror_item(item, transform));
        }
        self.finish(&report);
        Ok(report)
    }

    /// Mirror every item on its own thread.
    ///
    /// Plans that share ancestors race on them harmlessly since existing
    /// directories count as created. The report keeps input order.
    pub fn run_parallel<P: AsRef<Path> + Sync>(
        &self,
        items: &[P],
        transform: &dyn Transform,
    ) -> Result<BatchReport> {
        self.prepare(items.len())?;
        let results: Vec<Result<ItemOutcome>> = std::thread::scope(|scope| {
            let handles: Vec<_> = items
                .iter()
                .map(|item| scope.spawn(move || self.mirror_item(item, transform)))
                .collect();
            handles
                .into_iter()
                .map(|handle| {
                    handle
                        .join()
                        .unwrap_or_else(|_| Err(Error::invariant("mirror worker panicked")))
                })
                .collect()
        });

        let mut report = BatchReport::default();
        for (item, result) in items.iter().zip(results) {
            report.record(item.as_ref(), result);
        }
        self.finish(&report);
        Ok(report)
    }

    /// Clear the target dir and mirror the whole source dir into it.
    ///
    /// The source dir is mirrored as a single directory item, so anything
    /// left in the target by earlier runs is gone afterwards. Refuses to
    /// run without a source dir, or when the target dir contains it.
    pub fn rebuild(&self, transform: &dyn Transform) -> Result<BatchReport> {
        let source = self
            .env
            .source_dir()
            .ok_or_else(|| Error::configuration("source_dir is not set; nothing to rebuild"))?;
        let target = self.env.target_dir();
        if is_within(source, target) {
            return Err(Error::configuration(format!(
                "target dir '{target}' contains source dir '{source}'; refusing to clear it"
            )));
        }

        match std::fs::remove_dir_all(target.to_native()) {
            Ok(()) => tracing::info!(target = %target, "Cleared target dir"),
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => return Err(mirror_fs::Error::io(target.to_native(), e).into()),
        }

        self.run(std::slice::from_ref(source), transform)
    }

    /// Mirror a single file or directory item.
    pub fn mirror_item(
        &self,
        item: impl AsRef<Path>,
        transform: &dyn Transform,
    ) -> Result<ItemOutcome> {
        let mapping = self.env.remap(item)?;
        let source = &mapping.original_path;
        let metadata = std::fs::metadata(source.to_native())
            .map_err(|e| mirror_fs::Error::io(source.to_native(), e))?;
        let kind = if metadata.is_dir() {
            PathKind::Directory
        } else {
            PathKind::File
        };

        let plan = self.env.plan_directories(&mapping.target_path, kind)?;
        let directories_created = self.materializer.materialize(&plan.directories)?;

        let mut outcome = ItemOutcome {
            mapping: mapping.clone(),
            kind,
            directories_created,
            files_written: 0,
            warnings: plan.warnings,
        };

        match kind {
            PathKind::File => {
                apply_transform(transform, source, &mapping.target_path)?;
                outcome.files_written = 1;
            }
            PathKind::Directory => {
                self.mirror_dir(source, &mapping.target_path, transform, &mut outcome)?;
            }
        }

        tracing::info!(
            source = %mapping.original_path,
            target = %mapping.target_path,
            files = outcome.files_written,
            "Mirrored"
        );
        Ok(outcome)
    }

    fn prepare(&self, count: usize) -> Result<()> {
        if count == 0 {
            return Err(Error::configuration("no items given to mirror"));
        }
        let root = self.env.target_dir();
        self.materializer
            .create_dir_all(root)
            .map_err(|e| mirror_fs::Error::directory_creation(root.to_native(), e))?;
        Ok(())
    }

    fn finish(&self, report: &BatchReport) {
        tracing::info!(
            mirrored = report.mirrored.len(),
            failed = report.failures.len(),
            files = report.files_written(),
            "Mirror batch finished"
        );
    }

    /// Recursively mirror a directory's contents, in name order.
    ///
    /// Symlinks are never descended into. One that resolves to a file is
    /// transformed like a file; any other is skipped with a warning.
    fn mirror_dir(
        &self,
        source: &NormalizedPath,
        target: &NormalizedPath,
        transform: &dyn Transform,
        outcome: &mut ItemOutcome,
    ) -> Result<()> {
        let native = source.to_native();
        let mut entries = std::fs::read_dir(&native)
            .map_err(|e| mirror_fs::Error::io(&native, e))?
            .collect::<std::io::Result<Vec<_>>>()
            .map_err(|e| mirror_fs::Error::io(&native, e))?;
        entries.sort_by_key(|entry| entry.file_name());

        for entry in entries {
            let name = entry.file_name().to_string_lossy().into_owned();
            let child_source = source.join(&name);
            let child_target = target.join(&name);

            // A target tree nested in its own source must not be re-mirrored
            if child_source == *self.env.target_dir() {
                continue;
            }

            let file_type = entry
                .file_type()
                .map_err(|e| mirror_fs::Error::io(child_source.to_native(), e))?;
            if file_type.is_symlink() && !child_source.is_file() {
                let warning = Warning::SkippedSymlink {
                    path: child_source.clone(),
                };
                tracing::warn!("{warning}");
                outcome.warnings.push(warning);
            } else if file_type.is_dir() {
                let created = self
                    .materializer
                    .materialize(std::slice::from_ref(&child_target))?;
                outcome.directories_created += created;
                self.mirror_dir(&child_source, &child_target, transform, outcome)?;
            } else {
                apply_transform(transform, &child_source, &child_target)?;
                outcome.files_written += 1;
            }
        }
        Ok(())
    }
}
