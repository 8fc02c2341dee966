//! Directory materialization and atomic file writes

use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::{Error, NormalizedPath, Result};

/// Durability settings for [`write_atomic`].
#[derive(Debug, Clone, Copy)]
pub struct RobustnessConfig {
    /// Flush file contents to disk before the rename.
    pub enable_fsync: bool,
}

impl Default for RobustnessConfig {
    fn default() -> Self {
        Self { enable_fsync: true }
    }
}

/// Creates planned directories on the filesystem.
///
/// Implementations must treat an existing directory as success so that a
/// plan can be replayed, or raced by another plan sharing its ancestors.
pub trait DirectoryMaterializer: Send + Sync {
    /// Create a single directory whose parent already exists.
    fn create_dir(&self, path: &NormalizedPath) -> std::io::Result<()>;

    /// Create `path` and any missing ancestors.
    fn create_dir_all(&self, path: &NormalizedPath) -> std::io::Result<()>;

    /// Create every directory of a plan in order, stopping at the first
    /// failure that is not "already exists".
    ///
    /// Returns how many directories were newly created. Directories created
    /// before a failure are left in place.
    fn materialize(&self, plan: &[NormalizedPath]) -> Result<usize> {
        let mut created = 0;
        for dir in plan {
            match self.create_dir(dir) {
                Ok(()) => {
                    tracing::trace!(dir = %dir, "Created directory");
                    created += 1;
                }
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                    tracing::trace!(dir = %dir, "Directory already exists");
                }
                Err(e) => {
                    tracing::error!(dir = %dir, error = %e, "Directory creation failed");
                    return Err(Error::directory_creation(dir.to_native(), e));
                }
            }
        }
        Ok(created)
    }
}

/// Materializer backed by `std::fs`.
#[derive(Debug, Default, Clone, Copy)]
pub struct FsMaterializer;

impl DirectoryMaterializer for FsMaterializer {
    fn create_dir(&self, path: &NormalizedPath) -> std::io::Result<()> {
        fs::create_dir(path.to_native())
    }

    fn create_dir_all(&self, path: &NormalizedPath) -> std::io::Result<()> {
        fs::create_dir_all(path.to_native())
    }
}

/// Create each directory of an outermost-first plan, one at a time.
pub fn build_dirs(dirs: &[NormalizedPath]) -> Result<usize> {
    FsMaterializer.materialize(dirs)
}

/// Create each directory together with its ancestors.
///
/// For lists whose order does not guarantee parents come first.
pub fn build_dirs_all(dirs: &[NormalizedPath]) -> Result<()> {
    for dir in dirs {
        FsMaterializer
            .create_dir_all(dir)
            .map_err(|e| Error::directory_creation(dir.to_native(), e))?;
    }
    Ok(())
}

static TEMP_COUNTER: AtomicUsize = AtomicUsize::new(0);

/// Write content atomically to a file.
///
/// Uses write-to-temp-then-rename so a reader never observes a partial
/// file. The parent directory must already exist; mirrored targets get
/// their directories from a plan, not from here.
pub fn write_atomic(path: &NormalizedPath, content: &[u8], config: RobustnessConfig) -> Result<()> {
    let native_path = path.to_native();

    // Same directory keeps the rename on one filesystem
    let temp_name = format!(
        ".{}.{}.{}.tmp",
        path.file_name().unwrap_or_default(),
        std::process::id(),
        TEMP_COUNTER.fetch_add(1, Ordering::Relaxed)
    );
    let temp_path = native_path.with_file_name(&temp_name);

    let mut temp_file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(&temp_path)
        .map_err(|e| Error::io(&temp_path, e))?;

    let written = temp_file.write_all(content).and_then(|()| {
        if config.enable_fsync {
            temp_file.sync_all()
        } else {
            Ok(())
        }
    });
    drop(temp_file);

    if let Err(e) = written {
        let _ = fs::remove_file(&temp_path);
        return Err(Error::io(&temp_path, e));
    }

    fs::rename(&temp_path, &native_path).map_err(|e| {
        let _ = fs::remove_file(&temp_path);
        Error::io(&native_path, e)
    })
}

/// Read raw bytes from a file.
pub fn read_bytes(path: &NormalizedPath) -> Result<Vec<u8>> {
    let native_path = path.to_native();
    fs::read(&native_path).map_err(|e| Error::io(&native_path, e))
}

/// Read text content from a file.
pub fn read_text(path: &NormalizedPath) -> Result<String> {
    let native_path = path.to_native();
    fs::read_to_string(&native_path).map_err(|e| Error::io(&native_path, e))
}

/// Write text content to a file atomically.
pub fn write_text(path: &NormalizedPath, content: &str) -> Result<()> {
    write_atomic(path, content.as_bytes(), RobustnessConfig::default())
}

/// Copy `source` to `target` through [`write_atomic`].
pub fn copy_file(
    source: &NormalizedPath,
    target: &NormalizedPath,
    config: RobustnessConfig,
) -> Result<u64> {
    let bytes = read_bytes(source)?;
    write_atomic(target, &bytes, config)?;
    Ok(bytes.len() as u64)
}
