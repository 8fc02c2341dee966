//! Error types for mirror-core

use std::path::PathBuf;

use mirror_fs::NormalizedPath;

/// Result type for mirror-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while remapping, planning, or mirroring
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Required path or depth configuration is missing or malformed
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Inputs could not be compared as paths under one root
    #[error("Internal invariant violated: {message}")]
    InternalInvariant { message: String },

    /// A transform failed to produce its target file
    #[error("Transform '{transform}' failed for {path}: {message}")]
    Transform {
        transform: String,
        path: PathBuf,
        message: String,
    },

    /// Filesystem error from mirror-fs, including directory creation
    #[error(transparent)]
    Fs(#[from] mirror_fs::Error),
}

impl Error {
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn invariant(message: impl Into<String>) -> Self {
        Self::InternalInvariant {
            message: message.into(),
        }
    }

    /// Whether this error came from creating a planned directory.
    pub fn is_directory_creation(&self) -> bool {
        matches!(self, Self::Fs(mirror_fs::Error::DirectoryCreation { .. }))
    }
}

/// Conditions worth reporting that do not stop processing
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Warning {
    /// The path does not reach below the target root, so no directories
    /// were planned for it
    #[error("Path {path} is not deeper than target root {target_root}; no directories planned")]
    ShallowPath {
        path: NormalizedPath,
        target_root: NormalizedPath,
    },

    /// A symlink inside a mirrored directory did not resolve to a file and
    /// was not followed
    #[error("Skipped symlink {path}; only links to files are mirrored")]
    SkippedSymlink { path: NormalizedPath },
}
