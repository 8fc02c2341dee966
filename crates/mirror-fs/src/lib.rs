//! Filesystem layer for tree-mirror
//!
//! Provides the normalized path value the mirroring engine computes with,
//! directory materialization, atomic writes, and config file loading.

pub mod config;
pub mod error;
pub mod io;
pub mod path;

pub use config::{ConfigFormat, ConfigStore};
pub use error::{Error, Result};
pub use io::{DirectoryMaterializer, FsMaterializer, RobustnessConfig};
pub use path::NormalizedPath;
