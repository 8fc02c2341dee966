//! Path-remapping engine for tree-mirror
//!
//! Mirrors items from a project tree into a target tree that may sit at a
//! different depth:
//!
//! - [`shared`] finds the segment-wise shared prefix of absolute paths
//! - [`remap`] re-roots an item under the target root, keeping its depth
//! - [`plan`] lists the directories to create, outermost first
//! - [`mirror`] runs the whole pipeline over a batch of items
//!
//! Everything except [`mirror`] and [`project`] is pure and free to call
//! from any thread.

pub mod config;
pub mod error;
pub mod logging;
pub mod mirror;
pub mod plan;
pub mod project;
pub mod remap;
pub mod shared;

pub use config::{MirrorConfig, MirrorEnv};
pub use error::{Error, Result, Warning};
pub use mirror::{
    BatchReport, CopyTransform, ExtensionTransform, ItemFailure, ItemOutcome, Mirror, Transform,
};
pub use plan::{
    DirectoryPlan, PathKind, path_already_in_list, plan_batch, plan_directories,
    plan_directories_on_disk,
};
pub use project::find_project_root;
pub use remap::{RemapRequest, RemapResult, TRIM_THRESHOLD_OFFSET, remap};
pub use shared::{
    PathRemainder, SharedRoot, find_shared_path, find_shared_path_all, remove_shared_root_path,
};
