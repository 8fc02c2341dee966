//! Reference scenarios run across both crates
//!
//! Each scenario is computed with the pure engine and then replayed on a
//! real filesystem.

use mirror_core::{
    PathKind, RemapRequest, path_already_in_list, plan_batch, plan_directories, remap,
};
use mirror_fs::{NormalizedPath, io};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

fn p(s: &str) -> NormalizedPath {
    NormalizedPath::new(s)
}

/// Re-anchor an absolute `/x/y` path under a temp dir.
fn under(temp: &TempDir, path: &NormalizedPath) -> NormalizedPath {
    NormalizedPath::new(temp.path()).join_segments(&path.segments())
}

// =============================================================================
// Remapping
// =============================================================================

#[test]
fn test_scenario_remap_into_sibling_out_dir() {
    let result = remap(&RemapRequest {
        item: "/proj/src/a/b.js".into(),
        project_root: p("/proj"),
        target_root: p("/proj/out"),
        target_root_depth: 2,
    })
    .unwrap();

    assert_eq!(result.original_path, p("/proj/src/a/b.js"));
    assert_eq!(result.target_path, p("/proj/out/a/b.js"));
    assert_eq!(result.target_path.segment_count(), 4);
}

// =============================================================================
// Directory plans
// =============================================================================

#[test]
fn test_scenario_plan_for_nested_file() {
    let plan = plan_directories(&p("/out"), &p("/out/a/b/c/file.txt"), PathKind::File).unwrap();
    assert_eq!(plan.directories, vec![p("/out/a"), p("/out/a/b"), p("/out/a/b/c")]);
}

#[test]
fn test_scenario_containment_check() {
    assert!(path_already_in_list(&[p("/a/b/c"), p("/a/b")], &p("/a/b"), 1));
}

#[test]
fn test_scenario_shallow_path_warns_without_failing() {
    let plan = plan_directories(&p("/out/deep/root"), &p("/out/x.txt"), PathKind::File).unwrap();
    assert!(plan.is_empty());
    assert_eq!(plan.warnings.len(), 1);
}

// =============================================================================
// Replaying plans on disk
// =============================================================================

#[test]
fn test_plan_replays_in_order_with_single_level_creation() {
    let temp = TempDir::new().unwrap();
    let target_root = under(&temp, &p("/out"));
    std::fs::create_dir(target_root.to_native()).unwrap();
    let file = target_root.join_segments(&["a", "b", "c", "file.txt"]);

    let plan = plan_directories(&target_root, &file, PathKind::File).unwrap();
    // build_dirs never creates ancestors, so out-of-order plans would fail
    assert_eq!(io::build_dirs(&plan.directories).unwrap(), 3);
    io::write_text(&file, "payload").unwrap();

    assert_eq!(io::read_text(&file).unwrap(), "payload");
}

#[test]
fn test_batch_plan_replays_once_per_directory() {
    let temp = TempDir::new().unwrap();
    let target_root = NormalizedPath::new(temp.path());
    let entries: Vec<(NormalizedPath, PathKind)> = ["a/b/one.js", "a/b/two.js", "a/c/three.js", "d"]
        .iter()
        .map(|rel| {
            let kind = if rel.contains('.') { PathKind::File } else { PathKind::Directory };
            (target_root.join(rel), kind)
        })
        .collect();

    let batch = plan_batch(&target_root, &entries).unwrap();
    let created = io::build_dirs(&batch.directories).unwrap();

    assert_eq!(created, batch.len());
    assert_eq!(created, 4);
    for dir in ["a", "a/b", "a/c", "d"] {
        assert!(target_root.join(dir).is_dir(), "{dir} missing");
    }
}

#[test]
fn test_concurrent_mirrors_share_ancestors() {
    let temp = TempDir::new().unwrap();
    let project = NormalizedPath::canonicalize(temp.path()).unwrap();
    let target_root = project.join("out");
    std::fs::create_dir(target_root.to_native()).unwrap();
    let depth = target_root.segment_count();

    std::thread::scope(|scope| {
        for i in 0..8 {
            let project = &project;
            let target_root = &target_root;
            scope.spawn(move || {
                let name = format!("f{i}.js");
                let item = project.join_segments(&["src", "shared", "deeper", name.as_str()]);
                let mapped = remap(&RemapRequest {
                    item: item.to_native(),
                    project_root: project.clone(),
                    target_root: target_root.clone(),
                    target_root_depth: depth,
                })
                .unwrap();
                let plan =
                    plan_directories(target_root, &mapped.target_path, PathKind::File).unwrap();
                io::build_dirs(&plan.directories).unwrap();
                io::write_text(&mapped.target_path, "x").unwrap();
            });
        }
    });

    for i in 0..8 {
        assert!(target_root.join(&format!("shared/deeper/f{i}.js")).is_file());
    }
}
