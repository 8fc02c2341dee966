//! End-to-end test for the mirroring pipeline
//!
//! Exercises the complete flow: project discovery -> config file -> env
//! validation -> batch mirror -> target tree on disk.

use assert_fs::prelude::*;
use mirror_core::{CopyTransform, Mirror, MirrorConfig, find_project_root, logging};
use mirror_fs::{ConfigStore, NormalizedPath};
use mirror_test_utils::sample_project;
use predicates::prelude::*;
use pretty_assertions::assert_eq;

/// Write a TOML config into the project and load it back, discovering the
/// project root from a nested directory the way a CLI would.
fn load_env(project: &mirror_test_utils::ProjectFixture, extra: &str) -> mirror_core::MirrorEnv {
    let root = find_project_root(project.path("test/test-src/deep/a"))
        .unwrap()
        .expect("package.json marks the root");
    assert_eq!(&root, project.root());

    let config_path = project.write(
        "mirror.toml",
        &format!(
            "project_root = {root:?}\n\
             source_dir = \"test/test-src\"\n\
             target_dir = \"test/test-target\"\n{extra}",
            root = root.as_str()
        ),
    );
    MirrorConfig::load(&config_path).unwrap().validate().unwrap()
}

#[test]
fn test_full_mirror_of_sample_project() {
    let _ = logging::init(false);
    let project = sample_project();
    let env = load_env(&project, "");

    let report = Mirror::new(&env)
        .run(&["test/test-src"], &CopyTransform::default())
        .unwrap();

    assert!(report.is_success(), "failures: {:?}", report.failures);
    assert_eq!(report.files_written(), 3);

    let target = assert_fs::fixture::ChildPath::new(project.path("test/test-target").to_native());
    target.child("example.js").assert("module.exports = 1;\n");
    target.child("fixtures/data.json").assert(predicate::str::contains("\"ok\""));
    target.child("deep/a/b/spec.js").assert(predicate::path::is_file());

    // Sources are left alone
    assert_eq!(project.read("test/test-src/example.js"), "module.exports = 1;\n");
}

#[test]
fn test_item_by_item_matches_directory_run() {
    let project = sample_project();
    let env = load_env(&project, "");
    let items = [
        "test/test-src/example.js",
        "test/test-src/fixtures/data.json",
        "test/test-src/deep/a/b/spec.js",
    ];

    let report = Mirror::new(&env).run(&items, &CopyTransform::default()).unwrap();

    let targets: Vec<String> = report
        .mirrored
        .iter()
        .map(|o| o.mapping.target_path.as_str().to_string())
        .collect();
    let base = project.path("test/test-target");
    assert_eq!(
        targets,
        vec![
            base.join("example.js").as_str().to_string(),
            base.join("fixtures/data.json").as_str().to_string(),
            base.join("deep/a/b/spec.js").as_str().to_string(),
        ]
    );
    for outcome in &report.mirrored {
        assert_eq!(
            outcome.mapping.target_path.segment_count(),
            outcome.mapping.original_path.segment_count()
        );
    }
}

#[test]
fn test_report_mappings_serialize_for_tooling() {
    let project = sample_project();
    let env = load_env(&project, "debug = true\n");
    assert!(env.debug());

    let report = Mirror::new(&env)
        .run(&["test/test-src/example.js"], &CopyTransform::default())
        .unwrap();

    let json = serde_json::to_value(&report.mirrored[0].mapping).unwrap();
    assert_eq!(
        json["target_path"],
        serde_json::Value::String(project.path("test/test-target/example.js").as_str().to_string())
    );
}

#[test]
fn test_config_round_trips_through_store() {
    let temp = assert_fs::TempDir::new().unwrap();
    let path = NormalizedPath::new(temp.child("mirror.yaml").path());
    let config = MirrorConfig {
        project_root: Some("/srv/app".into()),
        source_dir: Some("spec".into()),
        target_root_depth: Some(3),
        ..Default::default()
    };

    ConfigStore::new().save(&path, &config).unwrap();
    let loaded = MirrorConfig::load(&path).unwrap();

    assert_eq!(loaded, config);
    assert_eq!(loaded.validate().unwrap().target_dir().as_str(), "/srv/app/spec-target");
}

#[test]
fn test_rebuild_replaces_previous_mirror() {
    let project = sample_project();
    let env = load_env(&project, "");
    let mirror = Mirror::new(&env);

    mirror.run(&["test/test-src/example.js"], &CopyTransform::default()).unwrap();
    std::fs::remove_file(project.path("test/test-src/example.js").to_native()).unwrap();

    let report = mirror.rebuild(&CopyTransform::default()).unwrap();

    assert!(report.is_success());
    assert_eq!(report.files_written(), 2);
    assert!(!project.path("test/test-target/example.js").exists());
    assert!(project.path("test/test-target/fixtures/data.json").is_file());
}
