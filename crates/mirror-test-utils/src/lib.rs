//! Project-tree fixtures for mirroring tests.
//!
//! Every fixture lives in its own temporary directory, canonicalized so
//! that paths compare equal to what the engine computes on platforms where
//! the temp dir sits behind a symlink.

use std::fs;

use mirror_fs::NormalizedPath;
use tempfile::TempDir;

/// A small test tree: a source dir with a file at its top, a fixture
/// file, and a deeply nested spec.
pub const SAMPLE_TEST_TREE: &[(&str, &str)] = &[
    ("test/test-src/example.js", "module.exports = 1;\n"),
    ("test/test-src/fixtures/data.json", "{\"ok\": true}\n"),
    ("test/test-src/deep/a/b/spec.js", "describe('deep', () => {});\n"),
];

/// A temporary project root marked with a `package.json`.
pub struct ProjectFixture {
    /// Held so the directory lives as long as the fixture
    _dir: TempDir,
    root: NormalizedPath,
}

impl ProjectFixture {
    /// Create an empty project.
    ///
    /// # Panics
    /// Panics if the temp dir cannot be created or canonicalized.
    pub fn new() -> Self {
        let dir = tempfile::tempdir()
            .unwrap_or_else(|e| panic!("ProjectFixture: tempdir failed: {e}"));
        let root = NormalizedPath::canonicalize(dir.path())
            .unwrap_or_else(|e| panic!("ProjectFixture: canonicalize failed: {e}"));
        let fixture = Self { _dir: dir, root };
        fixture.write("package.json", "{}\n");
        fixture
    }

    /// Create a project holding `files` (relative path, content).
    pub fn with_files(files: &[(&str, &str)]) -> Self {
        let fixture = Self::new();
        for (rel, content) in files {
            fixture.write(rel, content);
        }
        fixture
    }

    /// The canonical project root.
    pub fn root(&self) -> &NormalizedPath {
        &self.root
    }

    /// Absolute path of `rel` inside the project.
    pub fn path(&self, rel: &str) -> NormalizedPath {
        self.root.join(rel)
    }

    /// Write a file, creating its parent directories.
    ///
    /// # Panics
    /// Panics if any filesystem operation fails.
    pub fn write(&self, rel: &str, content: &str) -> NormalizedPath {
        let path = self.path(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent.to_native())
                .unwrap_or_else(|e| panic!("ProjectFixture: create {parent} failed: {e}"));
        }
        fs::write(path.to_native(), content)
            .unwrap_or_else(|e| panic!("ProjectFixture: write {path} failed: {e}"));
        path
    }

    /// Read a file back as text.
    ///
    /// # Panics
    /// Panics if the file cannot be read.
    pub fn read(&self, rel: &str) -> String {
        let path = self.path(rel);
        fs::read_to_string(path.to_native())
            .unwrap_or_else(|e| panic!("ProjectFixture: read {path} failed: {e}"))
    }
}

impl Default for ProjectFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// A project holding [`SAMPLE_TEST_TREE`].
pub fn sample_project() -> ProjectFixture {
    ProjectFixture::with_files(SAMPLE_TEST_TREE)
}
