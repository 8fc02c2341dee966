//! Normalized path handling for cross-platform compatibility

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// A path normalized to use forward slashes internally.
///
/// Construction cleans the path: backslashes become forward slashes, empty
/// and `.` components are dropped, `..` pops the previous component (never
/// climbing above the root), and trailing separators are removed. The
/// result is the canonical textual form the mirroring engine compares.
///
/// Three root styles are recognized:
/// - `/` for Unix absolute paths
/// - `//` for network (UNC) paths
/// - `X:/` for drive-letter paths
///
/// Anything else is relative and has an empty root.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct NormalizedPath {
    /// Internal representation always uses forward slashes
    inner: String,
}

impl NormalizedPath {
    /// Create a new NormalizedPath from any path-like input.
    pub fn new(path: impl AsRef<Path>) -> Self {
        let path_str = path.as_ref().to_string_lossy();
        Self {
            inner: clean(&path_str.replace('\\', "/")),
        }
    }

    /// Build a path from a root (`"/"`, `"//"`, `"X:/"` or `""`) and segments.
    pub fn from_segments<S: AsRef<str>>(root: &str, segments: &[S]) -> Self {
        let joined = segments
            .iter()
            .map(|s| s.as_ref())
            .collect::<Vec<_>>()
            .join("/");
        if root.is_empty() {
            Self::new(format!("./{joined}"))
        } else {
            Self::new(format!("{root}{joined}"))
        }
    }

    /// Resolve `path` against `base` unless it is already absolute.
    ///
    /// The raw input is joined before cleaning so that leading `..`
    /// components of a relative path climb out of `base`.
    pub fn resolve(base: &NormalizedPath, path: impl AsRef<Path>) -> Self {
        let raw = path.as_ref().to_string_lossy().replace('\\', "/");
        let (root, _) = split_root(&raw);
        if !root.is_empty() || base.inner.is_empty() {
            Self::new(raw)
        } else {
            Self::new(format!("{}/{}", base.inner, raw))
        }
    }

    /// Canonicalize an on-disk path, stripping Windows verbatim prefixes.
    pub fn canonicalize(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        dunce::canonicalize(path)
            .map(Self::new)
            .map_err(|e| Error::io(path, e))
    }

    /// Get the internal normalized string representation.
    pub fn as_str(&self) -> &str {
        &self.inner
    }

    /// Convert to a platform-native PathBuf for I/O operations.
    pub fn to_native(&self) -> PathBuf {
        PathBuf::from(&self.inner)
    }

    /// The root prefix: `"/"`, `"//"`, `"X:/"`, or `""` for relative paths.
    pub fn root(&self) -> &str {
        split_root(&self.inner).0
    }

    /// Whether this path carries a root.
    pub fn is_absolute(&self) -> bool {
        !self.root().is_empty()
    }

    /// Return `self` if absolute, otherwise a `NotAbsolute` error.
    pub fn require_absolute(&self) -> Result<&Self> {
        if self.is_absolute() {
            Ok(self)
        } else {
            Err(Error::NotAbsolute {
                path: self.to_native(),
            })
        }
    }

    /// The non-empty components after the root.
    pub fn segments(&self) -> Vec<&str> {
        split_root(&self.inner)
            .1
            .split('/')
            .filter(|s| !s.is_empty() && *s != ".")
            .collect()
    }

    pub fn segment_count(&self) -> usize {
        self.segments().len()
    }

    /// Join this path with a segment.
    pub fn join(&self, segment: &str) -> Self {
        if self.inner.is_empty() {
            return Self::new(segment);
        }
        let segment_normalized = segment.replace('\\', "/");
        if !segment_normalized.contains("..") && clean(&segment_normalized).is_empty() {
            return self.clone();
        }
        let joined = if self.inner.ends_with('/') {
            format!("{}{}", self.inner, segment_normalized)
        } else {
            format!("{}/{}", self.inner, segment_normalized)
        };
        Self::new(joined)
    }

    /// Join every segment in order.
    pub fn join_segments<S: AsRef<str>>(&self, segments: &[S]) -> Self {
        if segments.is_empty() {
            return self.clone();
        }
        let tail = segments
            .iter()
            .map(|s| s.as_ref())
            .collect::<Vec<_>>()
            .join("/");
        self.join(&tail)
    }

    /// Get the parent directory.
    ///
    /// The root is its own boundary: `/` and single-segment relative paths
    /// have no parent.
    pub fn parent(&self) -> Option<Self> {
        let segments = self.segments();
        match segments.split_last() {
            Some((_, rest)) if !rest.is_empty() || self.is_absolute() => {
                Some(Self::from_segments(self.root(), rest))
            }
            _ => None,
        }
    }

    /// Get the file name component.
    pub fn file_name(&self) -> Option<&str> {
        self.segments().last().copied()
    }

    /// Check if this path exists on the filesystem.
    pub fn exists(&self) -> bool {
        self.to_native().exists()
    }

    /// Check if this is a directory.
    pub fn is_dir(&self) -> bool {
        self.to_native().is_dir()
    }

    /// Check if this is a file.
    pub fn is_file(&self) -> bool {
        self.to_native().is_file()
    }

    /// Check if this appears to be a network path.
    pub fn is_network_path(&self) -> bool {
        self.root() == "//"
    }

    /// Get the extension if present.
    pub fn extension(&self) -> Option<&str> {
        self.file_name().and_then(|name| {
            let idx = name.rfind('.')?;
            if idx == 0 {
                None
            } else {
                Some(&name[idx + 1..])
            }
        })
    }
}

/// Split a forward-slash path into its root prefix and the remainder.
fn split_root(s: &str) -> (&str, &str) {
    if s.starts_with("//") && !s.starts_with("///") {
        return ("//", &s[2..]);
    }
    if let Some(rest) = s.strip_prefix('/') {
        return ("/", rest);
    }
    let bytes = s.as_bytes();
    if bytes.len() >= 3 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':' && bytes[2] == b'/' {
        return (&s[..3], &s[3..]);
    }
    ("", s)
}

fn clean(raw: &str) -> String {
    let (root, rest) = split_root(raw);
    let mut parts: Vec<&str> = Vec::new();
    for part in rest.split('/') {
        match part {
            "" | "." => {}
            ".." => {
                parts.pop();
            }
            other => parts.push(other),
        }
    }
    // A relative path must not start with something `split_root` reads as
    // a drive
    if root.is_empty() && parts.first().is_some_and(|first| is_drive_label(first)) {
        return format!("./{}", parts.join("/"));
    }
    format!("{root}{}", parts.join("/"))
}

fn is_drive_label(part: &str) -> bool {
    let bytes = part.as_bytes();
    bytes.len() == 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':'
}

impl AsRef<Path> for NormalizedPath {
    fn as_ref(&self) -> &Path {
        Path::new(&self.inner)
    }
}

impl std::fmt::Display for NormalizedPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.inner)
    }
}

impl From<&str> for NormalizedPath {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for NormalizedPath {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<PathBuf> for NormalizedPath {
    fn from(p: PathBuf) -> Self {
        Self::new(p)
    }
}

impl From<&Path> for NormalizedPath {
    fn from(p: &Path) -> Self {
        Self::new(p)
    }
}

impl From<NormalizedPath> for String {
    fn from(p: NormalizedPath) -> Self {
        p.inner
    }
}
