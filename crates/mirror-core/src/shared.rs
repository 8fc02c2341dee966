//! Shared-prefix computation over absolute paths
//!
//! Paths are compared segment by segment, so `/abc` and `/abd` share `/`,
//! never `/ab`.

use mirror_fs::NormalizedPath;

use crate::{Error, Result};

/// One input path split at the shared prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathRemainder {
    pub original_path: NormalizedPath,
    /// Segments of `original_path` after the shared prefix. Never shorter
    /// than the path's own final segment.
    pub remainder: Vec<String>,
}

impl PathRemainder {
    /// The remainder as a relative, slash-joined path.
    pub fn relative(&self) -> String {
        self.remainder.join("/")
    }
}

/// The common prefix of a set of paths plus each path's remainder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SharedRoot {
    pub shared: NormalizedPath,
    pub remainders: Vec<PathRemainder>,
}

/// Longest common segment prefix of two absolute paths.
///
/// Zero shared segments yields the bare root.
pub fn find_shared_path(a: &NormalizedPath, b: &NormalizedPath) -> Result<NormalizedPath> {
    ensure_comparable(a, b)?;
    let left = a.segments();
    let right = b.segments();
    let count = shared_run(&left, &right);
    let shared = NormalizedPath::from_segments(a.root(), &left[..count]);
    tracing::trace!(a = %a, b = %b, shared = %shared, "Shared path");
    Ok(shared)
}

/// Fold [`find_shared_path`] over any number of paths.
pub fn find_shared_path_all(paths: &[NormalizedPath]) -> Result<NormalizedPath> {
    Ok(remove_shared_root_path(paths)?.shared)
}

/// Compute the shared prefix of `paths` and split every path at it.
///
/// The running prefix starts as the first path and only ever shrinks as
/// each further path is folded in. A path that is itself the shared prefix
/// keeps its leaf as remainder, so a single input is its own shared prefix
/// with its file name as remainder.
pub fn remove_shared_root_path(paths: &[NormalizedPath]) -> Result<SharedRoot> {
    let Some((first, rest)) = paths.split_first() else {
        return Err(Error::invariant("shared prefix requires at least one path"));
    };
    require_absolute(first)?;

    let mut running = first.segments();
    for path in rest {
        ensure_comparable(first, path)?;
        let count = shared_run(&running, &path.segments());
        running.truncate(count);
    }

    let shared = NormalizedPath::from_segments(first.root(), &running);
    tracing::debug!(shared = %shared, inputs = paths.len(), "Computed shared root");

    let remainders = paths
        .iter()
        .map(|path| {
            let segments = path.segments();
            let start = running.len().min(segments.len().saturating_sub(1));
            PathRemainder {
                original_path: path.clone(),
                remainder: segments[start..].iter().map(|s| s.to_string()).collect(),
            }
        })
        .collect();

    Ok(SharedRoot { shared, remainders })
}

/// Segments of `p1` that differ, position by position, from `p2`.
///
/// Positions past the end of `p1` contribute nothing.
pub fn segment_difference(p1: &NormalizedPath, p2: &NormalizedPath) -> Result<String> {
    if !p1.is_absolute() || !p2.is_absolute() {
        return Err(Error::configuration(format!(
            "segment difference needs absolute paths, got {p1} and {p2}"
        )));
    }
    let left = p1.segments();
    let right = p2.segments();
    let differing: Vec<&str> = left
        .iter()
        .enumerate()
        .filter(|(i, seg)| right.get(*i) != Some(*seg))
        .map(|(_, seg)| *seg)
        .collect();
    Ok(differing.join("/"))
}

/// Number of equal leading segments.
///
/// Callers check both inputs with [`ensure_comparable`] first; that is the
/// only invariant this walk relies on.
fn shared_run(a: &[&str], b: &[&str]) -> usize {
    a.iter().zip(b).take_while(|(x, y)| x == y).count()
}

fn require_absolute(path: &NormalizedPath) -> Result<()> {
    if path.is_absolute() {
        Ok(())
    } else {
        Err(Error::invariant(format!(
            "cannot compare relative path {path}; resolve it first"
        )))
    }
}

/// Both paths must be absolute and hang off the same root.
fn ensure_comparable(a: &NormalizedPath, b: &NormalizedPath) -> Result<()> {
    require_absolute(a)?;
    require_absolute(b)?;
    if a.root() != b.root() {
        return Err(Error::invariant(format!(
            "paths {a} and {b} live under different roots"
        )));
    }
    Ok(())
}
