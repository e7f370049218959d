//! Raw-tree to derived-tree path transform
//!
//! Every raw asset maps to exactly one derived artifact: the raw root prefix
//! is swapped for the derived root and the extension is replaced with the
//! derived-artifact extension. Because the original extension is discarded,
//! the transform is not reversible from the derived path alone; the content
//! index persists the originating raw path for that.

use crate::error::CoreError;
use std::path::{Component, Path, PathBuf};

/// Maps raw-tree paths to derived-tree paths
#[derive(Debug, Clone)]
pub struct PathMapper {
    raw_root: PathBuf,
    derived_root: PathBuf,
    derived_extension: String,
}

impl PathMapper {
    /// Create a mapper between the two roots
    ///
    /// Both roots are normalized lexically up front so later prefix checks
    /// are bit-exact regardless of how the caller spelled them.
    pub fn new(raw_root: &Path, derived_root: &Path, derived_extension: &str) -> Self {
        Self {
            raw_root: normalize(raw_root),
            derived_root: normalize(derived_root),
            derived_extension: derived_extension.trim_start_matches('.').to_string(),
        }
    }

    /// Compute the derived-tree path for a raw-tree path
    ///
    /// Fails if `raw_path` does not lie under the raw root. Callers must only
    /// pass paths sourced from watching or walking the raw root.
    pub fn to_derived(&self, raw_path: &Path) -> Result<PathBuf, CoreError> {
        let raw_path = normalize(raw_path);

        let relative = raw_path
            .strip_prefix(&self.raw_root)
            .map_err(|_| CoreError::OutsideRawRoot {
                path: raw_path.clone(),
                raw_root: self.raw_root.clone(),
            })?;

        let mut derived = self.derived_root.join(relative);
        derived.set_extension(&self.derived_extension);
        Ok(derived)
    }

    /// The configured raw root (normalized)
    pub fn raw_root(&self) -> &Path {
        &self.raw_root
    }

    /// The configured derived root (normalized)
    pub fn derived_root(&self) -> &Path {
        &self.derived_root
    }
}

/// Normalize a path lexically: resolve `.` and `..` components and collapse
/// separators, without touching the filesystem
///
/// Symlinks are deliberately not resolved; the watcher reports paths in the
/// same spelling it was configured with, and both sides of every comparison
/// go through this function.
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push(Component::ParentDir);
                }
            }
            other => out.push(other),
        }
    }
    out
}
