//! Typed errors for configuration and path mapping

use std::path::PathBuf;
use thiserror::Error;

/// Errors produced by the core types
///
/// Construction-time configuration problems are fatal and surface here;
/// transient filesystem failures stay `anyhow` at the call sites.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The derived root must live inside the content root so that the index
    /// can see every artifact we write.
    #[error("derived root {} is not inside the content root {}", derived.display(), content.display())]
    DerivedRootOutsideContent { derived: PathBuf, content: PathBuf },

    /// A path handed to the mapper did not come from the raw tree.
    ///
    /// Mapping it anyway could write outside the derived root, so this is a
    /// hard error rather than a best-effort guess.
    #[error("path {} is not inside the raw root {}", path.display(), raw_root.display())]
    OutsideRawRoot { path: PathBuf, raw_root: PathBuf },

    /// The raw root and derived root overlap; watching one while writing the
    /// other would feed the pipeline its own output.
    #[error("raw root {} and derived root {} overlap", raw.display(), derived.display())]
    OverlappingRoots { raw: PathBuf, derived: PathBuf },
}
