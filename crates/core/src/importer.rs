//! Importer seam: the external transform from raw file to derived artifact
//!
//! The real transform is host-specific and potentially slow or interactive.
//! The dispatcher only needs the surface defined here; [`CopyImporter`] is
//! the trivial implementation used by the CLI and the integration tests.

use crate::index::DerivedItem;
use anyhow::{Context, Result};
use std::path::Path;
use tracing::debug;

/// External transform invoked by the dispatcher
pub trait Importer: Send + Sync {
    /// Import a raw file, producing an artifact inside `destination_folder`
    ///
    /// `overwrite` is true when an artifact already exists at the target
    /// path; such imports must be silent (no interactive configuration).
    fn import(&self, raw_path: &Path, destination_folder: &Path, overwrite: bool) -> Result<()>;

    /// Re-run the transform for an already-indexed item
    fn reimport(&self, item: &DerivedItem) -> Result<()> {
        let folder = item
            .derived_path
            .parent()
            .unwrap_or_else(|| Path::new(""));
        self.import(&item.source_path, folder, true)
    }

    /// Signal the host UI that a fresh import may need user attention
    ///
    /// Invoked before first-time (non-overwrite) imports only. Headless
    /// importers ignore it.
    fn bring_to_front(&self) {}
}

/// Importer that copies the raw file byte-for-byte
///
/// The artifact keeps the raw file's stem and takes the derived extension.
pub struct CopyImporter {
    derived_extension: String,
}

impl CopyImporter {
    pub fn new(derived_extension: &str) -> Self {
        Self {
            derived_extension: derived_extension.trim_start_matches('.').to_string(),
        }
    }
}

impl Importer for CopyImporter {
    fn import(&self, raw_path: &Path, destination_folder: &Path, overwrite: bool) -> Result<()> {
        let stem = raw_path
            .file_stem()
            .with_context(|| format!("Raw path {} has no file name", raw_path.display()))?;
        let mut target = destination_folder.join(stem);
        target.set_extension(&self.derived_extension);

        debug!(
            "Importing {} -> {} (overwrite: {overwrite})",
            raw_path.display(),
            target.display()
        );
        std::fs::copy(raw_path, &target).with_context(|| {
            format!(
                "Failed to import {} to {}",
                raw_path.display(),
                target.display()
            )
        })?;
        Ok(())
    }
}
