//! Per-change policy: turn one (path, kind) into import/delete actions
//!
//! Entry points are invoked with single paths from a flushed buffer batch or
//! directly by the reconciler. Collaborator failures are logged and never
//! retried here; the next change or reconciliation gets another chance.

use assetsync_core::{ContentIndex, DerivedItem, Importer, PathMapper};
use assetsync_watcher::ChangeSink;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, error, info};

/// Applies create/update/delete policy for one raw-tree path at a time
pub struct ChangeDispatcher {
    mapper: PathMapper,
    index: Arc<dyn ContentIndex>,
    importer: Arc<dyn Importer>,
}

impl ChangeDispatcher {
    pub fn new(
        mapper: PathMapper,
        index: Arc<dyn ContentIndex>,
        importer: Arc<dyn Importer>,
    ) -> Self {
        Self {
            mapper,
            index,
            importer,
        }
    }

    /// A raw path appeared
    ///
    /// Whether this is a fresh import or a silent overwrite is decided by
    /// the existence of the derived file, not by the event kind.
    pub fn on_created(&self, raw_path: &Path) {
        let derived = match self.mapper.to_derived(raw_path) {
            Ok(derived) => derived,
            Err(e) => {
                error!("Refusing to dispatch {}: {e}", raw_path.display());
                return;
            }
        };

        if let Err(e) = self.import_to(raw_path, &derived) {
            error!("Import of {} failed: {e:#}", raw_path.display());
        }
    }

    /// A raw path changed
    ///
    /// Directory metadata churn is not a content change and is ignored.
    /// (`on_created` deliberately applies no such filter; a directory create
    /// event reaches the importer unfiltered, as the observed behavior.)
    pub fn on_changed(&self, raw_path: &Path) {
        if raw_path.is_dir() {
            debug!("Ignoring change event for directory {}", raw_path.display());
            return;
        }
        self.on_created(raw_path);
    }

    /// A raw path disappeared; drop its derived artifact if the index has one
    pub fn on_deleted(&self, raw_path: &Path) {
        let derived = match self.mapper.to_derived(raw_path) {
            Ok(derived) => derived,
            Err(e) => {
                error!("Refusing to dispatch {}: {e}", raw_path.display());
                return;
            }
        };

        match self.index.find(&derived) {
            Some(item) => {
                info!("Deleting derived artifact {}", derived.display());
                if let Err(e) = self.index.delete(&item) {
                    error!("Delete of {} failed: {e:#}", derived.display());
                }
            }
            // Already absent; deletion is idempotent.
            None => debug!("No derived artifact for {}", raw_path.display()),
        }
    }

    fn import_to(&self, raw_path: &Path, derived: &Path) -> Result<()> {
        let folder = self.ensure_parent_folder(derived)?;

        if derived.exists() {
            // Overwrite import: silent, no UI involvement.
            match self.index.find(derived) {
                Some(item) => self.importer.reimport(&item)?,
                None => self.importer.import(raw_path, &folder, true)?,
            }
        } else {
            info!("Fresh import of {}", raw_path.display());
            self.importer.bring_to_front();
            self.importer.import(raw_path, &folder, false)?;
        }

        self.index.record(DerivedItem {
            derived_path: derived.to_path_buf(),
            source_path: raw_path.to_path_buf(),
        })
    }

    /// Create the derived-tree folder for an artifact, refreshing the index
    /// when new directories appear
    fn ensure_parent_folder(&self, derived: &Path) -> Result<PathBuf> {
        let folder = derived
            .parent()
            .with_context(|| format!("Derived path {} has no parent", derived.display()))?;

        if !folder.exists() {
            std::fs::create_dir_all(folder)
                .with_context(|| format!("Failed to create folder {}", folder.display()))?;
            self.index.refresh_folder(folder, true)?;
        }
        Ok(folder.to_path_buf())
    }
}

impl ChangeSink for ChangeDispatcher {
    fn on_created(&self, path: &Path) {
        ChangeDispatcher::on_created(self, path);
    }
    fn on_changed(&self, path: &Path) {
        ChangeDispatcher::on_changed(self, path);
    }
    fn on_deleted(&self, path: &Path) {
        ChangeDispatcher::on_deleted(self, path);
    }
}
