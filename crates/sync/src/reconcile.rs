//! Full-tree reconciliation between the raw and derived trees
//!
//! Catches everything that happened while the watcher was not running.
//! Prune runs strictly before import: a raw file deleted and recreated at
//! the same path during downtime must not be left pointing at a stale
//! artifact.

use crate::dispatch::ChangeDispatcher;
use assetsync_core::{ContentIndex, PathMapper};
use assetsync_watcher::IgnoreRules;
use anyhow::Result;
use std::collections::VecDeque;
use std::path::Path;
use std::sync::Arc;
use std::time::SystemTime;
use tracing::{debug, info, warn};

/// Startup / on-demand reconciliation pass
pub struct Reconciler {
    mapper: PathMapper,
    index: Arc<dyn ContentIndex>,
    dispatcher: Arc<ChangeDispatcher>,
    rules: Arc<IgnoreRules>,
}

impl Reconciler {
    pub fn new(
        mapper: PathMapper,
        index: Arc<dyn ContentIndex>,
        dispatcher: Arc<ChangeDispatcher>,
        rules: Arc<IgnoreRules>,
    ) -> Self {
        Self {
            mapper,
            index,
            dispatcher,
            rules,
        }
    }

    /// Reconcile both trees; idempotent, safe to call repeatedly
    pub fn synchronize(&self) -> Result<()> {
        info!(
            "Reconciling {} -> {}",
            self.mapper.raw_root().display(),
            self.mapper.derived_root().display()
        );
        self.prune_orphaned_artifacts();
        self.import_missing_and_stale();
        Ok(())
    }

    /// Phase 1: delete derived items whose recorded raw source is gone
    fn prune_orphaned_artifacts(&self) {
        for item in self.index.items_under(self.mapper.derived_root()) {
            if item.source_path.exists() {
                continue;
            }
            info!(
                "Pruning {} (source {} is gone)",
                item.derived_path.display(),
                item.source_path.display()
            );
            if let Err(e) = self.index.delete(&item) {
                warn!("Failed to prune {}: {e:#}", item.derived_path.display());
            }
        }
    }

    /// Phase 2: walk the raw tree breadth-first, importing missing artifacts
    /// and reimporting stale ones
    ///
    /// Per-directory enumeration failures are logged and skipped; one
    /// unreadable subdirectory must not block the rest of the tree.
    fn import_missing_and_stale(&self) {
        let mut queue = VecDeque::new();
        queue.push_back(self.mapper.raw_root().to_path_buf());

        while let Some(dir) = queue.pop_front() {
            let entries = match std::fs::read_dir(&dir) {
                Ok(entries) => entries,
                Err(e) => {
                    warn!("Skipping unreadable directory {}: {e}", dir.display());
                    continue;
                }
            };

            for entry in entries {
                let entry = match entry {
                    Ok(entry) => entry,
                    Err(e) => {
                        warn!("Skipping unreadable entry in {}: {e}", dir.display());
                        continue;
                    }
                };

                let path = entry.path();
                if self.rules.should_ignore(&path) {
                    continue;
                }

                match entry.file_type() {
                    Ok(ft) if ft.is_dir() => queue.push_back(path),
                    Ok(ft) if ft.is_file() => self.reconcile_file(&path),
                    Ok(_) => {} // symlinks and specials are not assets
                    Err(e) => warn!("Skipping {}: {e}", path.display()),
                }
            }
        }
    }

    fn reconcile_file(&self, raw_path: &Path) {
        let derived = match self.mapper.to_derived(raw_path) {
            Ok(derived) => derived,
            Err(e) => {
                warn!("Skipping {}: {e}", raw_path.display());
                return;
            }
        };

        if !derived.exists() {
            self.dispatcher.on_created(raw_path);
            return;
        }

        match (mtime(raw_path), mtime(&derived)) {
            (Some(raw_mtime), Some(derived_mtime)) if raw_mtime > derived_mtime => {
                self.dispatcher.on_changed(raw_path);
            }
            (Some(_), Some(_)) => {
                debug!("{} is up to date", derived.display());
            }
            _ => warn!(
                "Could not compare timestamps for {}",
                raw_path.display()
            ),
        }
    }
}

fn mtime(path: &Path) -> Option<SystemTime> {
    std::fs::metadata(path).and_then(|m| m.modified()).ok()
}
