//! Synchronizer lifecycle: construction, startup reconciliation, watching,
//! and ordered teardown

use crate::dispatch::ChangeDispatcher;
use crate::reconcile::Reconciler;
use assetsync_core::{ContentIndex, Importer, PathMapper, SyncConfig};
use assetsync_watcher::{ChangeSink, EventBuffer, FlushTimer, IgnoreRules, WatchHandle};
use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::info;

/// Keeps the derived tree synchronized with the raw tree
///
/// Construction validates the configuration, creates missing roots, runs a
/// full reconciliation, then starts the watcher and the flush timer. From
/// that point every coalesced change batch flows through the dispatcher.
///
/// Teardown order is load-bearing: the watcher stops before the flush timer
/// so no event source can fire into a stopped pipeline; pending buffered
/// changes are dropped, not flushed.
pub struct FolderSynchronizer {
    reconciler: Reconciler,
    buffer: Arc<EventBuffer>,
    watch: Option<WatchHandle>,
    timer: Option<FlushTimer>,
}

impl FolderSynchronizer {
    /// Build and start a synchronizer
    pub fn start(
        config: &SyncConfig,
        index: Arc<dyn ContentIndex>,
        importer: Arc<dyn Importer>,
    ) -> Result<Self> {
        config.validate()?;

        if !config.raw_root.exists() {
            std::fs::create_dir_all(&config.raw_root).with_context(|| {
                format!("Failed to create raw root {}", config.raw_root.display())
            })?;
        }
        if !config.derived_root.exists() {
            std::fs::create_dir_all(&config.derived_root).with_context(|| {
                format!(
                    "Failed to create derived root {}",
                    config.derived_root.display()
                )
            })?;
            // The index has never seen this folder; bring it up to date.
            index.refresh_folder(&config.content_root, true)?;
        }

        let mapper = PathMapper::new(
            &config.raw_root,
            &config.derived_root,
            &config.derived_extension,
        );
        let rules = Arc::new(IgnoreRules::load(&config.raw_root)?);
        let dispatcher = Arc::new(ChangeDispatcher::new(
            mapper.clone(),
            index.clone(),
            importer,
        ));
        let reconciler = Reconciler::new(mapper, index, dispatcher.clone(), rules.clone());

        // Establish a consistent baseline before the watcher takes over.
        reconciler.synchronize()?;

        let buffer = Arc::new(EventBuffer::new());
        let watch = WatchHandle::spawn(&config.raw_root, buffer.clone(), rules)?;
        let timer = FlushTimer::start(
            buffer.clone(),
            dispatcher as Arc<dyn ChangeSink>,
            config.flush_interval(),
        );

        info!(
            "Synchronizing {} -> {} (flush window {:?})",
            config.raw_root.display(),
            config.derived_root.display(),
            config.flush_interval()
        );

        Ok(Self {
            reconciler,
            buffer,
            watch: Some(watch),
            timer: Some(timer),
        })
    }

    /// Run a full reconciliation on demand
    ///
    /// The recovery path after a watcher overflow or OS watch failure.
    pub fn synchronize(&self) -> Result<()> {
        self.reconciler.synchronize()
    }

    /// Number of paths with changes waiting for the next flush window
    pub fn pending_changes(&self) -> usize {
        self.buffer.pending_len()
    }

    /// Stop watching and flushing; idempotent
    ///
    /// In-flight imports triggered by an earlier flush are not interrupted,
    /// but no further flushes occur.
    pub fn shutdown(&mut self) {
        if let Some(watch) = self.watch.take() {
            watch.stop();
        }
        if let Some(timer) = self.timer.take() {
            timer.stop();
        }
    }
}

impl Drop for FolderSynchronizer {
    fn drop(&mut self) {
        self.shutdown();
    }
}
