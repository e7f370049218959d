//! Reconcile once, then watch until interrupted

use anyhow::{Context, Result};
use assetsync_core::SyncConfig;
use assetsync_sync::FolderSynchronizer;
use std::path::Path;
use std::sync::mpsc;
use tracing::info;

pub fn run(config_path: &Path) -> Result<()> {
    let config = SyncConfig::load(config_path)?;
    let (index, importer) = super::collaborators(&config)?;

    let mut synchronizer = FolderSynchronizer::start(&config, index, importer)?;

    let (stop_tx, stop_rx) = mpsc::channel::<()>();
    ctrlc::set_handler(move || {
        let _ = stop_tx.send(());
    })
    .context("Failed to install Ctrl-C handler")?;

    info!("Watching; press Ctrl-C to stop");
    let _ = stop_rx.recv();

    info!("Shutting down");
    synchronizer.shutdown();
    Ok(())
}
