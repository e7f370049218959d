//! One-shot full reconciliation

use anyhow::Result;
use assetsync_core::{PathMapper, SyncConfig};
use assetsync_sync::{ChangeDispatcher, Reconciler};
use assetsync_watcher::IgnoreRules;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

pub fn run(config_path: &Path) -> Result<()> {
    let config = SyncConfig::load(config_path)?;
    let (index, importer) = super::collaborators(&config)?;

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
    let reconciler = Reconciler::new(mapper, index, dispatcher, rules);

    reconciler.synchronize()?;
    info!("Reconciliation complete");
    Ok(())
}
