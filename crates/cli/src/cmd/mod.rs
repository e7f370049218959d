//! Command implementations

pub mod init;
pub mod map;
pub mod run;
pub mod sync;

use anyhow::Result;
use assetsync_core::{CopyImporter, JsonIndex, SyncConfig};
use std::sync::Arc;

/// Relative location of the index file under the content root
const INDEX_FILE: &str = ".assetsync/index.json";

/// Open the collaborators the synchronizer needs: the JSON content index
/// and the copying importer
fn collaborators(config: &SyncConfig) -> Result<(Arc<JsonIndex>, Arc<CopyImporter>)> {
    let index = JsonIndex::open(&config.content_root.join(INDEX_FILE))?;
    let importer = CopyImporter::new(&config.derived_extension);
    Ok((Arc::new(index), Arc::new(importer)))
}
