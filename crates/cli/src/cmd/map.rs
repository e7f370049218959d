//! Print the derived path a raw path maps to

use anyhow::Result;
use assetsync_core::{PathMapper, SyncConfig};
use std::path::Path;

pub fn run(config_path: &Path, raw_path: &Path) -> Result<()> {
    let config = SyncConfig::load(config_path)?;
    let mapper = PathMapper::new(
        &config.raw_root,
        &config.derived_root,
        &config.derived_extension,
    );

    let derived = mapper.to_derived(raw_path)?;
    println!("{}", derived.display());
    Ok(())
}
