//! Create a default configuration and the asset folders

use anyhow::{bail, Context, Result};
use assetsync_core::SyncConfig;
use std::path::Path;
use tracing::info;

pub fn run(directory: &Path) -> Result<()> {
    std::fs::create_dir_all(directory)
        .with_context(|| format!("Failed to create {}", directory.display()))?;
    let root = std::fs::canonicalize(directory)?;

    let config_path = root.join("assetsync.toml");
    if config_path.exists() {
        bail!("{} already exists", config_path.display());
    }

    let config = SyncConfig {
        raw_root: root.join("assets"),
        derived_root: root.join("content/imported"),
        content_root: root.join("content"),
        flush_interval_ms: 500,
        derived_extension: "flax".to_string(),
    };
    config.validate()?;

    std::fs::create_dir_all(&config.raw_root)?;
    std::fs::create_dir_all(&config.derived_root)?;
    std::fs::write(&config_path, toml::to_string_pretty(&config)?)
        .with_context(|| format!("Failed to write {}", config_path.display()))?;

    info!("Initialized assetsync project at {}", root.display());
    println!("Created {}", config_path.display());
    println!("Raw assets go in {}", config.raw_root.display());
    Ok(())
}
