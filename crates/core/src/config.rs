//! Synchronizer configuration
//!
//! Loaded from `assetsync.toml`. The only hard constraint is that the derived
//! root must be a descendant of the content root: artifacts written anywhere
//! else would be invisible to the content index.

use crate::error::CoreError;
use crate::pathmap::normalize;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Immutable synchronizer configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Root of the raw asset tree (watched)
    pub raw_root: PathBuf,

    /// Root of the derived artifact tree (written)
    pub derived_root: PathBuf,

    /// Root the content index covers; `derived_root` must live under it
    pub content_root: PathBuf,

    /// Flush window for the event buffer, in milliseconds (default: 500)
    #[serde(default = "default_flush_interval_ms")]
    pub flush_interval_ms: u64,

    /// Extension given to derived artifacts (default: "flax")
    #[serde(default = "default_derived_extension")]
    pub derived_extension: String,
}

impl SyncConfig {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: Self = toml::from_str(&text)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate root relationships
    ///
    /// Fails if the derived root escapes the content root, or if the raw and
    /// derived trees overlap (either direction would feed the pipeline its
    /// own output).
    pub fn validate(&self) -> Result<(), CoreError> {
        let raw = normalize(&self.raw_root);
        let derived = normalize(&self.derived_root);
        let content = normalize(&self.content_root);

        if !derived.starts_with(&content) {
            return Err(CoreError::DerivedRootOutsideContent { derived, content });
        }
        if derived.starts_with(&raw) || raw.starts_with(&derived) {
            return Err(CoreError::OverlappingRoots { raw, derived });
        }
        Ok(())
    }

    /// Flush window as a [`Duration`]
    pub fn flush_interval(&self) -> Duration {
        Duration::from_millis(self.flush_interval_ms)
    }
}

fn default_flush_interval_ms() -> u64 {
    500
}

fn default_derived_extension() -> String {
    "flax".to_string()
}
