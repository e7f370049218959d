//! Content index: the system of record for derived artifacts
//!
//! The index maps each derived-tree path to the raw path it was imported
//! from. The path transform discards the raw extension, so this recorded
//! source is the only way back from a derived artifact to its origin.

use anyhow::{Context, Result};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// A derived artifact known to the index
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DerivedItem {
    /// Absolute path of the artifact in the derived tree
    pub derived_path: PathBuf,

    /// Absolute path of the raw file it was imported from
    pub source_path: PathBuf,
}

/// Lookup and bookkeeping surface the synchronizer needs from the index
///
/// The index is a shared mutable resource accessed without a transaction;
/// callers must tolerate it trailing the filesystem slightly.
pub trait ContentIndex: Send + Sync {
    /// Look up the item at a derived-tree path
    fn find(&self, derived_path: &Path) -> Option<DerivedItem>;

    /// Record an imported item (insert or update its source)
    fn record(&self, item: DerivedItem) -> Result<()>;

    /// Delete an item: remove it from the index and its artifact from disk
    fn delete(&self, item: &DerivedItem) -> Result<()>;

    /// Re-scan a derived-tree folder, dropping entries whose artifact is gone
    fn refresh_folder(&self, folder: &Path, recursive: bool) -> Result<()>;

    /// All known items whose derived path lies under `folder`
    fn items_under(&self, folder: &Path) -> Vec<DerivedItem>;
}

/// File-backed index: a JSON map of derived path -> source path
///
/// Persisted eagerly on every mutation; the map is small (one entry per
/// artifact) and eager writes keep the on-disk state honest across crashes.
pub struct JsonIndex {
    file: PathBuf,
    entries: RwLock<BTreeMap<PathBuf, PathBuf>>,
}

impl JsonIndex {
    /// Open an index file, creating an empty one if it does not exist
    pub fn open(file: &Path) -> Result<Self> {
        let entries = if file.exists() {
            let text = std::fs::read_to_string(file)
                .with_context(|| format!("Failed to read index file {}", file.display()))?;
            serde_json::from_str(&text)
                .with_context(|| format!("Failed to parse index file {}", file.display()))?
        } else {
            BTreeMap::new()
        };

        Ok(Self {
            file: file.to_path_buf(),
            entries: RwLock::new(entries),
        })
    }

    fn save(&self, entries: &BTreeMap<PathBuf, PathBuf>) -> Result<()> {
        if let Some(parent) = self.file.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create index directory {}", parent.display()))?;
        }
        let text = serde_json::to_string_pretty(entries)?;
        std::fs::write(&self.file, text)
            .with_context(|| format!("Failed to write index file {}", self.file.display()))?;
        Ok(())
    }
}

impl ContentIndex for JsonIndex {
    fn find(&self, derived_path: &Path) -> Option<DerivedItem> {
        self.entries
            .read()
            .get(derived_path)
            .map(|source| DerivedItem {
                derived_path: derived_path.to_path_buf(),
                source_path: source.clone(),
            })
    }

    fn record(&self, item: DerivedItem) -> Result<()> {
        let mut entries = self.entries.write();
        entries.insert(item.derived_path, item.source_path);
        self.save(&entries)
    }

    fn delete(&self, item: &DerivedItem) -> Result<()> {
        if item.derived_path.exists() {
            std::fs::remove_file(&item.derived_path).with_context(|| {
                format!("Failed to delete artifact {}", item.derived_path.display())
            })?;
        }

        let mut entries = self.entries.write();
        entries.remove(&item.derived_path);
        self.save(&entries)
    }

    fn refresh_folder(&self, folder: &Path, recursive: bool) -> Result<()> {
        // Walk what is actually on disk so stale entries can be dropped.
        let max_depth = if recursive { usize::MAX } else { 1 };
        let mut on_disk = Vec::new();
        for entry in WalkDir::new(folder).max_depth(max_depth).follow_links(false) {
            match entry {
                Ok(entry) if entry.file_type().is_file() => {
                    on_disk.push(entry.into_path());
                }
                Ok(_) => {}
                Err(e) => warn!("Index refresh skipped an entry under {}: {e}", folder.display()),
            }
        }

        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|derived, _| !derived.starts_with(folder) || on_disk.contains(derived));
        if entries.len() != before {
            debug!(
                "Index refresh dropped {} stale entries under {}",
                before - entries.len(),
                folder.display()
            );
            self.save(&entries)?;
        }
        Ok(())
    }

    fn items_under(&self, folder: &Path) -> Vec<DerivedItem> {
        self.entries
            .read()
            .iter()
            .filter(|(derived, _)| derived.starts_with(folder))
            .map(|(derived, source)| DerivedItem {
                derived_path: derived.clone(),
                source_path: source.clone(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn item(derived: &Path, source: &Path) -> DerivedItem {
        DerivedItem {
            derived_path: derived.to_path_buf(),
            source_path: source.to_path_buf(),
        }
    }

    #[test]
    fn test_record_find_roundtrip_persists() -> Result<()> {
        let dir = TempDir::new()?;
        let file = dir.path().join("index.json");
        let derived = dir.path().join("a.flax");
        let source = dir.path().join("a.txt");

        {
            let index = JsonIndex::open(&file)?;
            index.record(item(&derived, &source))?;
        }

        // A fresh handle sees the persisted entry.
        let index = JsonIndex::open(&file)?;
        let found = index.find(&derived).expect("entry should persist");
        assert_eq!(found.source_path, source);
        Ok(())
    }

    #[test]
    fn test_delete_removes_entry_and_artifact() -> Result<()> {
        let dir = TempDir::new()?;
        let index = JsonIndex::open(&dir.path().join("index.json"))?;
        let derived = dir.path().join("a.flax");
        std::fs::write(&derived, b"artifact")?;

        let it = item(&derived, &dir.path().join("a.txt"));
        index.record(it.clone())?;
        index.delete(&it)?;

        assert!(index.find(&derived).is_none());
        assert!(!derived.exists());
        Ok(())
    }

    #[test]
    fn test_delete_is_idempotent_when_artifact_missing() -> Result<()> {
        let dir = TempDir::new()?;
        let index = JsonIndex::open(&dir.path().join("index.json"))?;
        let it = item(&dir.path().join("gone.flax"), &dir.path().join("gone.txt"));

        index.record(it.clone())?;
        index.delete(&it)?;
        index.delete(&it)?; // Nothing left to remove; still Ok.
        Ok(())
    }

    #[test]
    fn test_items_under_filters_by_folder() -> Result<()> {
        let dir = TempDir::new()?;
        let index = JsonIndex::open(&dir.path().join("index.json"))?;
        let inside = dir.path().join("derived/a.flax");
        let outside = dir.path().join("other/b.flax");

        index.record(item(&inside, &dir.path().join("a.txt")))?;
        index.record(item(&outside, &dir.path().join("b.txt")))?;

        let items = index.items_under(&dir.path().join("derived"));
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].derived_path, inside);
        Ok(())
    }

    #[test]
    fn test_refresh_folder_drops_stale_entries() -> Result<()> {
        let dir = TempDir::new()?;
        let index = JsonIndex::open(&dir.path().join("index.json"))?;
        let folder = dir.path().join("derived");
        std::fs::create_dir_all(&folder)?;

        let kept = folder.join("kept.flax");
        std::fs::write(&kept, b"artifact")?;
        index.record(item(&kept, &dir.path().join("kept.txt")))?;
        index.record(item(&folder.join("stale.flax"), &dir.path().join("stale.txt")))?;

        index.refresh_folder(&folder, true)?;

        assert!(index.find(&kept).is_some());
        assert!(index.find(&folder.join("stale.flax")).is_none());
        Ok(())
    }
}
