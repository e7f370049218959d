//! Recording collaborators for dispatcher and reconciler tests

use assetsync_core::{ContentIndex, DerivedItem, Importer};
use anyhow::Result;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// One observed collaborator call, in arrival order
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Action {
    Import { raw: PathBuf, overwrite: bool },
    Reimport { derived: PathBuf },
    Delete { derived: PathBuf },
}

/// Shared ordered log; give the same log to the importer and the index to
/// assert cross-collaborator ordering (e.g. prune before import).
pub(crate) type ActionLog = Arc<Mutex<Vec<Action>>>;

/// Importer that records calls and optionally writes real artifacts
pub(crate) struct RecordingImporter {
    log: ActionLog,
    front_signals: AtomicUsize,
    /// When set, imports copy the raw file to `<folder>/<stem>.<ext>` so the
    /// derived tree actually changes, as a real importer's would.
    materialize_extension: Option<String>,
}

impl RecordingImporter {
    pub fn materializing(extension: &str) -> Self {
        Self::with_log(ActionLog::default(), Some(extension))
    }

    pub fn with_log(log: ActionLog, materialize_extension: Option<&str>) -> Self {
        Self {
            log,
            front_signals: AtomicUsize::new(0),
            materialize_extension: materialize_extension.map(str::to_string),
        }
    }

    pub fn actions(&self) -> Vec<Action> {
        self.log.lock().clone()
    }

    pub fn front_signals(&self) -> usize {
        self.front_signals.load(Ordering::SeqCst)
    }

    fn materialize(&self, raw: &Path, folder: &Path) -> Result<()> {
        if let (Some(ext), Some(stem)) = (&self.materialize_extension, raw.file_stem()) {
            if raw.is_file() {
                let mut target = folder.join(stem);
                target.set_extension(ext);
                std::fs::copy(raw, target)?;
            }
        }
        Ok(())
    }
}

impl Importer for RecordingImporter {
    fn import(&self, raw_path: &Path, destination_folder: &Path, overwrite: bool) -> Result<()> {
        self.log.lock().push(Action::Import {
            raw: raw_path.to_path_buf(),
            overwrite,
        });
        self.materialize(raw_path, destination_folder)
    }

    fn reimport(&self, item: &DerivedItem) -> Result<()> {
        self.log.lock().push(Action::Reimport {
            derived: item.derived_path.clone(),
        });
        let folder = item.derived_path.parent().unwrap_or_else(|| Path::new(""));
        self.materialize(&item.source_path, folder)
    }

    fn bring_to_front(&self) {
        self.front_signals.fetch_add(1, Ordering::SeqCst);
    }
}

/// In-memory content index that records deletions in the shared log
pub(crate) struct MemoryIndex {
    entries: Mutex<HashMap<PathBuf, PathBuf>>,
    log: ActionLog,
    refreshes: AtomicUsize,
}

impl MemoryIndex {
    pub fn new() -> Self {
        Self::with_log(ActionLog::default())
    }

    pub fn with_log(log: ActionLog) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            log,
            refreshes: AtomicUsize::new(0),
        }
    }

    pub fn deletes(&self) -> usize {
        self.log
            .lock()
            .iter()
            .filter(|a| matches!(a, Action::Delete { .. }))
            .count()
    }

    pub fn refreshes(&self) -> usize {
        self.refreshes.load(Ordering::SeqCst)
    }
}

impl ContentIndex for MemoryIndex {
    fn find(&self, derived_path: &Path) -> Option<DerivedItem> {
        self.entries
            .lock()
            .get(derived_path)
            .map(|source| DerivedItem {
                derived_path: derived_path.to_path_buf(),
                source_path: source.clone(),
            })
    }

    fn record(&self, item: DerivedItem) -> Result<()> {
        self.entries
            .lock()
            .insert(item.derived_path, item.source_path);
        Ok(())
    }

    fn delete(&self, item: &DerivedItem) -> Result<()> {
        self.log.lock().push(Action::Delete {
            derived: item.derived_path.clone(),
        });
        if item.derived_path.exists() {
            std::fs::remove_file(&item.derived_path)?;
        }
        self.entries.lock().remove(&item.derived_path);
        Ok(())
    }

    fn refresh_folder(&self, _folder: &Path, _recursive: bool) -> Result<()> {
        self.refreshes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn items_under(&self, folder: &Path) -> Vec<DerivedItem> {
        self.entries
            .lock()
            .iter()
            .filter(|(derived, _)| derived.starts_with(folder))
            .map(|(derived, source)| DerivedItem {
                derived_path: derived.clone(),
                source_path: source.clone(),
            })
            .collect()
    }
}
