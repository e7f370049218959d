//! End-to-end pipeline tests: real watcher, real timer, copying importer,
//! JSON index

use assetsync_core::{ContentIndex, CopyImporter, JsonIndex, SyncConfig};
use assetsync_sync::FolderSynchronizer;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tempfile::TempDir;

struct Project {
    _dir: TempDir,
    config: SyncConfig,
    index: Arc<JsonIndex>,
}

fn project() -> Project {
    let dir = TempDir::new().unwrap();
    let config = SyncConfig {
        raw_root: dir.path().join("assets"),
        derived_root: dir.path().join("content/imported"),
        content_root: dir.path().join("content"),
        flush_interval_ms: 100,
        derived_extension: "flax".to_string(),
    };
    std::fs::create_dir_all(&config.raw_root).unwrap();
    std::fs::create_dir_all(&config.derived_root).unwrap();

    let index =
        Arc::new(JsonIndex::open(&dir.path().join(".assetsync/index.json")).unwrap());

    Project {
        _dir: dir,
        config,
        index,
    }
}

fn start(p: &Project) -> FolderSynchronizer {
    let importer = Arc::new(CopyImporter::new(&p.config.derived_extension));
    FolderSynchronizer::start(&p.config, p.index.clone(), importer).unwrap()
}

fn wait_for<F: Fn() -> bool>(cond: F, what: &str) {
    let deadline = Instant::now() + Duration::from_secs(10);
    while Instant::now() < deadline {
        if cond() {
            return;
        }
        std::thread::sleep(Duration::from_millis(25));
    }
    panic!("timed out waiting for {what}");
}

fn derived(p: &Project, rel: &str) -> PathBuf {
    p.config.derived_root.join(rel)
}

#[test]
fn test_startup_reconciliation_imports_preexisting_files() {
    let p = project();
    let raw = p.config.raw_root.join("a/b.txt");
    std::fs::create_dir_all(raw.parent().unwrap()).unwrap();
    std::fs::write(&raw, b"content").unwrap();

    let mut sync = start(&p);

    let artifact = derived(&p, "a/b.flax");
    assert!(artifact.exists());
    assert_eq!(p.index.find(&artifact).unwrap().source_path, raw);

    sync.shutdown();
}

#[test]
fn test_new_raw_file_is_imported_after_flush_window() {
    let p = project();
    let mut sync = start(&p);

    std::fs::write(p.config.raw_root.join("fresh.png"), b"pixels").unwrap();

    let artifact = derived(&p, "fresh.flax");
    wait_for(|| artifact.exists(), "fresh.flax to be imported");
    assert_eq!(std::fs::read(&artifact).unwrap(), b"pixels");

    sync.shutdown();
}

#[test]
fn test_deleted_raw_file_removes_derived_artifact() {
    let p = project();
    let raw = p.config.raw_root.join("doomed.txt");
    std::fs::write(&raw, b"content").unwrap();

    let mut sync = start(&p);
    let artifact = derived(&p, "doomed.flax");
    assert!(artifact.exists());

    std::fs::remove_file(&raw).unwrap();
    wait_for(|| !artifact.exists(), "doomed.flax to be deleted");
    assert!(p.index.find(&artifact).is_none());

    sync.shutdown();
}

#[test]
fn test_rename_is_observed_as_delete_plus_create() {
    let p = project();
    let old_raw = p.config.raw_root.join("old.txt");
    std::fs::write(&old_raw, b"content").unwrap();

    let mut sync = start(&p);
    let old_artifact = derived(&p, "old.flax");
    assert!(old_artifact.exists());

    std::fs::rename(&old_raw, p.config.raw_root.join("new.txt")).unwrap();

    let new_artifact = derived(&p, "new.flax");
    wait_for(
        || new_artifact.exists() && !old_artifact.exists(),
        "rename to land as delete + create",
    );

    sync.shutdown();
}

#[test]
fn test_manual_synchronize_recovers_offline_changes() {
    let p = project();
    let raw = p.config.raw_root.join("offline.txt");
    std::fs::write(&raw, b"content").unwrap();

    let mut sync = start(&p);
    sync.shutdown();

    // Changes while nothing is watching.
    let artifact = derived(&p, "offline.flax");
    std::fs::remove_file(&raw).unwrap();
    assert!(artifact.exists());

    sync.synchronize().unwrap();
    assert!(!artifact.exists());
}

#[test]
fn test_shutdown_is_idempotent_and_stops_dispatching() {
    let p = project();
    let mut sync = start(&p);
    sync.shutdown();
    sync.shutdown();

    std::fs::write(p.config.raw_root.join("late.txt"), b"content").unwrap();
    std::thread::sleep(Duration::from_millis(300));
    assert!(!derived(&p, "late.flax").exists());
}

#[test]
fn test_invalid_config_fails_construction() {
    let dir = TempDir::new().unwrap();
    let config = SyncConfig {
        raw_root: dir.path().join("assets"),
        derived_root: dir.path().join("outside"),
        content_root: dir.path().join("content"),
        flush_interval_ms: 100,
        derived_extension: "flax".to_string(),
    };
    let index = Arc::new(JsonIndex::open(&dir.path().join("index.json")).unwrap());
    let importer = Arc::new(CopyImporter::new("flax"));

    assert!(FolderSynchronizer::start(&config, index, importer).is_err());
}
