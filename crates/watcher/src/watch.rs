//! notify-based watch thread feeding the event buffer
//!
//! The notify callback does no work beyond pushing into a bounded channel;
//! a dedicated ingest thread classifies events, applies ignore rules and
//! records into the [`EventBuffer`]. Watcher errors are logged and the
//! watcher is not restarted: a manual full reconciliation is the recovery
//! path after an overflow or OS-level watch failure.

use crate::buffer::EventBuffer;
use crate::event::{classify, ChangeKind};
use crate::ignore::IgnoreRules;
use anyhow::{Context, Result};
use crossbeam_channel::{bounded, Receiver, TrySendError};
use notify::event::{ModifyKind, RenameMode};
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::Path;
use std::sync::Arc;
use std::thread::JoinHandle;
use tracing::{error, info, warn};

/// Channel capacity between the notify callback and the ingest thread.
/// Large enough to ride out import-induced stalls on the flush thread.
const EVENT_QUEUE_CAPACITY: usize = 8192;

/// Running watch: the OS watcher plus its ingest thread
///
/// Stop order is load-bearing: the watcher is dropped first so no callback
/// can fire into a torn-down pipeline, then the ingest thread drains out.
pub struct WatchHandle {
    watcher: Option<RecommendedWatcher>,
    ingest: Option<JoinHandle<()>>,
}

impl WatchHandle {
    /// Watch `raw_root` recursively, recording coalesced changes into `buffer`
    pub fn spawn(
        raw_root: &Path,
        buffer: Arc<EventBuffer>,
        rules: Arc<IgnoreRules>,
    ) -> Result<Self> {
        let (tx, rx) = bounded::<notify::Result<Event>>(EVENT_QUEUE_CAPACITY);

        let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| {
            match tx.try_send(res) {
                Ok(()) => {}
                Err(TrySendError::Full(_)) => {
                    // Dropped events are recovered by the next reconciliation.
                    warn!("Watch event queue full, dropping event");
                }
                Err(TrySendError::Disconnected(_)) => {}
            }
        })
        .context("Failed to create filesystem watcher")?;

        watcher
            .watch(raw_root, RecursiveMode::Recursive)
            .with_context(|| format!("Failed to watch {}", raw_root.display()))?;
        info!("Watching {} recursively", raw_root.display());

        let ingest = std::thread::spawn(move || ingest_loop(rx, buffer, rules));

        Ok(Self {
            watcher: Some(watcher),
            ingest: Some(ingest),
        })
    }

    /// Stop watching: tear down the OS watcher, then join the ingest thread
    pub fn stop(mut self) {
        self.teardown();
    }

    fn teardown(&mut self) {
        // Dropping the watcher drops the callback and disconnects the
        // channel, which ends the ingest loop.
        self.watcher.take();
        if let Some(handle) = self.ingest.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for WatchHandle {
    fn drop(&mut self) {
        self.teardown();
    }
}

fn ingest_loop(
    rx: Receiver<notify::Result<Event>>,
    buffer: Arc<EventBuffer>,
    rules: Arc<IgnoreRules>,
) {
    while let Ok(res) = rx.recv() {
        match res {
            Ok(event) => ingest_event(event, &buffer, &rules),
            // The OS watch may silently stop delivering after this; operators
            // recover with a manual sync.
            Err(e) => error!("Filesystem watcher error: {e}"),
        }
    }
}

fn ingest_event(event: Event, buffer: &EventBuffer, rules: &IgnoreRules) {
    match event.kind {
        // A rename carrying both paths is observed as delete + create. Some
        // backends report it as the catch-all `Any` instead of `Both`.
        EventKind::Modify(ModifyKind::Name(RenameMode::Both | RenameMode::Any))
            if event.paths.len() == 2 =>
        {
            let mut paths = event.paths.into_iter();
            let (Some(old), Some(new)) = (paths.next(), paths.next()) else {
                return;
            };
            match (rules.should_ignore(&old), rules.should_ignore(&new)) {
                (false, false) => buffer.record_rename(old, new),
                (false, true) => buffer.record(old, ChangeKind::Deleted),
                (true, false) => buffer.record(new, ChangeKind::Created),
                (true, true) => {}
            }
        }
        // Rename halves reported separately.
        EventKind::Modify(ModifyKind::Name(RenameMode::From)) => {
            record_all(event.paths, ChangeKind::Deleted, buffer, rules);
        }
        EventKind::Modify(ModifyKind::Name(RenameMode::To)) => {
            record_all(event.paths, ChangeKind::Created, buffer, rules);
        }
        // Catch-all rename with a single path: the backend did not say which
        // side this is, so the path's current existence decides.
        EventKind::Modify(ModifyKind::Name(RenameMode::Any)) => {
            for path in event.paths {
                if rules.should_ignore(&path) {
                    continue;
                }
                let kind = if path.exists() {
                    ChangeKind::Created
                } else {
                    ChangeKind::Deleted
                };
                buffer.record(path, kind);
            }
        }
        ref kind => {
            if let Some(change) = classify(kind) {
                record_all(event.paths, change, buffer, rules);
            }
        }
    }
}

fn record_all(
    paths: Vec<std::path::PathBuf>,
    kind: ChangeKind,
    buffer: &EventBuffer,
    rules: &IgnoreRules,
) {
    for path in paths {
        if rules.should_ignore(&path) {
            continue;
        }
        buffer.record(path, kind);
    }
}
