//! Per-path event coalescing
//!
//! The buffer accepts a high-frequency stream of (path, kind) notifications
//! from the watcher thread and keeps at most one pending kind per path,
//! folding repeats with [`merge`]. A [`FlushTimer`] drains it on a fixed
//! interval and delivers the batch to a [`ChangeSink`].

use crate::event::ChangeKind;
use crate::ChangeSink;
use crossbeam_channel::{bounded, Sender};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;
use tracing::{debug, trace};

/// Fold a newly observed kind into the kind already pending for a path
///
/// - A later modification always wins.
/// - A later deletion always wins.
/// - A create after a pending delete becomes a change: editors that save by
///   delete-then-recreate must not look like a fresh file.
///
/// The match is exhaustive on purpose; a new kind must be placed in this
/// table explicitly, not absorbed by a wildcard.
pub fn merge(old: ChangeKind, new: ChangeKind) -> ChangeKind {
    match new {
        ChangeKind::Changed => ChangeKind::Changed,
        ChangeKind::Deleted => ChangeKind::Deleted,
        ChangeKind::Created => match old {
            ChangeKind::Deleted => ChangeKind::Changed,
            ChangeKind::Created | ChangeKind::Changed => ChangeKind::Created,
        },
    }
}

/// Coalescing buffer of pending per-path changes
///
/// `record` is cheap and lock-bounded so the watcher thread is never blocked
/// behind a slow downstream import.
pub struct EventBuffer {
    pending: Mutex<HashMap<PathBuf, ChangeKind>>,
}

impl EventBuffer {
    pub fn new() -> Self {
        Self {
            pending: Mutex::new(HashMap::new()),
        }
    }

    /// Record one observation for a path
    pub fn record(&self, path: PathBuf, kind: ChangeKind) {
        let mut pending = self.pending.lock();
        match pending.get(&path).copied() {
            Some(old) => {
                let merged = merge(old, kind);
                trace!("Merged {old:?} + {kind:?} -> {merged:?} for {}", path.display());
                pending.insert(path, merged);
            }
            None => {
                pending.insert(path, kind);
            }
        }
    }

    /// Record a rename as a delete of the old path and a create of the new
    ///
    /// Each half is independently subject to the merge rule.
    pub fn record_rename(&self, old_path: PathBuf, new_path: PathBuf) {
        self.record(old_path, ChangeKind::Deleted);
        self.record(new_path, ChangeKind::Created);
    }

    /// Swap out and return the pending batch
    ///
    /// The map is replaced under the lock and iterated after release, so
    /// events recorded while the batch is being delivered land in the next
    /// window: never lost, never double-delivered.
    pub fn drain(&self) -> Vec<(PathBuf, ChangeKind)> {
        let batch = std::mem::take(&mut *self.pending.lock());
        batch.into_iter().collect()
    }

    /// Drain the buffer and deliver each surviving entry to the sink
    ///
    /// Runs on the flush timer thread; sink calls may be slow and must not
    /// be made while holding the buffer lock.
    pub fn flush_into(&self, sink: &dyn ChangeSink) {
        let batch = self.drain();
        if batch.is_empty() {
            return;
        }

        debug!("Flushing {} coalesced change(s)", batch.len());
        for (path, kind) in batch {
            match kind {
                ChangeKind::Created => sink.on_created(&path),
                ChangeKind::Changed => sink.on_changed(&path),
                ChangeKind::Deleted => sink.on_deleted(&path),
            }
        }
    }

    /// Number of paths with a pending change
    pub fn pending_len(&self) -> usize {
        self.pending.lock().len()
    }
}

impl Default for EventBuffer {
    fn default() -> Self {
        Self::new()
    }
}

/// Periodic flusher for an [`EventBuffer`]
///
/// One dedicated thread; flushes are serialized by construction, so a slow
/// sink delays the next window instead of overlapping it. Stopping the timer
/// discards whatever is still pending, by design: teardown means the owning
/// synchronizer is going away.
pub struct FlushTimer {
    stop_tx: Sender<()>,
    handle: Option<JoinHandle<()>>,
}

impl FlushTimer {
    /// Start flushing `buffer` into `sink` every `interval`
    pub fn start(
        buffer: Arc<EventBuffer>,
        sink: Arc<dyn ChangeSink>,
        interval: Duration,
    ) -> Self {
        let (stop_tx, stop_rx) = bounded::<()>(1);
        let handle = std::thread::spawn(move || loop {
            match stop_rx.recv_timeout(interval) {
                Err(crossbeam_channel::RecvTimeoutError::Timeout) => {
                    buffer.flush_into(sink.as_ref());
                }
                // Stop requested or the timer owner is gone.
                _ => break,
            }
        });

        Self {
            stop_tx,
            handle: Some(handle),
        }
    }

    /// Stop the timer without flushing pending changes
    pub fn stop(mut self) {
        let _ = self.stop_tx.send(());
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for FlushTimer {
    fn drop(&mut self) {
        let _ = self.stop_tx.send(());
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}
