//! Debounced file-system watching for assetsync
//!
//! Raw notifications arrive noisy, duplicated and out of order. This crate
//! coalesces them into at most one logical change per path per flush window:
//!
//! notify callback -> bounded channel -> ingest thread -> [`EventBuffer`]
//! -> flush timer -> [`ChangeSink`] (one callback per surviving path)

pub mod buffer;
pub mod event;
pub mod ignore;
pub mod watch;

pub use buffer::{merge, EventBuffer, FlushTimer};
pub use event::ChangeKind;
pub use ignore::IgnoreRules;
pub use watch::WatchHandle;

use std::path::Path;

/// Receiver of coalesced change batches
///
/// One method call per surviving (path, kind) pair per flush window. Calls
/// arrive on the flush timer thread and may be slow; the buffer never holds
/// its lock across them.
pub trait ChangeSink: Send + Sync {
    fn on_created(&self, path: &Path);
    fn on_changed(&self, path: &Path);
    fn on_deleted(&self, path: &Path);
}
