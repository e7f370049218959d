//! Raw-to-derived folder synchronization
//!
//! Ties the pieces together: coalesced change batches from the watcher are
//! dispatched as import/delete actions against the derived tree, and a full
//! reconciliation pass catches anything that happened while nobody was
//! watching.

pub mod dispatch;
pub mod reconcile;
pub mod synchronizer;

pub use dispatch::ChangeDispatcher;
pub use reconcile::Reconciler;
pub use synchronizer::FolderSynchronizer;

#[cfg(test)]
pub(crate) mod testutil;
