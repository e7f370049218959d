//! Logical change kinds and their mapping from notify events

use notify::event::ModifyKind;
use notify::EventKind;

/// The three logical changes the synchronizer reacts to
///
/// Renames are intentionally not a kind of their own: the ingest path splits
/// them into a delete of the old path and a create of the new one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ChangeKind {
    Created,
    Changed,
    Deleted,
}

/// Map a notify event kind to a logical change kind
///
/// Returns `None` for kinds the synchronizer does not react to (access
/// events, metadata-only noise, unclassified events). Rename events are
/// handled before this mapping; see [`crate::watch`].
pub fn classify(kind: &EventKind) -> Option<ChangeKind> {
    match kind {
        EventKind::Create(_) => Some(ChangeKind::Created),
        EventKind::Remove(_) => Some(ChangeKind::Deleted),
        EventKind::Modify(ModifyKind::Name(_)) => None, // renames handled separately
        EventKind::Modify(_) => Some(ChangeKind::Changed),
        _ => None,
    }
}
