//! Snapshot cache: the most recently loaded entry sequence for one
//! store identity, kept so reconciliation does not re-read and re-parse
//! the file on every mutation.
//!
//! Staleness policy: the cached sequence is replaced on every successful
//! load and every successful store, and invalidated when a store fails
//! (the disk state is unknown at that point, so the next reconciliation
//! must re-read the file). The cache never observes out-of-process edits
//! between a store and the next invalidation; a single process owns a
//! given identity.

use crate::core::Entry;
use std::sync::Mutex;

#[derive(Default)]
pub struct SnapshotCache {
    slot: Mutex<Option<Vec<Entry>>>,
}

impl SnapshotCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The cached sequence, if any. Cloned out so the caller can patch it
    /// freely before writing through.
    pub fn get(&self) -> Option<Vec<Entry>> {
        self.lock().clone()
    }

    /// Replaces the cached sequence after a successful load or store.
    pub fn replace(&self, entries: Vec<Entry>) {
        *self.lock() = Some(entries);
    }

    /// Drops the cached sequence; the next reconciliation re-reads disk.
    pub fn invalidate(&self) {
        *self.lock() = None;
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<Vec<Entry>>> {
        // A poisoned slot still holds a valid sequence; recover it.
        self.slot.lock().unwrap_or_else(|err| err.into_inner())
    }
}
