//! Concurrent digest-to-group index.
//!
//! The [`Aggregator`] is the only writer of the duplicate index. It is
//! backed by a sharded [`DashMap`], so inserts for different digests only
//! contend when they land on the same shard, and inserts for the same
//! digest are serialized by that shard's lock.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use crossbeam_channel::Receiver;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use super::groups::{DuplicateGroup, DuplicateIndex};
use crate::scanner::{FileEntry, Hash};

/// Concurrency-safe builder of the duplicate index.
#[derive(Debug, Default)]
pub struct Aggregator {
    index: DashMap<Hash, DuplicateGroup>,
    entries: AtomicUsize,
    closed: AtomicBool,
}

impl Aggregator {
    /// Create an empty aggregator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert one entry.
    ///
    /// The first entry for a digest becomes the group's representative;
    /// later ones are appended to its members.
    pub fn add(&self, entry: FileEntry) {
        match self.index.entry(entry.hash) {
            Entry::Occupied(mut group) => group.get_mut().push(entry.path),
            Entry::Vacant(slot) => {
                slot.insert(DuplicateGroup::new(entry.hash, entry.size, entry.path));
            }
        }
        self.entries.fetch_add(1, Ordering::Relaxed);
    }

    /// Add every entry from `receiver` until the channel closes, then mark
    /// the aggregator closed.
    ///
    /// Returns the number of entries consumed.
    pub fn consume(&self, receiver: Receiver<FileEntry>) -> usize {
        let mut consumed = 0;
        for entry in receiver {
            self.add(entry);
            consumed += 1;
        }
        self.close();
        log::debug!("Aggregator: input closed after {} entries", consumed);
        consumed
    }

    /// Declare that no further input will arrive.
    pub fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }

    /// Whether [`Aggregator::close`] was called.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Copy the current index.
    ///
    /// Before the input is closed this is a partial view.
    #[must_use]
    pub fn snapshot(&self) -> DuplicateIndex {
        if !self.is_closed() {
            log::debug!("Aggregator: snapshot taken before input closed; results are partial");
        }
        self.index.iter().map(|group| group.value().clone()).collect()
    }

    /// Number of distinct digests seen so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Whether no entry was added yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Number of entries added so far.
    #[must_use]
    pub fn entries_added(&self) -> usize {
        self.entries.load(Ordering::Relaxed)
    }
}
