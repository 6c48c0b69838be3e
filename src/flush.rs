//! Deferred deallocation for flushed storage.

use crate::container::DataContainer;
use crate::time::TimeEntry;

/// Owns storage stolen by a flush so it can be dropped later, off the
/// caller's critical path.
///
/// A full flush is O(1): the index bins and column containers are moved in
/// here wholesale instead of being cleared in place. The handle is `Send`,
/// so a harvesting thread can take it and pay the deallocation cost there.
/// Dropping it (or calling [`DelayedFlush::clear`]) frees everything.
#[derive(Debug, Default)]
pub struct DelayedFlush {
    entries: Vec<Vec<TimeEntry>>,
    containers: Vec<DataContainer>,
}

impl DelayedFlush {
    /// Creates an empty handle.
    pub fn new() -> Self {
        Self::default()
    }

    /// Takes ownership of flushed index bins.
    pub fn absorb_entries(&mut self, bins: Vec<Vec<TimeEntry>>) {
        self.entries.extend(bins.into_iter().filter(|b| !b.is_empty()));
    }

    /// Takes ownership of a flushed column container.
    pub fn absorb_container(&mut self, container: DataContainer) {
        if !container.is_empty() {
            self.containers.push(container);
        }
    }

    /// Folds another handle's storage into this one.
    pub fn merge(&mut self, mut other: DelayedFlush) {
        self.entries.append(&mut other.entries);
        self.containers.append(&mut other.containers);
    }

    /// True when nothing is pending deallocation.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty() && self.containers.is_empty()
    }

    /// Frees all held storage now.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.containers.clear();
    }
}
