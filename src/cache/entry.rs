//! Cache Entry Module
//!
//! Defines the linked entry stored in the ordered index arena.

// == Entry Id ==
/// Stable arena slot identifier of a live entry.
///
/// Ids are recycled after the entry is removed, so an id is only meaningful
/// while its entry is still present in the index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntryId(pub(crate) usize);

impl EntryId {
    /// Returns the raw slot index.
    pub fn index(self) -> usize {
        self.0
    }
}

// == Entry ==
/// One key-value pair plus its position in the circular recency chain.
///
/// Walking `next` from the newest entry visits entries from newest to oldest
/// and wraps around; `previous` walks the same cycle in reverse.
#[derive(Debug, Clone)]
pub struct Entry<K, V> {
    /// The lookup key
    pub key: K,
    /// The stored value
    pub value: V,
    pub(crate) next: EntryId,
    pub(crate) previous: EntryId,
}

impl<K, V> Entry<K, V> {
    /// Creates an entry linked only to itself.
    pub(crate) fn new(id: EntryId, key: K, value: V) -> Self {
        Self {
            key,
            value,
            next: id,
            previous: id,
        }
    }

    /// Id of the adjacent older entry (wraps to the newest from the oldest).
    pub fn next(&self) -> EntryId {
        self.next
    }

    /// Id of the adjacent newer entry (wraps to the oldest from the newest).
    pub fn previous(&self) -> EntryId {
        self.previous
    }

    pub(crate) fn into_parts(self) -> (K, V) {
        (self.key, self.value)
    }
}
