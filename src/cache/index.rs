//! Ordered Index Module
//!
//! Hash-indexed circular doubly linked list giving O(1) insert-as-newest,
//! lookup, removal and access to the oldest entry.

use std::borrow::Borrow;
use std::collections::HashMap;
use std::hash::Hash;

use crate::cache::entry::{Entry, EntryId};
use crate::error::{CacheError, Result};

// == Ordered Index ==
/// Owns every entry in an arena and keeps them in a circular recency chain.
///
/// - `newest` = most recently added entry
/// - `newest.previous` = oldest entry
///
/// The index knows nothing about capacity or expiration; callers decide what
/// to add and what to remove.
#[derive(Debug)]
pub struct OrderedIndex<K, V> {
    /// Key to arena slot
    map: HashMap<K, EntryId>,
    /// Entry arena, `None` for free slots
    slots: Vec<Option<Entry<K, V>>>,
    /// Recycled slot indices
    free: Vec<usize>,
    /// Most recently added entry
    newest: Option<EntryId>,
}

impl<K, V> Default for OrderedIndex<K, V> {
    fn default() -> Self {
        Self {
            map: HashMap::new(),
            slots: Vec::new(),
            free: Vec::new(),
            newest: None,
        }
    }
}

impl<K, V> OrderedIndex<K, V>
where
    K: Hash + Eq + Clone,
{
    // == Constructor ==
    /// Creates a new empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty index with room for `capacity` entries.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            map: HashMap::with_capacity(capacity),
            slots: Vec::with_capacity(capacity),
            free: Vec::new(),
            newest: None,
        }
    }

    // == Add ==
    /// Inserts a new entry as the newest one.
    ///
    /// Fails with `DuplicateKey` if the key is already present; callers
    /// remove before re-adding.
    pub fn add(&mut self, key: K, value: V) -> Result<&mut Entry<K, V>> {
        if self.map.contains_key(&key) {
            return Err(CacheError::DuplicateKey);
        }

        let id = self.alloc();
        let mut entry = Entry::new(id, key.clone(), value);

        if let Some(newest) = self.newest {
            // Splice between the oldest and the current newest
            let oldest = self.node(newest).previous;
            entry.next = newest;
            entry.previous = oldest;
            self.node_mut(newest).previous = id;
            self.node_mut(oldest).next = id;
        }

        self.slots[id.0] = Some(entry);
        self.map.insert(key, id);
        self.newest = Some(id);

        Ok(self.node_mut(id))
    }

    // == Get ==
    /// Looks up an entry by key without changing its position.
    pub fn get<Q>(&self, key: &Q) -> Option<&Entry<K, V>>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let id = *self.map.get(key)?;
        self.slots[id.0].as_ref()
    }

    /// Mutable lookup by key, position unchanged.
    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut Entry<K, V>>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let id = *self.map.get(key)?;
        self.slots[id.0].as_mut()
    }

    /// Checks if a key is present.
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.map.contains_key(key)
    }

    /// Looks up a live entry by arena id.
    pub fn entry(&self, id: EntryId) -> Option<&Entry<K, V>> {
        self.slots.get(id.0).and_then(Option::as_ref)
    }

    // == Oldest / Newest ==
    /// Returns the least recently added entry (`newest.previous`).
    pub fn oldest(&self) -> Option<&Entry<K, V>> {
        let newest = self.newest?;
        self.entry(self.node(newest).previous)
    }

    /// Returns the most recently added entry.
    pub fn newest(&self) -> Option<&Entry<K, V>> {
        self.entry(self.newest?)
    }

    // == Remove ==
    /// Unlinks and returns the entry for `key`, or None if absent.
    pub fn remove<Q>(&mut self, key: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let id = self.map.remove(key)?;
        let entry = self.slots[id.0].take()?;
        self.free.push(id.0);

        if self.map.is_empty() {
            self.newest = None;
        } else {
            // With two entries prev == next, leaving the survivor self-linked
            self.node_mut(entry.previous).next = entry.next;
            self.node_mut(entry.next).previous = entry.previous;
            if self.newest == Some(id) {
                self.newest = Some(entry.next);
            }
        }

        Some(entry.into_parts())
    }

    // == Length ==
    /// Returns the number of entries.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Returns true if the index holds no entries.
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Drops every entry.
    pub fn clear(&mut self) {
        self.map.clear();
        self.slots.clear();
        self.free.clear();
        self.newest = None;
    }

    // == Iteration ==
    /// Iterates entries from newest to oldest by following `next`.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            index: self,
            cursor: self.newest,
            remaining: self.len(),
        }
    }

    // == Arena Helpers ==
    fn alloc(&mut self) -> EntryId {
        match self.free.pop() {
            Some(slot) => EntryId(slot),
            None => {
                self.slots.push(None);
                EntryId(self.slots.len() - 1)
            }
        }
    }

    fn node(&self, id: EntryId) -> &Entry<K, V> {
        match self.slots[id.0].as_ref() {
            Some(entry) => entry,
            None => unreachable!("recency chain links to free slot {}", id.0),
        }
    }

    fn node_mut(&mut self, id: EntryId) -> &mut Entry<K, V> {
        match self.slots[id.0].as_mut() {
            Some(entry) => entry,
            None => unreachable!("recency chain links to free slot {}", id.0),
        }
    }
}

// == Iterator ==
/// Newest-to-oldest walk over an [`OrderedIndex`].
pub struct Iter<'a, K, V> {
    index: &'a OrderedIndex<K, V>,
    cursor: Option<EntryId>,
    remaining: usize,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = &'a Entry<K, V>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let entry = self.index.slots.get(self.cursor?.0)?.as_ref()?;
        self.remaining -= 1;
        self.cursor = Some(entry.next);
        Some(entry)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    fn keys(index: &OrderedIndex<String, i32>) -> Vec<String> {
        index.iter().map(|entry| entry.key.clone()).collect()
    }

    fn oldest_key(index: &OrderedIndex<String, i32>) -> Option<String> {
        index.oldest().map(|entry| entry.key.clone())
    }

    /// Walks `next` and `previous` from the newest entry and checks both
    /// directions close the cycle after exactly `len` steps.
    fn assert_circular(index: &OrderedIndex<String, i32>) {
        let Some(start) = index.newest() else {
            assert_eq!(index.len(), 0);
            return;
        };
        let start_id = index.map[&start.key];

        let mut forward = start_id;
        let mut backward = start_id;
        for step in 1..=index.len() {
            forward = index.entry(forward).unwrap().next();
            backward = index.entry(backward).unwrap().previous();
            if step < index.len() {
                assert_ne!(forward, start_id, "next cycle closed early");
                assert_ne!(backward, start_id, "previous cycle closed early");
            }
        }
        assert_eq!(forward, start_id);
        assert_eq!(backward, start_id);
    }

    #[test]
    fn test_index_new() {
        let index: OrderedIndex<String, i32> = OrderedIndex::new();
        assert!(index.is_empty());
        assert_eq!(index.len(), 0);
        assert!(index.oldest().is_none());
        assert!(index.newest().is_none());
    }

    #[test]
    fn test_add_single_entry_links_to_itself() {
        let mut index = OrderedIndex::new();
        let entry = index.add("a".to_string(), 1).unwrap();
        let (next, previous) = (entry.next(), entry.previous());

        assert_eq!(next, previous);
        assert_eq!(index.entry(next).unwrap().key, "a");
        assert_eq!(oldest_key(&index), Some("a".to_string()));
        assert_circular(&index);
    }

    #[test]
    fn test_add_orders_newest_first() {
        let mut index = OrderedIndex::new();
        index.add("a".to_string(), 1).unwrap();
        index.add("b".to_string(), 2).unwrap();
        index.add("c".to_string(), 3).unwrap();

        assert_eq!(keys(&index), vec!["c", "b", "a"]);
        assert_eq!(oldest_key(&index), Some("a".to_string()));
        assert_eq!(index.newest().unwrap().key, "c");
        assert_circular(&index);
    }

    #[test]
    fn test_add_duplicate_key() {
        let mut index = OrderedIndex::new();
        index.add("a".to_string(), 1).unwrap();

        let result = index.add("a".to_string(), 2);
        assert!(matches!(result, Err(CacheError::DuplicateKey)));
        assert_eq!(index.len(), 1);
        assert_eq!(index.get("a").unwrap().value, 1);
    }

    #[test]
    fn test_get_does_not_reorder() {
        let mut index = OrderedIndex::new();
        index.add("a".to_string(), 1).unwrap();
        index.add("b".to_string(), 2).unwrap();

        assert_eq!(index.get("a").unwrap().value, 1);
        assert_eq!(oldest_key(&index), Some("a".to_string()));
        assert!(index.get("missing").is_none());
    }

    #[test]
    fn test_remove_middle() {
        let mut index = OrderedIndex::new();
        index.add("a".to_string(), 1).unwrap();
        index.add("b".to_string(), 2).unwrap();
        index.add("c".to_string(), 3).unwrap();

        assert_eq!(index.remove("b"), Some(("b".to_string(), 2)));
        assert_eq!(keys(&index), vec!["c", "a"]);
        assert_circular(&index);
    }

    #[test]
    fn test_remove_newest_promotes_next() {
        let mut index = OrderedIndex::new();
        index.add("a".to_string(), 1).unwrap();
        index.add("b".to_string(), 2).unwrap();
        index.add("c".to_string(), 3).unwrap();

        index.remove("c");
        assert_eq!(index.newest().unwrap().key, "b");
        assert_eq!(oldest_key(&index), Some("a".to_string()));
        assert_circular(&index);
    }

    #[test]
    fn test_remove_oldest() {
        let mut index = OrderedIndex::new();
        index.add("a".to_string(), 1).unwrap();
        index.add("b".to_string(), 2).unwrap();
        index.add("c".to_string(), 3).unwrap();

        index.remove("a");
        assert_eq!(oldest_key(&index), Some("b".to_string()));
        assert_circular(&index);
    }

    #[test]
    fn test_remove_from_two_entries_leaves_self_linked_survivor() {
        let mut index = OrderedIndex::new();
        index.add("a".to_string(), 1).unwrap();
        index.add("b".to_string(), 2).unwrap();

        index.remove("b");

        let survivor = index.newest().unwrap();
        let id = index.map["a"];
        assert_eq!(survivor.key, "a");
        assert_eq!(survivor.next(), id);
        assert_eq!(survivor.previous(), id);
        assert_eq!(oldest_key(&index), Some("a".to_string()));

        // Chain stays sound for later inserts
        index.add("c".to_string(), 3).unwrap();
        index.add("d".to_string(), 4).unwrap();
        assert_eq!(keys(&index), vec!["d", "c", "a"]);
        assert_circular(&index);
    }

    #[test]
    fn test_remove_last_entry_empties_index() {
        let mut index = OrderedIndex::new();
        index.add("a".to_string(), 1).unwrap();

        assert_eq!(index.remove("a"), Some(("a".to_string(), 1)));
        assert!(index.is_empty());
        assert!(index.newest().is_none());
        assert!(index.oldest().is_none());
    }

    #[test]
    fn test_remove_nonexistent_key() {
        let mut index = OrderedIndex::new();
        index.add("a".to_string(), 1).unwrap();

        assert_eq!(index.remove("missing"), None);
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn test_remove_then_readd_moves_to_newest() {
        let mut index = OrderedIndex::new();
        index.add("a".to_string(), 1).unwrap();
        index.add("b".to_string(), 2).unwrap();
        index.add("c".to_string(), 3).unwrap();

        let (key, value) = index.remove("a").unwrap();
        index.add(key, value).unwrap();

        assert_eq!(keys(&index), vec!["a", "c", "b"]);
        assert_eq!(oldest_key(&index), Some("b".to_string()));
        assert_circular(&index);
    }

    #[test]
    fn test_slots_are_recycled() {
        let mut index = OrderedIndex::with_capacity(2);
        for round in 0..10 {
            index.add(format!("k{round}"), round).unwrap();
            if index.len() > 2 {
                let oldest = oldest_key(&index).unwrap();
                index.remove(&oldest);
            }
        }

        assert_eq!(index.len(), 2);
        assert!(index.slots.len() <= 3);
        assert_eq!(keys(&index), vec!["k9", "k8"]);
    }

    #[test]
    fn test_clear() {
        let mut index = OrderedIndex::new();
        index.add("a".to_string(), 1).unwrap();
        index.add("b".to_string(), 2).unwrap();

        index.clear();
        assert!(index.is_empty());
        assert_eq!(index.iter().count(), 0);
        index.add("a".to_string(), 3).unwrap();
        assert_eq!(index.get("a").unwrap().value, 3);
    }
}
