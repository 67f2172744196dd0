//! LRU List Module
//!
//! Arena-backed doubly linked list ordering entries by recency.
//!
//! Slots are addressed by index instead of references. Two fixed sentinel
//! slots bound the list so that linking and unlinking never deal with a
//! missing neighbor:
//!
//! ```text
//! HEAD <-> most recent <-> ... <-> least recent <-> TAIL
//! ```

use crate::cache::CacheEntry;

/// Arena index of the most-recent boundary sentinel.
pub(crate) const HEAD: usize = 0;
/// Arena index of the least-recent boundary sentinel.
pub(crate) const TAIL: usize = 1;

// == Recency List ==
/// Recency-ordered list of cache entries with O(1) splice operations.
#[derive(Debug)]
pub(crate) struct RecencyList {
    /// Entry arena; slots 0 and 1 are the sentinels
    slots: Vec<CacheEntry>,
    /// Indices of released slots available for reuse
    free: Vec<usize>,
    /// Number of linked data entries (sentinels excluded)
    len: usize,
}

impl RecencyList {
    // == Constructor ==
    /// Creates an empty list with room for `capacity` entries.
    pub fn with_capacity(capacity: usize) -> Self {
        let mut slots = Vec::with_capacity(capacity.saturating_add(2));
        slots.push(CacheEntry::sentinel(HEAD, TAIL));
        slots.push(CacheEntry::sentinel(HEAD, TAIL));

        Self {
            slots,
            free: Vec::new(),
            len: 0,
        }
    }

    // == Push Front ==
    /// Inserts a new entry at the most recent position and returns its slot.
    pub fn push_front(&mut self, key: String, value: String) -> usize {
        let entry = CacheEntry::new(key, value);
        let idx = match self.free.pop() {
            Some(idx) => {
                self.slots[idx] = entry;
                idx
            }
            None => {
                self.slots.push(entry);
                self.slots.len() - 1
            }
        };

        self.link_front(idx);
        self.len += 1;
        idx
    }

    // == Move To Front ==
    /// Promotes an existing entry to the most recent position.
    pub fn move_to_front(&mut self, idx: usize) {
        debug_assert!(idx > TAIL, "sentinels are never promoted");
        if self.slots[HEAD].next == idx {
            return;
        }
        self.unlink(idx);
        self.link_front(idx);
    }

    // == Remove ==
    /// Unlinks an entry, releases its slot and returns the entry.
    pub fn remove(&mut self, idx: usize) -> CacheEntry {
        debug_assert!(idx > TAIL, "sentinels are never removed");
        self.unlink(idx);
        self.len -= 1;
        self.free.push(idx);
        std::mem::take(&mut self.slots[idx])
    }

    // == Pop Back ==
    /// Removes and returns the least recently used entry.
    ///
    /// Returns None if the list is empty.
    pub fn pop_back(&mut self) -> Option<CacheEntry> {
        let idx = self.slots[TAIL].prev;
        if idx == HEAD {
            None
        } else {
            Some(self.remove(idx))
        }
    }

    /// Entry stored in slot `idx`.
    pub fn get(&self, idx: usize) -> &CacheEntry {
        &self.slots[idx]
    }

    /// Mutable access to the entry stored in slot `idx`.
    pub fn get_mut(&mut self, idx: usize) -> &mut CacheEntry {
        &mut self.slots[idx]
    }

    // == Length ==
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // == Clear ==
    /// Drops every entry and relinks the sentinels to each other.
    pub fn clear(&mut self) {
        self.slots.truncate(2);
        self.slots[HEAD].next = TAIL;
        self.slots[TAIL].prev = HEAD;
        self.free.clear();
        self.len = 0;
    }

    // == Iterate ==
    /// Walks entries from most to least recently used.
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            list: self,
            cursor: self.slots[HEAD].next,
        }
    }

    fn unlink(&mut self, idx: usize) {
        let prev = self.slots[idx].prev;
        let next = self.slots[idx].next;
        self.slots[prev].next = next;
        self.slots[next].prev = prev;
    }

    fn link_front(&mut self, idx: usize) {
        let first = self.slots[HEAD].next;
        self.slots[idx].prev = HEAD;
        self.slots[idx].next = first;
        self.slots[first].prev = idx;
        self.slots[HEAD].next = idx;
    }

    /// Walks the list both ways and returns the forward slot order.
    ///
    /// Panics on broken back-links, cycles, or a length mismatch.
    #[cfg(test)]
    pub(crate) fn assert_well_formed(&self) -> Vec<usize> {
        let mut order = Vec::with_capacity(self.len);
        let mut prev = HEAD;
        let mut cursor = self.slots[HEAD].next;

        while cursor != TAIL {
            assert!(
                order.len() < self.slots.len(),
                "cycle detected in recency list"
            );
            assert_eq!(self.slots[cursor].prev, prev, "broken back-link at {cursor}");
            order.push(cursor);
            prev = cursor;
            cursor = self.slots[cursor].next;
        }

        assert_eq!(self.slots[TAIL].prev, prev, "tail not linked to last entry");
        assert_eq!(order.len(), self.len, "linked entries differ from len");
        order
    }
}

// == Iterator ==
pub(crate) struct Iter<'a> {
    list: &'a RecencyList,
    cursor: usize,
}

impl<'a> Iterator for Iter<'a> {
    type Item = &'a CacheEntry;

    fn next(&mut self) -> Option<Self::Item> {
        if self.cursor == TAIL {
            return None;
        }
        let entry = &self.list.slots[self.cursor];
        self.cursor = entry.next;
        Some(entry)
    }
}
