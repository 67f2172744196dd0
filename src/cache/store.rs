//! Cache Store Module
//!
//! Main cache engine combining a HashMap index with the arena recency list.

use std::collections::HashMap;

use crate::cache::lru::RecencyList;
use crate::cache::CacheStats;
use crate::error::{CacheError, Result};

/// Upper bound on slots reserved up front; larger caches grow on demand.
const PREALLOCATED_ENTRIES: usize = 1024;

// == LRU Cache ==
/// Fixed-capacity key-value cache with least-recently-used eviction.
///
/// Every operation is O(1): the index resolves a key to its arena slot and
/// recency changes are splices on the list.
#[derive(Debug)]
pub struct LruCache {
    /// Key to arena slot
    index: HashMap<String, usize>,
    /// Entries from most to least recently used
    order: RecencyList,
    /// Performance statistics
    stats: CacheStats,
    /// Maximum number of entries allowed
    capacity: usize,
}

impl LruCache {
    // == Constructor ==
    /// Creates an empty cache holding at most `capacity` entries.
    ///
    /// # Errors
    /// Returns `CacheError::InvalidCapacity` when `capacity` is 0.
    pub fn new(capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(CacheError::InvalidCapacity(capacity));
        }

        let reserved = capacity.min(PREALLOCATED_ENTRIES);
        Ok(Self {
            index: HashMap::with_capacity(reserved),
            order: RecencyList::with_capacity(reserved),
            stats: CacheStats::new(capacity),
            capacity,
        })
    }

    // == Get ==
    /// Retrieves a value by key and promotes the entry to most recent.
    ///
    /// Returns None without touching the recency order if the key is absent.
    pub fn get(&mut self, key: &str) -> Option<String> {
        match self.index.get(key) {
            Some(&idx) => {
                self.order.move_to_front(idx);
                self.stats.record_hit();
                Some(self.order.get(idx).value.clone())
            }
            None => {
                self.stats.record_miss();
                None
            }
        }
    }

    // == Set ==
    /// Stores a key-value pair as the most recent entry.
    ///
    /// Overwriting an existing key never changes the size. Inserting a new
    /// key into a full cache evicts exactly one entry, the least recently
    /// used, whose key is returned.
    pub fn set(&mut self, key: String, value: String) -> Option<String> {
        if let Some(&idx) = self.index.get(&key) {
            self.order.get_mut(idx).replace_value(value);
            self.order.move_to_front(idx);
            return None;
        }

        let idx = self.order.push_front(key.clone(), value);
        self.index.insert(key, idx);

        if self.index.len() > self.capacity {
            return self.evict_lru();
        }
        None
    }

    // == Delete ==
    /// Removes an entry by key.
    ///
    /// Returns false and leaves the cache untouched if the key is absent.
    pub fn delete(&mut self, key: &str) -> bool {
        match self.index.remove(key) {
            Some(idx) => {
                self.order.remove(idx);
                true
            }
            None => false,
        }
    }

    // == Peek ==
    /// Returns a value without promoting it or recording a hit/miss.
    pub fn peek(&self, key: &str) -> Option<&str> {
        self.index
            .get(key)
            .map(|&idx| self.order.get(idx).value.as_str())
    }

    // == Contains ==
    /// Checks for a key without promoting it or recording a hit/miss.
    pub fn contains(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    // == Keys ==
    /// Returns all keys ordered from most to least recently used.
    pub fn keys(&self) -> Vec<&str> {
        self.order.iter().map(|entry| entry.key.as_str()).collect()
    }

    // == Clear ==
    /// Removes every entry. Statistics are kept.
    pub fn clear(&mut self) {
        self.index.clear();
        self.order.clear();
    }

    // == Stats ==
    /// Returns a snapshot of the cache statistics.
    pub fn stats(&self) -> CacheStats {
        self.stats.snapshot(self.len())
    }

    // == Length ==
    /// Returns the current number of entries in the cache.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    // == Capacity ==
    /// Returns the maximum number of entries the cache holds.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    fn evict_lru(&mut self) -> Option<String> {
        let evicted = self.order.pop_back()?;
        self.index.remove(&evicted.key);
        self.stats.record_eviction();
        Some(evicted.key)
    }

    /// Panics unless the index and the recency list describe the same entries.
    #[cfg(test)]
    pub(crate) fn assert_invariants(&self) {
        let order = self.order.assert_well_formed();

        assert!(self.len() <= self.capacity, "size exceeds capacity");
        assert_eq!(order.len(), self.index.len(), "index and list sizes differ");
        for idx in order {
            let key = &self.order.get(idx).key;
            assert_eq!(self.index.get(key), Some(&idx), "orphaned entry {key:?}");
        }
    }
}
