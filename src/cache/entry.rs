//! Cache Entry Module
//!
//! Defines the arena slot holding one key-value pair and its recency links.

// == Cache Entry ==
/// A single cached key-value pair linked into the recency list.
///
/// `prev` points toward the most recently used end (head),
/// `next` toward the least recently used end (tail).
#[derive(Debug, Clone, Default)]
pub struct CacheEntry {
    /// The cache key
    pub key: String,
    /// The stored value
    pub value: String,
    /// Arena index of the more recently used neighbor
    pub(crate) prev: usize,
    /// Arena index of the less recently used neighbor
    pub(crate) next: usize,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates an unlinked entry.
    pub fn new(key: String, value: String) -> Self {
        Self {
            key,
            value,
            prev: 0,
            next: 0,
        }
    }

    /// Creates an empty anchor slot with the given links.
    pub(crate) fn sentinel(prev: usize, next: usize) -> Self {
        Self {
            key: String::new(),
            value: String::new(),
            prev,
            next,
        }
    }

    /// Replaces the value in place, returning the previous one.
    pub fn replace_value(&mut self, value: String) -> String {
        std::mem::replace(&mut self.value, value)
    }
}
