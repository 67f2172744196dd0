//! Shared Cache Module
//!
//! Wraps the cache engine behind a single mutex so connection tasks can share it.

use std::sync::Arc;

use tokio::sync::{Mutex, MutexGuard};

use crate::cache::{CacheStats, LruCache};
use crate::error::Result;

// == Shared Cache ==
/// Cloneable handle to the one cache instance of the server.
///
/// Each method locks exactly once for a single cache operation. A `get`
/// reorders the recency list, so reads take the same exclusive lock as writes.
#[derive(Debug, Clone)]
pub struct SharedCache {
    inner: Arc<Mutex<LruCache>>,
}

impl SharedCache {
    /// Wraps an existing cache.
    pub fn new(cache: LruCache) -> Self {
        Self {
            inner: Arc::new(Mutex::new(cache)),
        }
    }

    /// Creates a shared cache with the given capacity.
    pub fn with_capacity(capacity: usize) -> Result<Self> {
        LruCache::new(capacity).map(Self::new)
    }

    /// Acquires the cache lock for one operation.
    ///
    /// Drop the guard before any network I/O.
    pub async fn lock(&self) -> MutexGuard<'_, LruCache> {
        self.inner.lock().await
    }

    pub async fn get(&self, key: &str) -> Option<String> {
        self.lock().await.get(key)
    }

    pub async fn set(&self, key: String, value: String) -> Option<String> {
        self.lock().await.set(key, value)
    }

    pub async fn delete(&self, key: &str) -> bool {
        self.lock().await.delete(key)
    }

    pub async fn size(&self) -> usize {
        self.lock().await.len()
    }

    pub async fn capacity(&self) -> usize {
        self.lock().await.capacity()
    }

    pub async fn stats(&self) -> CacheStats {
        self.lock().await.stats()
    }
}
