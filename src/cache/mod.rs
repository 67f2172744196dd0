//! Cache Module
//!
//! Provides the fixed-capacity in-memory cache with LRU eviction.

mod entry;
mod lru;
mod shared;
mod stats;
mod store;


// Re-export public types
pub use entry::CacheEntry;
pub use shared::SharedCache;
pub use stats::CacheStats;
pub use store::LruCache;
