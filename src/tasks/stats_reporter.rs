//! Stats Reporter Task
//!
//! Background task that periodically logs cache statistics.

use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::info;

use crate::cache::SharedCache;

/// Spawns a background task that logs cache statistics every interval.
///
/// Each tick takes the cache lock once to snapshot the statistics and
/// releases it before logging. The task never mutates the cache.
///
/// # Arguments
/// * `cache` - Shared handle to the cache
/// * `interval_secs` - Interval in seconds between reports
///
/// # Returns
/// A JoinHandle for the spawned task, which can be used to abort the task
/// during graceful shutdown.
///
/// # Example
/// ```ignore
/// let cache = SharedCache::with_capacity(100)?;
/// let reporter = spawn_stats_reporter(cache.clone(), 60);
/// // Later, during shutdown:
/// reporter.abort();
/// ```
pub fn spawn_stats_reporter(cache: SharedCache, interval_secs: u64) -> JoinHandle<()> {
    let interval = Duration::from_secs(interval_secs.max(1));

    tokio::spawn(async move {
        info!(
            "Starting stats reporter with interval of {} seconds",
            interval.as_secs()
        );

        loop {
            tokio::time::sleep(interval).await;

            let stats = cache.stats().await;
            info!(
                "Cache stats: size={}/{}, hits={}, misses={}, evictions={}, hit_rate={:.2}",
                stats.size,
                stats.capacity,
                stats.hits,
                stats.misses,
                stats.evictions,
                stats.hit_rate
            );
        }
    })
}
