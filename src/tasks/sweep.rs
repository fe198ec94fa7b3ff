//! Expiry Sweep Task
//!
//! Background task that periodically purges stale fast-tier entries, so
//! entries nobody reads again do not hold capacity until eviction.

use std::sync::{Arc, Weak};
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::CacheManager;

/// Spawns a background task that periodically purges expired entries.
///
/// The task only keeps a weak handle on the cache: it stops by itself once
/// the last `Arc<CacheManager>` is dropped. Owners should still abort the
/// returned handle on shutdown.
///
/// # Arguments
/// * `cache` - Shared cache manager
/// * `interval_secs` - Seconds between sweeps (at least 1)
///
/// # Example
/// ```ignore
/// let cache = Arc::new(CacheManager::new(CacheConfig::default()));
/// let sweep_handle = spawn_sweep_task(&cache, 1);
/// // Later, during shutdown:
/// sweep_handle.abort();
/// ```
pub fn spawn_sweep_task(cache: &Arc<CacheManager>, interval_secs: u64) -> JoinHandle<()> {
    let cache: Weak<CacheManager> = Arc::downgrade(cache);
    let interval = Duration::from_secs(interval_secs.max(1));

    tokio::spawn(async move {
        info!(
            "Starting expiry sweep task with interval of {} seconds",
            interval.as_secs()
        );

        loop {
            tokio::time::sleep(interval).await;

            let Some(cache) = cache.upgrade() else {
                info!("Cache dropped, stopping expiry sweep task");
                break;
            };

            let removed = cache.purge_expired().await;
            if removed > 0 {
                info!("Expiry sweep: removed {} expired entries", removed);
            } else {
                debug!("Expiry sweep: no expired entries found");
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::ManualClock;
    use crate::config::CacheConfig;

    fn cache_with_clock() -> (Arc<CacheManager>, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(0));
        let cache = CacheManager::new(CacheConfig::default()).with_clock(clock.clone());
        (Arc::new(cache), clock)
    }

    #[tokio::test]
    async fn test_sweep_task_removes_expired_entries() {
        let (cache, clock) = cache_with_clock();
        cache.set("expire_soon", "value", 1).await.unwrap();
        cache.set("long_lived", "value", 3600).await.unwrap();
        clock.advance(Duration::from_secs(2));

        let handle = spawn_sweep_task(&cache, 1);
        tokio::time::sleep(Duration::from_millis(1500)).await;

        assert!(!cache.contains("expire_soon").await, "Expired entry should have been swept");
        assert!(cache.contains("long_lived").await, "Valid entry should not be removed");
        assert_eq!(cache.stats().await.expirations, 1);

        handle.abort();
    }

    #[tokio::test]
    async fn test_sweep_task_stops_when_cache_dropped() {
        let (cache, _clock) = cache_with_clock();

        let handle = spawn_sweep_task(&cache, 1);
        drop(cache);

        tokio::time::sleep(Duration::from_millis(1500)).await;
        assert!(handle.is_finished(), "Task should stop once the cache is gone");
    }

    #[tokio::test]
    async fn test_sweep_task_can_be_aborted() {
        let (cache, _clock) = cache_with_clock();

        let handle = spawn_sweep_task(&cache, 1);
        handle.abort();

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(handle.is_finished(), "Task should be finished after abort");
    }
}
