//! Purge Task
//!
//! Background task that periodically drops entries whose values were reclaimed.

use std::hash::Hash;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::SharedCache;
use crate::error::{CacheError, Result};

/// Spawns a background task that periodically purges reclaimed entries.
///
/// Entries are never removed by the cache on its own; this task is the
/// explicit purge for long-lived caches with many one-off keys. It runs in an
/// infinite loop, sleeping for the specified interval between runs.
///
/// # Arguments
/// * `cache` - Shared handle to the cache
/// * `purge_interval_secs` - Interval in seconds between purge runs
///
/// # Returns
/// A JoinHandle for the spawned task, which can be used to abort it.
///
/// # Errors
/// `CacheError::InvalidConfig` if the interval is zero.
///
/// # Example
/// ```ignore
/// let cache = SharedCache::from_config(&config);
/// let purge_handle = spawn_purge_task(cache.clone(), config.purge_interval)?;
/// // Later, during shutdown:
/// purge_handle.abort();
/// ```
pub fn spawn_purge_task<K, V>(
    cache: SharedCache<K, V>,
    purge_interval_secs: u64,
) -> Result<JoinHandle<()>>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
    V: Send + Sync + 'static,
{
    spawn_purge_task_every(cache, Duration::from_secs(purge_interval_secs))
}

/// Same as [`spawn_purge_task`] with a sub-second interval.
pub fn spawn_purge_task_every<K, V>(
    cache: SharedCache<K, V>,
    interval: Duration,
) -> Result<JoinHandle<()>>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
    V: Send + Sync + 'static,
{
    if interval.is_zero() {
        return Err(CacheError::InvalidConfig(
            "purge interval must be non-zero".to_string(),
        ));
    }

    Ok(tokio::spawn(async move {
        info!("Starting purge task with interval of {:?}", interval);

        loop {
            tokio::time::sleep(interval).await;

            let removed = cache.purge_reclaimed();

            if removed > 0 {
                info!("Purge: removed {} reclaimed entries", removed);
            } else {
                debug!("Purge: no reclaimed entries found");
            }
        }
    }))
}
