//! Eviction Task
//!
//! Background task that periodically removes cache entries nobody has
//! subscribed to for longer than the store's grace period.

use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::CacheStore;

/// Spawns a background task that periodically evicts idle cache entries.
///
/// The task runs in an infinite loop, sleeping for `interval` between
/// sweeps. Entries with a fetch in flight are left alone until it resolves.
///
/// # Returns
/// A JoinHandle for the spawned task, which can be used to abort the task
/// on shutdown.
///
/// # Example
/// ```ignore
/// let handle = spawn_eviction_task(store.clone(), Duration::from_secs(1));
/// // Later, during shutdown:
/// handle.abort();
/// ```
pub fn spawn_eviction_task(store: CacheStore, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!("Starting eviction task with interval of {:?}", interval);

        loop {
            tokio::time::sleep(interval).await;

            let removed = store.evict_idle();
            if removed > 0 {
                info!("Eviction: removed {} idle entries", removed);
            } else {
                debug!("Eviction: no idle entries found");
            }
        }
    })
}
