//! TTL Cleanup Task
//!
//! Optional background task that periodically purges expired cache entries.
//! The cache never needs it for correctness, since expired entries already
//! read as absent. It only reclaims memory held by keys nobody reads again.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::BoundedExpiringCache;

/// Spawns a background task that periodically cleans up expired cache entries.
///
/// Must be called from within a tokio runtime. The returned handle can be
/// aborted during shutdown.
///
/// # Example
/// ```ignore
/// let cache = Arc::new(BoundedExpiringCache::new(4096, Duration::from_secs(86400))?);
/// let cleanup_handle = spawn_cleanup_task(cache.clone(), 60);
/// // Later, during shutdown:
/// cleanup_handle.abort();
/// ```
pub fn spawn_cleanup_task<V>(
    cache: Arc<BoundedExpiringCache<V>>,
    cleanup_interval_secs: u64,
) -> JoinHandle<()>
where
    V: Clone + Send + 'static,
{
    let interval = Duration::from_secs(cleanup_interval_secs.max(1));

    tokio::spawn(async move {
        info!(
            "Starting TTL cleanup task with interval of {} seconds",
            interval.as_secs()
        );

        loop {
            tokio::time::sleep(interval).await;

            let removed = cache.cleanup_expired();
            if removed > 0 {
                info!("TTL cleanup: removed {} expired entries", removed);
            } else {
                debug!("TTL cleanup: no expired entries found");
            }
        }
    })
}
