//! TTL Expiration Task
//!
//! Background task that fires a shared cache's expiration timers as their
//! deadlines arrive.

use std::hash::Hash;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{info, trace};

use crate::cache::{Clock, SharedCache};

/// How long to sleep with no pending timers when the cache has no ttl.
const IDLE_INTERVAL: Duration = Duration::from_secs(1);

/// Spawns a background task that runs the cache's due expiration checks.
///
/// Each round takes the write lock, runs every due check, reads the next
/// deadline and releases the lock before sleeping, so checks never
/// interleave with `set`/`get`/`remove` on the same cache. With no timers
/// pending the task sleeps for one ttl: any timer scheduled meanwhile is due
/// no earlier than that.
///
/// # Returns
/// A JoinHandle for the spawned task; abort it to stop expiration.
///
/// # Example
/// ```ignore
/// let cache = Cache::new(1000, Some(Duration::from_millis(500)))?.into_shared();
/// let expiration_handle = spawn_expiration_task(cache.clone());
/// // Later, during shutdown:
/// expiration_handle.abort();
/// ```
pub fn spawn_expiration_task<K, V, C>(cache: SharedCache<K, V, C>) -> JoinHandle<()>
where
    K: Hash + Eq + Clone + Send + Sync + 'static,
    V: Send + Sync + 'static,
    C: Clock,
{
    tokio::spawn(async move {
        {
            let guard = cache.read().await;
            info!(
                capacity = guard.capacity(),
                ttl_ms = guard.ttl().map(|ttl| ttl.as_millis() as u64),
                "Starting TTL expiration task"
            );
        }

        loop {
            let wait = {
                let mut guard = cache.write().await;
                let expired = guard.run_pending_timers();
                if expired > 0 {
                    info!("TTL expiration: removed {} expired entries", expired);
                }

                match guard.next_timer_deadline() {
                    Some(deadline) => deadline.saturating_duration_since(guard.now()),
                    None => guard.ttl().unwrap_or(IDLE_INTERVAL),
                }
            };

            trace!(wait_ms = wait.as_millis() as u64, "TTL expiration: sleeping");
            tokio::time::sleep(wait).await;
        }
    })
}
