//! TTL Sweep Task
//!
//! Background task that periodically removes expired cache entries.

use std::hash::Hash;
use std::sync::Weak;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, info};

use crate::cache::EntryStore;

/// Shortest period the worker will tick at; `tokio::time::interval` panics on zero.
const MIN_SWEEP_INTERVAL: Duration = Duration::from_millis(1);

/// Spawns a background task that evicts expired entries every `interval`.
///
/// The task only holds a `Weak` reference to the store. Each tick upgrades it
/// for the duration of one pass; once the owning cache is gone the upgrade
/// fails and the task ends by itself. The returned handle lets the owner
/// abort it earlier.
///
/// The first pass runs one full `interval` after the call.
///
/// # Example
/// ```ignore
/// let handle = spawn_sweep_task(Arc::downgrade(&store), Duration::from_secs(60));
/// // Later, during shutdown:
/// handle.abort();
/// ```
pub fn spawn_sweep_task<K, V>(store: Weak<EntryStore<K, V>>, interval: Duration) -> JoinHandle<()>
where
    K: Eq + Hash + Send + Sync + 'static,
    V: Send + Sync + 'static,
{
    let period = interval.max(MIN_SWEEP_INTERVAL);
    let mut ticker = time::interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    tokio::spawn(async move {
        info!("Starting TTL sweep task with interval of {:?}", period);

        loop {
            ticker.tick().await;

            let Some(store) = store.upgrade() else {
                debug!("Cache dropped, TTL sweep task exiting");
                break;
            };

            let removed = store.cleanup_expired().await;
            let remaining = store.len().await;
            drop(store);

            if removed > 0 {
                info!(
                    "TTL sweep: removed {} expired entries, {} remaining",
                    removed, remaining
                );
            } else {
                debug!("TTL sweep: no expired entries found");
            }
        }
    })
}
