//! Cache Store Module
//!
//! Thread-safe TTL cache: a `HashMap` behind an async `RwLock`, shared with a
//! background sweep worker that evicts expired entries.

use std::borrow::Borrow;
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::debug;

use crate::cache::{CacheEntry, CacheStats, CacheStatsSnapshot};
use crate::tasks::spawn_sweep_task;

// == Entry Store ==
/// The shared state behind a [`TtlCache`].
///
/// The cache owns the only strong reference; the sweep worker holds a `Weak`
/// and upgrades it once per tick.
#[derive(Debug)]
pub struct EntryStore<K, V> {
    entries: RwLock<HashMap<K, CacheEntry<V>>>,
    stats: CacheStats,
}

impl<K, V> EntryStore<K, V>
where
    K: Eq + Hash,
{
    pub(crate) fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            stats: CacheStats::new(),
        }
    }

    // == Cleanup Expired ==
    /// Removes all expired entries from the store.
    ///
    /// Returns the number of entries removed.
    pub async fn cleanup_expired(&self) -> usize {
        let now = Instant::now();
        let mut entries = self.entries.write().await;

        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired_at(now));
        let removed = before - entries.len();

        self.stats.record_evictions(removed);
        removed
    }

    /// Number of entries physically present, expired or not.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }
}

// == TTL Cache ==
/// Key/value cache whose entries expire a fixed `ttl` after they were set.
///
/// Expired entries are never returned by [`TtlCache::get`], but they stay in
/// memory until the sweep worker started by [`TtlCache::start_sweep`] removes
/// them. Dropping the cache aborts that worker.
pub struct TtlCache<K, V> {
    store: Arc<EntryStore<K, V>>,
    ttl: Duration,
    sweeper: Mutex<Option<JoinHandle<()>>>,
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash + Send + Sync + 'static,
    V: Send + Sync + 'static,
{
    // == Constructor ==
    /// Creates an empty cache whose entries live for `ttl`.
    ///
    /// A zero `ttl` is accepted and makes every entry expire immediately.
    pub fn new(ttl: Duration) -> Self {
        Self {
            store: Arc::new(EntryStore::new()),
            ttl,
            sweeper: Mutex::new(None),
        }
    }

    /// The expiry duration applied on every `set`.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    // == Get ==
    /// Returns the value for `key` if it is present and not expired.
    ///
    /// Takes a read lock only, so concurrent lookups do not serialize.
    pub async fn get<Q>(&self, key: &Q) -> Option<Arc<V>>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let entries = self.store.entries.read().await;
        match entries.get(key) {
            Some(entry) if !entry.is_expired() => {
                self.store.stats.record_hit();
                Some(Arc::clone(&entry.value))
            }
            _ => {
                self.store.stats.record_miss();
                None
            }
        }
    }

    // == Set ==
    /// Inserts or overwrites the entry for `key`, expiring `ttl` from now.
    pub async fn set(&self, key: K, value: impl Into<Arc<V>>) {
        let entry = CacheEntry::new(value.into(), self.ttl);
        self.store.entries.write().await.insert(key, entry);
        self.store.stats.record_store();
    }

    // == Cleanup Expired ==
    /// Runs one sweep pass on the calling task. Returns the number removed.
    pub async fn cleanup_expired(&self) -> usize {
        self.store.cleanup_expired().await
    }

    // == Start Sweep ==
    /// Spawns the background sweep worker, ticking every `interval`.
    ///
    /// No-op while a worker is already running, so there is never more than
    /// one. Must be called from within a Tokio runtime.
    pub fn start_sweep(&self, interval: Duration) {
        let mut slot = self.sweeper.lock().unwrap_or_else(PoisonError::into_inner);

        if slot.as_ref().is_some_and(|handle| !handle.is_finished()) {
            debug!("Sweep worker already running, ignoring start request");
            return;
        }

        *slot = Some(spawn_sweep_task(Arc::downgrade(&self.store), interval));
    }

    // == Stop Sweep ==
    /// Aborts the sweep worker. Safe to call repeatedly or when none runs.
    pub fn stop_sweep(&self) {
        let handle = self
            .sweeper
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();

        if let Some(handle) = handle {
            handle.abort();
            debug!("Sweep worker stopped");
        }
    }

    /// Returns true while a sweep worker is alive.
    pub fn is_sweeping(&self) -> bool {
        self.sweeper
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub async fn stats(&self) -> CacheStatsSnapshot {
        let total_entries = self.store.len().await;
        self.store.stats.snapshot(total_entries)
    }

    // == Length ==
    /// Returns the number of entries physically held, including expired
    /// entries the sweep has not reached yet.
    pub async fn len(&self) -> usize {
        self.store.len().await
    }

    // == Is Empty ==
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    #[cfg(test)]
    pub(crate) fn downgrade_store_for_testing(&self) -> std::sync::Weak<EntryStore<K, V>> {
        Arc::downgrade(&self.store)
    }
}

impl<K, V> Drop for TtlCache<K, V> {
    fn drop(&mut self) {
        let slot = self
            .sweeper
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner);

        if let Some(handle) = slot.take() {
            handle.abort();
        }
    }
}
