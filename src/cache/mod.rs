//! Cache Module
//!
//! Provides a generic in-memory cache with TTL expiration and a background
//! sweep of expired entries.

mod entry;
mod stats;
mod store;


// Re-export public types
pub use entry::CacheEntry;
pub use stats::{CacheStats, CacheStatsSnapshot};
pub use store::{EntryStore, TtlCache};
