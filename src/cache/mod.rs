//! Cache Module
//!
//! Provides the bounded response cache with TTL expiration and
//! insertion-order eviction.

mod clock;
mod entry;
mod order;
mod stats;
mod store;


use serde_json::Value;

// Re-export public types
pub use clock::{Clock, ManualClock, SystemClock};
pub use entry::CacheEntry;
pub use order::InsertionOrder;
pub use stats::CacheStats;
pub use store::BoundedExpiringCache;

// == Response Cache ==
/// The cache seam used by the lookup client.
///
/// Implementations must be safe to call from concurrent lookups and must
/// treat expired entries as absent.
pub trait ResponseCache: Send + Sync {
    /// Returns the payload stored under `key`, if still valid.
    fn get(&self, key: &str) -> Option<Value>;

    /// Stores `value` under `key`, replacing any previous payload.
    fn set(&self, key: &str, value: Value);
}

impl ResponseCache for BoundedExpiringCache<Value> {
    fn get(&self, key: &str) -> Option<Value> {
        BoundedExpiringCache::get(self, key)
    }

    fn set(&self, key: &str, value: Value) {
        BoundedExpiringCache::set(self, key, value)
    }
}
