//! Cache Entry Module
//!
//! Defines the structure for individual cache entries with insertion timestamps.

// == Cache Entry ==
/// Represents a single cached response with its insertion time.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry<V> {
    /// The stored value
    pub value: V,
    /// Insertion timestamp (clock milliseconds)
    pub inserted_at: u64,
}

impl<V> CacheEntry<V> {
    // == Constructor ==
    /// Creates a new cache entry stamped with `now_ms`.
    pub fn new(value: V, now_ms: u64) -> Self {
        Self {
            value,
            inserted_at: now_ms,
        }
    }

    // == Age ==
    /// Milliseconds elapsed since insertion. A clock behind the stamp reads as zero.
    pub fn age_ms(&self, now_ms: u64) -> u64 {
        now_ms.saturating_sub(self.inserted_at)
    }

    // == Is Expired ==
    /// Checks if the entry has outlived `ttl_ms`.
    ///
    /// Boundary condition: the entry is valid only while its age is strictly
    /// below the TTL, so it expires at exactly `inserted_at + ttl_ms`. A zero
    /// TTL therefore expires every entry immediately.
    pub fn is_expired(&self, now_ms: u64, ttl_ms: u64) -> bool {
        self.age_ms(now_ms) >= ttl_ms
    }

    // == Time To Live ==
    /// Returns remaining lifetime in milliseconds, `0` once expired.
    #[cfg(test)]
    pub fn ttl_remaining_ms(&self, now_ms: u64, ttl_ms: u64) -> u64 {
        ttl_ms.saturating_sub(self.age_ms(now_ms))
    }
}
