//! Cache Store Module
//!
//! Bounded response cache combining HashMap storage with insertion-order
//! eviction and lazy TTL expiration.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tracing::trace;

use crate::cache::{CacheEntry, CacheStats, Clock, InsertionOrder, SystemClock};
use crate::config::Config;
use crate::error::{IpinfoError, Result};

#[derive(Debug)]
struct Inner<V> {
    entries: HashMap<String, CacheEntry<V>>,
    order: InsertionOrder,
    stats: CacheStats,
}

impl<V> Inner<V> {
    fn remove(&mut self, key: &str) -> bool {
        let removed = self.entries.remove(key).is_some();
        if removed {
            self.order.remove(key);
        }
        self.stats.set_total_entries(self.entries.len());
        removed
    }
}

// == Bounded Expiring Cache ==
/// Key-value store holding at most `max_size` entries, each valid for `ttl`
/// after its insertion.
///
/// - Expired entries read as absent and are dropped on the `get` that finds them.
/// - Inserting a new key into a full cache evicts the least recently inserted key.
/// - Overwriting a key never evicts; it refreshes the timestamp and makes the
///   key the most recently inserted.
///
/// All state sits behind one mutex, so every method takes `&self` and the
/// cache can be shared between tasks through an `Arc`.
#[derive(Debug)]
pub struct BoundedExpiringCache<V> {
    inner: Mutex<Inner<V>>,
    max_size: usize,
    ttl_ms: u64,
    clock: Arc<dyn Clock>,
}

impl<V: Clone> BoundedExpiringCache<V> {
    // == Constructor ==
    /// Creates a cache backed by the system clock.
    ///
    /// # Errors
    /// `Configuration` if `max_size` is zero.
    pub fn new(max_size: usize, ttl: Duration) -> Result<Self> {
        Self::with_clock(max_size, ttl, Arc::new(SystemClock))
    }

    /// Creates a cache reading time from `clock`.
    ///
    /// A TTL too long to count in milliseconds is clamped to `u64::MAX` ms.
    pub fn with_clock(max_size: usize, ttl: Duration, clock: Arc<dyn Clock>) -> Result<Self> {
        if max_size == 0 {
            return Err(IpinfoError::Configuration(
                "cache max_size must be greater than zero".to_string(),
            ));
        }

        Ok(Self {
            inner: Mutex::new(Inner {
                entries: HashMap::with_capacity(max_size.min(4096)),
                order: InsertionOrder::new(),
                stats: CacheStats::new(),
            }),
            max_size,
            ttl_ms: u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX),
            clock,
        })
    }

    /// Creates a cache sized from the client configuration.
    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(config.max_size, Duration::from_secs(config.ttl))
    }

    // == Get ==
    /// Retrieves a value by key.
    ///
    /// Returns `None` if the key is absent or its entry has expired; an
    /// expired entry is removed and counted as a miss.
    pub fn get(&self, key: &str) -> Option<V> {
        let now = self.clock.now_ms();
        let mut guard = self.inner.lock();
        let inner = &mut *guard;

        let expired = match inner.entries.get(key) {
            None => {
                inner.stats.record_miss();
                return None;
            }
            Some(entry) => entry.is_expired(now, self.ttl_ms),
        };

        if expired {
            inner.remove(key);
            inner.stats.record_expirations(1);
            inner.stats.record_miss();
            trace!(key, "cache entry expired");
            return None;
        }

        inner.stats.record_hit();
        inner.entries.get(key).map(|entry| entry.value.clone())
    }

    // == Set ==
    /// Stores a value, stamping it with the current time.
    ///
    /// If the key is new and the cache is full, exactly one entry (the least
    /// recently inserted) is evicted first.
    pub fn set(&self, key: impl Into<String>, value: V) {
        let key = key.into();
        let now = self.clock.now_ms();
        let mut inner = self.inner.lock();

        let is_overwrite = inner.entries.contains_key(&key);
        if !is_overwrite && inner.entries.len() >= self.max_size {
            if let Some(evicted) = inner.order.pop_oldest() {
                inner.entries.remove(&evicted);
                inner.stats.record_eviction();
                trace!(key = %evicted, "cache entry evicted");
            }
        }

        inner.entries.insert(key.clone(), CacheEntry::new(value, now));
        inner.order.record(&key);
        let len = inner.entries.len();
        inner.stats.set_total_entries(len);
    }

    // == Delete ==
    /// Removes an entry by key. Returns true if it was present.
    pub fn delete(&self, key: &str) -> bool {
        self.inner.lock().remove(key)
    }

    /// Drops every entry. Counters are kept.
    pub fn clear(&self) {
        let mut inner = self.inner.lock();
        inner.entries.clear();
        inner.order.clear();
        inner.stats.set_total_entries(0);
    }

    // == Cleanup Expired ==
    /// Removes all expired entries from the cache.
    ///
    /// Returns the number of entries removed.
    pub fn cleanup_expired(&self) -> usize {
        let now = self.clock.now_ms();
        let mut inner = self.inner.lock();

        let expired_keys: Vec<String> = inner
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_expired(now, self.ttl_ms))
            .map(|(key, _)| key.clone())
            .collect();

        for key in &expired_keys {
            inner.remove(key);
        }

        inner.stats.record_expirations(expired_keys.len() as u64);
        expired_keys.len()
    }

    // == Stats ==
    /// Returns a snapshot of the cache counters.
    pub fn stats(&self) -> CacheStats {
        self.inner.lock().stats.clone()
    }

    /// Number of entries physically held, including expired ones not yet purged.
    pub fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().entries.is_empty()
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }

    pub fn ttl(&self) -> Duration {
        Duration::from_millis(self.ttl_ms)
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::ManualClock;

    fn manual_cache(max_size: usize, ttl_secs: u64) -> (BoundedExpiringCache<i32>, ManualClock) {
        let clock = ManualClock::new();
        let cache = BoundedExpiringCache::with_clock(
            max_size,
            Duration::from_secs(ttl_secs),
            Arc::new(clock.clone()),
        )
        .unwrap();
        (cache, clock)
    }

    #[test]
    fn test_store_new() {
        let cache: BoundedExpiringCache<i32> =
            BoundedExpiringCache::new(100, Duration::from_secs(300)).unwrap();
        assert!(cache.is_empty());
        assert_eq!(cache.max_size(), 100);
        assert_eq!(cache.ttl(), Duration::from_secs(300));
    }

    #[test]
    fn test_zero_max_size_rejected() {
        let result = BoundedExpiringCache::<i32>::new(0, Duration::from_secs(1));
        assert!(matches!(result, Err(IpinfoError::Configuration(_))));
    }

    #[test]
    fn test_from_config() {
        let config = Config {
            max_size: 7,
            ttl: 60,
            ..Config::default()
        };
        let cache = BoundedExpiringCache::<i32>::from_config(&config).unwrap();
        assert_eq!(cache.max_size(), 7);
        assert_eq!(cache.ttl(), Duration::from_secs(60));
    }

    #[test]
    fn test_store_set_and_get() {
        let (cache, _) = manual_cache(100, 300);

        cache.set("key1", 1);

        assert_eq!(cache.get("key1"), Some(1));
        assert_eq!(cache.get("missing"), None);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_capacity_evicts_oldest_inserted() {
        let (cache, _) = manual_cache(2, 100);

        cache.set("a", 1);
        cache.set("b", 2);
        cache.set("c", 3);

        assert_eq!(cache.get("a"), None);
        assert_eq!(cache.get("b"), Some(2));
        assert_eq!(cache.get("c"), Some(3));
        assert_eq!(cache.stats().evictions, 1);
    }

    #[test]
    fn test_reads_do_not_protect_from_eviction() {
        let (cache, _) = manual_cache(2, 100);

        cache.set("a", 1);
        cache.set("b", 2);
        assert_eq!(cache.get("a"), Some(1));
        cache.set("c", 3);

        assert_eq!(cache.get("a"), None);
        assert_eq!(cache.get("b"), Some(2));
    }

    #[test]
    fn test_overwrite_never_evicts() {
        let (cache, _) = manual_cache(2, 100);

        cache.set("a", 1);
        cache.set("b", 2);
        cache.set("a", 10);

        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get("a"), Some(10));
        assert_eq!(cache.get("b"), Some(2));
        assert_eq!(cache.stats().evictions, 0);
    }

    #[test]
    fn test_overwrite_requeues_key() {
        let (cache, _) = manual_cache(2, 100);

        cache.set("a", 1);
        cache.set("b", 2);
        cache.set("a", 10);
        cache.set("c", 3);

        // "b" is now the least recently inserted
        assert_eq!(cache.get("b"), None);
        assert_eq!(cache.get("a"), Some(10));
        assert_eq!(cache.get("c"), Some(3));
    }

    #[test]
    fn test_ttl_expiration() {
        let (cache, clock) = manual_cache(10, 1);

        cache.set("a", 1);
        clock.advance(Duration::from_secs(2));

        assert_eq!(cache.get("a"), None);
    }

    #[test]
    fn test_ttl_boundary() {
        let (cache, clock) = manual_cache(10, 100);

        cache.set("a", 1);
        clock.advance(Duration::from_millis(99_999));
        assert_eq!(cache.get("a"), Some(1));

        clock.advance(Duration::from_millis(1));
        assert_eq!(cache.get("a"), None);
    }

    #[test]
    fn test_expired_entry_purged_on_get() {
        let (cache, clock) = manual_cache(10, 1);

        cache.set("a", 1);
        cache.set("b", 2);
        clock.advance(Duration::from_secs(1));
        assert_eq!(cache.len(), 2);

        assert_eq!(cache.get("a"), None);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.stats().expirations, 1);
    }

    #[test]
    fn test_overwrite_refreshes_timestamp() {
        let (cache, clock) = manual_cache(10, 10);

        cache.set("a", 1);
        clock.advance(Duration::from_secs(8));
        cache.set("a", 2);
        clock.advance(Duration::from_secs(8));

        assert_eq!(cache.get("a"), Some(2));
    }

    #[test]
    fn test_huge_ttl_saturates() {
        let clock = ManualClock::new();
        let cache = BoundedExpiringCache::with_clock(
            4,
            Duration::from_secs(18_446_744_073_709_552),
            Arc::new(clock.clone()),
        )
        .unwrap();
        assert_eq!(cache.ttl(), Duration::from_millis(u64::MAX));

        cache.set("a", 1);
        clock.advance(Duration::from_secs(1));
        assert_eq!(cache.get("a"), Some(1));

        let (cache, clock) = manual_cache(4, u64::MAX);
        cache.set("b", 2);
        clock.advance(Duration::from_secs(86_400 * 365));
        assert_eq!(cache.get("b"), Some(2));
    }

    #[test]
    fn test_zero_ttl_never_serves() {
        let (cache, _) = manual_cache(10, 0);
        cache.set("a", 1);
        assert_eq!(cache.get("a"), None);
    }

    #[test]
    fn test_store_delete() {
        let (cache, _) = manual_cache(10, 100);

        cache.set("a", 1);
        assert!(cache.delete("a"));
        assert!(!cache.delete("a"));
        assert!(cache.is_empty());
        assert_eq!(cache.get("a"), None);
    }

    #[test]
    fn test_delete_frees_capacity() {
        let (cache, _) = manual_cache(2, 100);

        cache.set("a", 1);
        cache.set("b", 2);
        cache.delete("a");
        cache.set("c", 3);

        assert_eq!(cache.get("b"), Some(2));
        assert_eq!(cache.stats().evictions, 0);
    }

    #[test]
    fn test_store_clear() {
        let (cache, _) = manual_cache(10, 100);

        cache.set("a", 1);
        cache.set("b", 2);
        cache.clear();

        assert!(cache.is_empty());
        assert_eq!(cache.stats().total_entries, 0);
    }

    #[test]
    fn test_store_stats() {
        let (cache, _) = manual_cache(10, 100);

        cache.set("a", 1);
        cache.get("a");
        cache.get("missing");

        let stats = cache.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.total_entries, 1);
    }

    #[test]
    fn test_store_cleanup_expired() {
        let (cache, clock) = manual_cache(10, 5);

        cache.set("old", 1);
        clock.advance(Duration::from_secs(3));
        cache.set("new", 2);
        clock.advance(Duration::from_secs(3));

        assert_eq!(cache.cleanup_expired(), 1);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("new"), Some(2));
    }

    #[test]
    fn test_concurrent_sets_respect_capacity() {
        let cache: Arc<BoundedExpiringCache<usize>> =
            Arc::new(BoundedExpiringCache::new(50, Duration::from_secs(300)).unwrap());

        let handles: Vec<_> = (0..8)
            .map(|t| {
                let cache = Arc::clone(&cache);
                std::thread::spawn(move || {
                    for i in 0..200 {
                        cache.set(format!("{}-{}", t, i), i);
                        assert!(cache.len() <= 50);
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(cache.len(), 50);
    }
}
