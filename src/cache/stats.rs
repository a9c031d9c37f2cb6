//! Cache Statistics Module
//!
//! Tracks response cache counters: hits, misses, expirations and evictions.

use serde::Serialize;

// == Cache Stats ==
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CacheStats {
    /// Lookups answered from the cache
    pub hits: u64,
    /// Lookups that found nothing or an expired entry
    pub misses: u64,
    /// Entries dropped because their TTL elapsed
    pub expirations: u64,
    /// Entries dropped to make room for a new key
    pub evictions: u64,
    /// Entries physically held, including not-yet-purged expired ones
    pub total_entries: usize,
}

impl CacheStats {
    pub fn new() -> Self {
        Self::default()
    }

    // == Hit Rate ==
    /// Returns hits / (hits + misses), or 0.0 if nothing was looked up yet.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    pub fn record_expirations(&mut self, count: u64) {
        self.expirations += count;
    }

    pub fn record_eviction(&mut self) {
        self.evictions += 1;
    }

    pub fn set_total_entries(&mut self, count: usize) {
        self.total_entries = count;
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_new() {
        let stats = CacheStats::new();
        assert_eq!(stats, CacheStats::default());
        assert_eq!(stats.hit_rate(), 0.0);
    }

    #[test]
    fn test_hit_rate_mixed() {
        let mut stats = CacheStats::new();
        stats.record_hit();
        stats.record_hit();
        stats.record_hit();
        stats.record_miss();
        assert_eq!(stats.hit_rate(), 0.75);
    }

    #[test]
    fn test_hit_rate_all_misses() {
        let mut stats = CacheStats::new();
        stats.record_miss();
        stats.record_miss();
        assert_eq!(stats.hit_rate(), 0.0);
    }

    #[test]
    fn test_counters() {
        let mut stats = CacheStats::new();
        stats.record_eviction();
        stats.record_eviction();
        stats.record_expirations(3);
        stats.set_total_entries(42);
        assert_eq!(stats.evictions, 2);
        assert_eq!(stats.expirations, 3);
        assert_eq!(stats.total_entries, 42);
    }

    #[test]
    fn test_stats_serialize() {
        let mut stats = CacheStats::new();
        stats.record_hit();
        let json = serde_json::to_value(&stats).unwrap();
        assert_eq!(json["hits"], 1);
        assert_eq!(json["evictions"], 0);
    }
}
