//! Cache Statistics Module
//!
//! Tracks store activity: hits, misses, invalidations and evictions.

use serde::Serialize;

// == Cache Stats ==
/// Tracks request cache metrics.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CacheStats {
    /// Subscriptions served without starting a fetch
    pub hits: u64,
    /// Subscriptions that started a fetch
    pub misses: u64,
    /// Physical transport calls issued by the executor
    pub transport_calls: u64,
    /// Subscriptions and calls that joined an in-flight request instead of
    /// issuing their own
    pub deduplicated: u64,
    /// Entries hit by tag invalidation
    pub invalidations: u64,
    /// Entries evicted after their grace period
    pub evictions: u64,
    /// Current number of entries in the store
    pub total_entries: usize,
}

impl CacheStats {
    // == Constructor ==
    /// Creates a new CacheStats with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    // == Hit Rate ==
    /// Returns hits / (hits + misses), or 0.0 if nothing was subscribed yet.
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

    pub fn record_deduplicated(&mut self) {
        self.deduplicated += 1;
    }

    pub fn record_invalidations(&mut self, count: usize) {
        self.invalidations += count as u64;
    }

    pub fn record_evictions(&mut self, count: usize) {
        self.evictions += count as u64;
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
        assert_eq!(stats.hits, 0);
        assert_eq!(stats.misses, 0);
        assert_eq!(stats.invalidations, 0);
        assert_eq!(stats.evictions, 0);
        assert_eq!(stats.total_entries, 0);
    }

    #[test]
    fn test_hit_rate() {
        let mut stats = CacheStats::new();
        assert_eq!(stats.hit_rate(), 0.0);

        stats.record_hit();
        stats.record_hit();
        stats.record_hit();
        stats.record_miss();
        assert!((stats.hit_rate() - 0.75).abs() < f64::EPSILON);
    }

    #[test]
    fn test_counters() {
        let mut stats = CacheStats::new();
        stats.record_deduplicated();
        stats.record_invalidations(3);
        stats.record_evictions(2);
        stats.record_evictions(1);
        stats.set_total_entries(7);
        assert_eq!(stats.deduplicated, 1);
        assert_eq!(stats.hit_rate(), 0.0);
        assert_eq!(stats.invalidations, 3);
        assert_eq!(stats.evictions, 3);
        assert_eq!(stats.total_entries, 7);
    }

    #[test]
    fn test_stats_serialization() {
        let mut stats = CacheStats::new();
        stats.record_hit();
        let json = serde_json::to_value(&stats).unwrap();
        assert_eq!(json["hits"], 1);
        assert_eq!(json["deduplicated"], 0);
    }
}
