//! Cache Statistics Module
//!
//! Tracks cache performance metrics: hits, misses, evictions, expirations.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

// == Stats Counters ==
/// Lock-free counters updated by the store on every operation.
#[derive(Debug, Default)]
pub(crate) struct StatsCounters {
    hits: AtomicU64,
    misses: AtomicU64,
    evictions: AtomicU64,
    expirations: AtomicU64,
    rejections: AtomicU64,
    invalidations: AtomicU64,
}

impl StatsCounters {
    pub fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_evictions(&self, count: usize) {
        self.evictions.fetch_add(count as u64, Ordering::Relaxed);
    }

    pub fn record_expiration(&self) {
        self.expirations.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_rejection(&self) {
        self.rejections.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_invalidation(&self) {
        self.record_invalidations(1);
    }

    pub fn record_invalidations(&self, count: usize) {
        self.invalidations.fetch_add(count as u64, Ordering::Relaxed);
    }

    /// Copies the counters into a snapshot. Occupancy fields are filled by the
    /// store.
    pub fn snapshot(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
            expirations: self.expirations.load(Ordering::Relaxed),
            rejections: self.rejections.load(Ordering::Relaxed),
            invalidations: self.invalidations.load(Ordering::Relaxed),
            ..CacheStats::default()
        }
    }
}

// == Cache Stats ==
/// Point-in-time view of cache performance and occupancy.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CacheStats {
    /// Lookups served from the cache
    pub hits: u64,
    /// Lookups that found nothing or an expired entry
    pub misses: u64,
    /// Entries removed to make room for new ones
    pub evictions: u64,
    /// Entries removed because their TTL elapsed
    pub expirations: u64,
    /// Objects too large to ever be cached
    pub rejections: u64,
    /// Entries removed by writes and deletes
    pub invalidations: u64,
    /// Current number of entries
    pub total_entries: usize,
    /// Current sum of entry sizes in bytes
    pub total_size: u64,
    /// Configured capacity in bytes
    pub max_size: u64,
}

impl CacheStats {
    // == Hit Rate ==
    /// Returns hits / (hits + misses), or 0.0 if no lookups have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_new() {
        let stats = StatsCounters::default().snapshot();
        assert_eq!(stats.hits, 0);
        assert_eq!(stats.misses, 0);
        assert_eq!(stats.evictions, 0);
        assert_eq!(stats.total_entries, 0);
    }

    #[test]
    fn test_hit_rate_no_requests() {
        let stats = CacheStats::default();
        assert_eq!(stats.hit_rate(), 0.0);
    }

    #[test]
    fn test_hit_rate_mixed() {
        let counters = StatsCounters::default();
        counters.record_hit();
        counters.record_hit();
        counters.record_hit();
        counters.record_miss();
        assert_eq!(counters.snapshot().hit_rate(), 0.75);
    }

    #[test]
    fn test_record_removals() {
        let counters = StatsCounters::default();
        counters.record_evictions(3);
        counters.record_expiration();
        counters.record_rejection();
        counters.record_invalidation();
        counters.record_invalidation();

        let stats = counters.snapshot();
        assert_eq!(stats.evictions, 3);
        assert_eq!(stats.expirations, 1);
        assert_eq!(stats.rejections, 1);
        assert_eq!(stats.invalidations, 2);
    }
}
