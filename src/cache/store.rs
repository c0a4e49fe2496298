//! Cache Store Module
//!
//! Main cache engine: a sharded concurrent map of object snapshots plus an
//! aggregate size counter, bounded by a byte capacity and a fixed TTL.

use std::time::{Duration, Instant};

use dashmap::DashMap;
use parking_lot::Mutex;
use tracing::debug;

use crate::cache::stats::StatsCounters;
use crate::cache::{Admission, CacheEntry, CacheKey, CacheStats, CapacityPolicy};
use crate::gateway::FetchedObject;

/// Default entry lifetime.
pub const DEFAULT_TTL: Duration = Duration::from_secs(5 * 60);

/// Default capacity in bytes.
pub const DEFAULT_MAX_SIZE: u64 = 100 * 1024 * 1024;

// == Cache Config ==
/// Construction parameters for a [`CacheStore`].
#[derive(Debug, Clone, Copy)]
pub struct CacheConfig {
    /// Maximum sum of entry sizes in bytes
    pub max_size: u64,
    /// Lifetime of every inserted entry
    pub ttl: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_size: DEFAULT_MAX_SIZE,
            ttl: DEFAULT_TTL,
        }
    }
}

// == Cache Store ==
/// Bounded, TTL-based object cache.
///
/// Lookups go straight to the sharded map. Every mutation of the map happens
/// while `total_size` is locked, so the counter and the map contents change
/// together. Lock order is always `total_size` first, then map shards; no map
/// guard is held while acquiring `total_size`.
#[derive(Debug)]
pub struct CacheStore {
    entries: DashMap<CacheKey, CacheEntry>,
    total_size: Mutex<u64>,
    policy: CapacityPolicy,
    ttl: Duration,
    stats: StatsCounters,
}

impl CacheStore {
    // == Constructor ==
    pub fn new(config: CacheConfig) -> Self {
        Self {
            entries: DashMap::new(),
            total_size: Mutex::new(0),
            policy: CapacityPolicy::new(config.max_size),
            ttl: config.ttl,
            stats: StatsCounters::default(),
        }
    }

    // == Get ==
    /// Returns the entry for `key` if present and not expired.
    ///
    /// An expired entry found here is removed before returning `None`.
    pub fn get(&self, key: &str) -> Option<CacheEntry> {
        let now = Instant::now();
        let expired = match self.entries.get(key) {
            Some(entry) if !entry.is_expired_at(now) => {
                self.stats.record_hit();
                return Some(entry.value().clone());
            }
            Some(_) => true,
            None => false,
        };

        if expired {
            self.remove_if_expired(key, now);
        }
        self.stats.record_miss();
        None
    }

    // == Insert ==
    /// Stores a fetched object under `key`, evicting other entries if needed.
    ///
    /// Objects larger than the capacity are never cached. An existing entry
    /// for the same key is replaced; the last writer wins.
    pub fn insert(&self, key: CacheKey, object: FetchedObject) -> Admission {
        let size = object.data.len() as u64;
        if !self.policy.admits(size) {
            self.stats.record_rejection();
            debug!(key = %key, size, max_size = self.policy.max_size(), "Object too large to cache");
            return Admission::Rejected;
        }

        let mut total = self.total_size.lock();
        let entry = CacheEntry::new(object, self.ttl);

        if let Some((_, previous)) = self.entries.remove(&key) {
            *total -= previous.size;
        }

        let victims = self.policy.select_victims(
            *total,
            size,
            self.entries
                .iter()
                .map(|entry| (entry.key().clone(), entry.size)),
        );
        let mut evicted = 0;
        for victim in &victims {
            if let Some((_, removed)) = self.entries.remove(victim) {
                *total -= removed.size;
                evicted += 1;
            }
        }
        if evicted > 0 {
            self.stats.record_evictions(evicted);
            debug!(evicted, freed_for = size, "Evicted entries to make room");
        }

        self.entries.insert(key, entry);
        *total += size;

        Admission::Admitted { evicted }
    }

    // == Invalidate ==
    /// Removes and returns the entry for `key`, if any.
    pub fn invalidate(&self, key: &str) -> Option<CacheEntry> {
        let mut total = self.total_size.lock();
        let (_, entry) = self.entries.remove(key)?;
        *total -= entry.size;
        self.stats.record_invalidation();
        Some(entry)
    }

    // == Remove If Expired ==
    /// Removes the entry for `key` only if it is expired at `now`.
    ///
    /// A fresh entry inserted after the caller observed the expired one is left
    /// untouched.
    pub fn remove_if_expired(&self, key: &str, now: Instant) -> Option<CacheEntry> {
        let mut total = self.total_size.lock();
        let (_, entry) = self
            .entries
            .remove_if(key, |_, entry| entry.is_expired_at(now))?;
        *total -= entry.size;
        self.stats.record_expiration();
        Some(entry)
    }

    // == Snapshot Keys ==
    /// Keys present at the time of the call. Concurrent mutation is not
    /// blocked; keys may be gone by the time the caller looks at them.
    pub fn snapshot_keys(&self) -> Vec<CacheKey> {
        self.entries.iter().map(|entry| entry.key().clone()).collect()
    }

    // == Clear ==
    /// Drops every entry. Returns the number removed.
    pub fn clear(&self) -> usize {
        let mut total = self.total_size.lock();
        let removed = self.entries.len();
        self.entries.clear();
        *total = 0;
        self.stats.record_invalidations(removed);
        removed
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        let total = self.total_size.lock();
        let mut stats = self.stats.snapshot();
        stats.total_entries = self.entries.len();
        stats.total_size = *total;
        stats.max_size = self.policy.max_size();
        stats
    }

    /// Current sum of entry sizes in bytes.
    pub fn total_size(&self) -> u64 {
        *self.total_size.lock()
    }

    pub fn max_size(&self) -> u64 {
        self.policy.max_size()
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    // == Length ==
    /// Returns the current number of entries in the cache.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sums entry sizes by scanning the map, for checking `total_size`.
    #[cfg(test)]
    pub(crate) fn content_size(&self) -> u64 {
        let _total = self.total_size.lock();
        self.entries.iter().map(|entry| entry.size).sum()
    }
}

impl Default for CacheStore {
    fn default() -> Self {
        Self::new(CacheConfig::default())
    }
}
