//! Capacity Policy Module
//!
//! Admission and eviction decisions for new cache entries.
//!
//! No recency or frequency is tracked: when room is needed, victims are taken
//! in whatever order the map yields them. This is an arbitrary,
//! capacity-triggered purge, not LRU.

use super::CacheKey;

// == Admission ==
/// Outcome of offering an entry to the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// The entry was stored after evicting `evicted` other entries.
    Admitted { evicted: usize },
    /// The entry is larger than the whole cache and was not stored.
    Rejected,
}

impl Admission {
    pub fn is_admitted(&self) -> bool {
        matches!(self, Admission::Admitted { .. })
    }
}

// == Capacity Policy ==
/// Byte-capacity admission policy.
#[derive(Debug, Clone, Copy)]
pub struct CapacityPolicy {
    max_size: u64,
}

impl CapacityPolicy {
    pub fn new(max_size: u64) -> Self {
        Self { max_size }
    }

    pub fn max_size(&self) -> u64 {
        self.max_size
    }

    /// Whether an entry of `size` bytes may ever be cached.
    pub fn admits(&self, size: u64) -> bool {
        size <= self.max_size
    }

    // == Select Victims ==
    /// Picks entries to remove so that `incoming` bytes fit next to
    /// `total_size`.
    ///
    /// `candidates` yields `(key, size)` pairs in unspecified order; victims are
    /// taken from the front until enough space is freed or candidates run out.
    /// The caller must hold the store's mutation lock while applying the result.
    pub fn select_victims<I>(&self, total_size: u64, incoming: u64, candidates: I) -> Vec<CacheKey>
    where
        I: IntoIterator<Item = (CacheKey, u64)>,
    {
        let mut remaining = total_size;
        let mut victims = Vec::new();

        if remaining + incoming <= self.max_size {
            return victims;
        }

        for (key, size) in candidates {
            victims.push(key);
            remaining = remaining.saturating_sub(size);
            if remaining + incoming <= self.max_size {
                break;
            }
        }

        victims
    }
}
