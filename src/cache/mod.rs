//! Cache Module
//!
//! Provides a bounded in-memory object cache with TTL expiration and
//! capacity-triggered eviction.

mod entry;
mod policy;
mod stats;
mod store;

#[cfg(test)]
mod property_tests;

// Re-export public types
pub use entry::{cache_key, CacheEntry, CacheKey, KEY_SEPARATOR};
pub use policy::{Admission, CapacityPolicy};
pub use stats::CacheStats;
pub use store::{CacheConfig, CacheStore, DEFAULT_MAX_SIZE, DEFAULT_TTL};

#[cfg(test)]
pub(crate) use entry::test_object;
