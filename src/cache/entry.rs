//! Cache Entry Module
//!
//! Defines the immutable object snapshot held by the cache and the
//! derivation of cache keys from bucket/object pairs.

use std::time::{Duration, Instant};

use bytes::Bytes;
use chrono::{DateTime, Utc};

use crate::gateway::{FetchedObject, ObjectInfo};

/// Identifies a cached object. Built by [`cache_key`].
pub type CacheKey = String;

/// Separator between bucket and object key. Bucket names never contain it.
pub const KEY_SEPARATOR: char = '/';

// == Cache Key ==
/// Composes a cache key from a bucket name and an object key.
///
/// Bucket names cannot contain `/`, so splitting on the first separator
/// always recovers the original pair.
pub fn cache_key(bucket: &str, key: &str) -> CacheKey {
    format!("{}{}{}", bucket, KEY_SEPARATOR, key)
}

// == Cache Entry ==
/// A cached object snapshot. Entries are never mutated after insertion;
/// a changed object is represented by invalidation plus a fresh insert.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// Object payload
    pub data: Bytes,
    /// Content type reported by the backend at fetch time
    pub content_type: String,
    /// Payload length in bytes, always `data.len()`
    pub size: u64,
    /// Backend last-modified timestamp
    pub last_modified: DateTime<Utc>,
    /// Backend content version token
    pub etag: Option<String>,
    /// Instant after which the entry is treated as absent
    pub expires_at: Instant,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates an entry from a fetched object, expiring `ttl` from now.
    pub fn new(object: FetchedObject, ttl: Duration) -> Self {
        let FetchedObject { data, info } = object;
        Self {
            size: data.len() as u64,
            data,
            content_type: info.content_type,
            last_modified: info.last_modified,
            etag: info.etag,
            expires_at: Instant::now() + ttl,
        }
    }

    // == Is Expired ==
    /// An entry is expired once `now >= expires_at`.
    pub fn is_expired_at(&self, now: Instant) -> bool {
        now >= self.expires_at
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Instant::now())
    }

    /// Metadata of the cached object, without the payload.
    pub fn info(&self) -> ObjectInfo {
        ObjectInfo {
            content_type: self.content_type.clone(),
            size: self.size,
            last_modified: self.last_modified,
            etag: self.etag.clone(),
        }
    }

    /// Remaining lifetime, zero once expired.
    pub fn ttl_remaining(&self) -> Duration {
        self.expires_at.saturating_duration_since(Instant::now())
    }
}

#[cfg(test)]
pub(crate) fn test_object(size: usize) -> FetchedObject {
    FetchedObject {
        data: Bytes::from(vec![b'x'; size]),
        info: ObjectInfo {
            content_type: "application/octet-stream".to_string(),
            size: size as u64,
            last_modified: Utc::now(),
            etag: Some("\"etag\"".to_string()),
        },
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use std::thread::sleep;

    #[test]
    fn test_cache_key_composition() {
        assert_eq!(cache_key("photos", "2024/cat.jpg"), "photos/2024/cat.jpg");
    }

    #[test]
    fn test_cache_key_splits_at_bucket() {
        // Keys may contain the separator, buckets may not.
        let key = cache_key("bucket", "dir/file");
        let (bucket, object) = key.split_once(KEY_SEPARATOR).unwrap();
        assert_eq!(bucket, "bucket");
        assert_eq!(object, "dir/file");
    }

    #[test]
    fn test_entry_size_matches_payload() {
        let entry = CacheEntry::new(test_object(123), Duration::from_secs(60));
        assert_eq!(entry.size, 123);
        assert_eq!(entry.size, entry.data.len() as u64);
        assert!(!entry.is_expired());
    }

    #[test]
    fn test_entry_info() {
        let object = test_object(10);
        let expected = object.info.clone();
        let entry = CacheEntry::new(object, Duration::from_secs(60));
        assert_eq!(entry.info(), expected);
    }

    #[test]
    fn test_entry_expiration() {
        let entry = CacheEntry::new(test_object(1), Duration::from_secs(1));
        assert!(!entry.is_expired());

        sleep(Duration::from_millis(1100));

        assert!(entry.is_expired());
        assert_eq!(entry.ttl_remaining(), Duration::ZERO);
    }

    #[test]
    fn test_expiration_boundary_condition() {
        let entry = CacheEntry::new(test_object(1), Duration::from_secs(30));
        assert!(entry.is_expired_at(entry.expires_at));
        assert!(!entry.is_expired_at(entry.expires_at - Duration::from_millis(1)));
    }

    #[test]
    fn test_ttl_remaining() {
        let entry = CacheEntry::new(test_object(1), Duration::from_secs(10));
        let remaining = entry.ttl_remaining();
        assert!(remaining <= Duration::from_secs(10));
        assert!(remaining >= Duration::from_secs(9));
    }
}
