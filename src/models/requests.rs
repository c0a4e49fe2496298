//! Request models for the proxy API
//!
//! Defines the path parameters of object requests.

use serde::Deserialize;

use crate::cache::{cache_key, CacheKey, KEY_SEPARATOR};

/// Path parameters of `/objects/:bucket/*key`
///
/// # Fields
/// - `bucket`: The backend bucket name
/// - `key`: The object key, which may itself contain `/`
#[derive(Debug, Clone, Deserialize)]
pub struct ObjectPath {
    pub bucket: String,
    pub key: String,
}

impl ObjectPath {
    pub fn new(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.into(),
        }
    }

    /// Validates the path
    ///
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        if self.bucket.is_empty() {
            return Some("Bucket cannot be empty".to_string());
        }
        if self.bucket.contains(KEY_SEPARATOR) {
            return Some(format!("Bucket cannot contain '{}'", KEY_SEPARATOR));
        }
        if self.key.is_empty() {
            return Some("Key cannot be empty".to_string());
        }
        // The backend strips outer separators, so `x/` and `x` name one object
        if self.key.split(KEY_SEPARATOR).any(str::is_empty) {
            return Some(format!("Key cannot contain empty '{}' segments", KEY_SEPARATOR));
        }
        None
    }

    pub fn cache_key(&self) -> CacheKey {
        cache_key(&self.bucket, &self.key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_valid_path() {
        let path = ObjectPath::new("photos", "2024/cat.jpg");
        assert!(path.validate().is_none());
        assert_eq!(path.cache_key(), "photos/2024/cat.jpg");
    }

    #[test]
    fn test_validate_empty_bucket() {
        assert!(ObjectPath::new("", "key").validate().is_some());
    }

    #[test]
    fn test_validate_empty_key() {
        assert!(ObjectPath::new("bucket", "").validate().is_some());
    }

    #[test]
    fn test_validate_bucket_with_separator() {
        assert!(ObjectPath::new("a/b", "key").validate().is_some());
        assert!(ObjectPath::new("a/b", "c").validate().is_some());
    }

    #[test]
    fn test_validate_key_with_empty_segments() {
        for key in ["/x", "x/", "a//b", "/", "dir/"] {
            assert!(
                ObjectPath::new("bucket", key).validate().is_some(),
                "key {:?} should be rejected",
                key
            );
        }
        assert!(ObjectPath::new("bucket", "dir/file").validate().is_none());
    }
}
