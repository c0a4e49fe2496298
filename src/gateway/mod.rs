//! Object Gateway Module
//!
//! The backend object store seen by the request handlers: fetch, store,
//! remove and stat of `(bucket, key)` objects. No caching happens here.

mod backend;
mod error;

pub use backend::{ObjectStoreGateway, S3Config, DEFAULT_CONTENT_TYPE};
pub use error::GatewayError;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};

/// Object metadata as reported by the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectInfo {
    pub content_type: String,
    pub size: u64,
    pub last_modified: DateTime<Utc>,
    pub etag: Option<String>,
}

/// A whole object read from the backend.
#[derive(Debug, Clone)]
pub struct FetchedObject {
    pub data: Bytes,
    pub info: ObjectInfo,
}

/// Backend object store operations.
///
/// Implementations carry their own timeouts; callers never hold cache locks
/// across these calls.
#[async_trait]
pub trait ObjectGateway: Send + Sync {
    /// Read an object and its metadata fully into memory
    async fn fetch(&self, bucket: &str, key: &str) -> Result<FetchedObject, GatewayError>;

    /// Write an object, replacing any existing one
    async fn store(
        &self,
        bucket: &str,
        key: &str,
        data: Bytes,
        content_type: &str,
    ) -> Result<(), GatewayError>;

    /// Delete an object
    async fn remove(&self, bucket: &str, key: &str) -> Result<(), GatewayError>;

    /// Read object metadata without the payload
    async fn stat(&self, bucket: &str, key: &str) -> Result<ObjectInfo, GatewayError>;
}
