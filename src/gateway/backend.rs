//! `object_store`-backed gateway
//!
//! Talks to AWS S3, MinIO and other S3-compatible services, or to an
//! in-process store for local runs and tests. One client is built per bucket
//! on first use and reused afterwards.

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use dashmap::DashMap;
use object_store::aws::AmazonS3Builder;
use object_store::memory::InMemory;
use object_store::path::Path as ObjectPath;
use object_store::{
    Attribute, Attributes, GetOptions, ObjectMeta, ObjectStore, PutOptions, PutPayload,
};
use tracing::{debug, info};

use super::{FetchedObject, GatewayError, ObjectGateway, ObjectInfo};

/// Content type used when neither the client nor the backend supplies one.
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Endpoint value selecting the in-process store.
const MEMORY_ENDPOINT: &str = "memory";

/// S3 connection settings
#[derive(Debug, Clone)]
pub struct S3Config {
    /// Endpoint host or URL, e.g. `localhost:9000`, or `memory`
    pub endpoint: String,
    /// Signing region
    pub region: String,
    pub access_key: String,
    pub secret_key: String,
    /// Use https when the endpoint carries no scheme
    pub use_ssl: bool,
}

impl Default for S3Config {
    fn default() -> Self {
        Self {
            endpoint: "localhost:9000".to_string(),
            region: "us-east-1".to_string(),
            access_key: "minioadmin".to_string(),
            secret_key: "minioadmin".to_string(),
            use_ssl: false,
        }
    }
}

impl S3Config {
    /// Endpoint as a URL, adding a scheme from `use_ssl` when missing.
    pub fn endpoint_url(&self) -> String {
        if self.endpoint.contains("://") {
            self.endpoint.clone()
        } else if self.use_ssl {
            format!("https://{}", self.endpoint)
        } else {
            format!("http://{}", self.endpoint)
        }
    }
}

type BucketFactory = Box<dyn Fn(&str) -> Result<Arc<dyn ObjectStore>, GatewayError> + Send + Sync>;

/// Gateway over `object_store` clients, one per bucket.
pub struct ObjectStoreGateway {
    factory: BucketFactory,
    buckets: DashMap<String, Arc<dyn ObjectStore>>,
}

impl ObjectStoreGateway {
    /// Builds S3 clients for the configured endpoint, or an in-process store
    /// when the endpoint is `memory`.
    pub fn from_config(config: &S3Config) -> Self {
        if config.endpoint == MEMORY_ENDPOINT {
            info!("Using in-memory object store");
            return Self::in_memory();
        }

        info!(
            "Using S3 object store: endpoint={}, region={}",
            config.endpoint_url(),
            config.region
        );
        let config = config.clone();
        Self::with_factory(move |bucket| s3_bucket(&config, bucket))
    }

    /// Gateway backed by in-process stores, empty at start.
    pub fn in_memory() -> Self {
        Self::with_factory(|_| Ok(Arc::new(InMemory::new()) as Arc<dyn ObjectStore>))
    }

    pub fn with_factory<F>(factory: F) -> Self
    where
        F: Fn(&str) -> Result<Arc<dyn ObjectStore>, GatewayError> + Send + Sync + 'static,
    {
        Self {
            factory: Box::new(factory),
            buckets: DashMap::new(),
        }
    }

    /// Get the client for a bucket, creating it on first use
    fn bucket(&self, name: &str) -> Result<Arc<dyn ObjectStore>, GatewayError> {
        if let Some(store) = self.buckets.get(name) {
            return Ok(Arc::clone(store.value()));
        }

        let created = (self.factory)(name)?;
        debug!(bucket = %name, "Created object store client");
        let store = self.buckets.entry(name.to_string()).or_insert(created);
        let store = Arc::clone(store.value());
        Ok(store)
    }
}

fn s3_bucket(config: &S3Config, bucket: &str) -> Result<Arc<dyn ObjectStore>, GatewayError> {
    let store = AmazonS3Builder::new()
        .with_bucket_name(bucket)
        .with_region(&config.region)
        .with_endpoint(config.endpoint_url())
        .with_access_key_id(&config.access_key)
        .with_secret_access_key(&config.secret_key)
        .with_allow_http(!config.use_ssl)
        .build()
        .map_err(|e| {
            GatewayError::Configuration(format!(
                "Failed to create S3 client for bucket {}: {}",
                bucket, e
            ))
        })?;
    Ok(Arc::new(store))
}

/// Get the object path for a key
fn object_path(key: &str) -> Result<ObjectPath, GatewayError> {
    ObjectPath::parse(key).map_err(|e| GatewayError::InvalidPath(format!("{}: {}", key, e)))
}

fn map_error(err: object_store::Error, bucket: &str, key: &str) -> GatewayError {
    match err {
        object_store::Error::NotFound { .. } => {
            GatewayError::NotFound(format!("{}/{}", bucket, key))
        }
        other => GatewayError::Backend(other.to_string()),
    }
}

fn object_info(meta: &ObjectMeta, attributes: &Attributes) -> ObjectInfo {
    let content_type = attributes
        .get(&Attribute::ContentType)
        .map(|value| {
            let value: &str = value.as_ref();
            value.to_string()
        })
        .unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_string());

    ObjectInfo {
        content_type,
        size: meta.size as u64,
        last_modified: meta.last_modified,
        etag: meta.e_tag.clone(),
    }
}

#[async_trait]
impl ObjectGateway for ObjectStoreGateway {
    async fn fetch(&self, bucket: &str, key: &str) -> Result<FetchedObject, GatewayError> {
        let store = self.bucket(bucket)?;
        let path = object_path(key)?;
        debug!(bucket = %bucket, key = %key, "Fetching object");

        let result = store
            .get(&path)
            .await
            .map_err(|e| map_error(e, bucket, key))?;
        let info = object_info(&result.meta, &result.attributes);

        let data = result
            .bytes()
            .await
            .map_err(|e| GatewayError::Backend(format!("Failed to read bytes: {}", e)))?;

        Ok(FetchedObject { data, info })
    }

    async fn store(
        &self,
        bucket: &str,
        key: &str,
        data: Bytes,
        content_type: &str,
    ) -> Result<(), GatewayError> {
        let store = self.bucket(bucket)?;
        let path = object_path(key)?;
        debug!(bucket = %bucket, key = %key, size = data.len(), "Storing object");

        let mut attributes = Attributes::new();
        attributes.insert(Attribute::ContentType, content_type.to_string().into());
        let options = PutOptions {
            attributes,
            ..Default::default()
        };

        store
            .put_opts(&path, PutPayload::from(data), options)
            .await
            .map_err(|e| map_error(e, bucket, key))?;
        Ok(())
    }

    async fn remove(&self, bucket: &str, key: &str) -> Result<(), GatewayError> {
        let store = self.bucket(bucket)?;
        let path = object_path(key)?;
        debug!(bucket = %bucket, key = %key, "Removing object");

        store
            .delete(&path)
            .await
            .map_err(|e| map_error(e, bucket, key))
    }

    async fn stat(&self, bucket: &str, key: &str) -> Result<ObjectInfo, GatewayError> {
        let store = self.bucket(bucket)?;
        let path = object_path(key)?;

        let options = GetOptions {
            head: true,
            ..Default::default()
        };
        let result = store
            .get_opts(&path, options)
            .await
            .map_err(|e| map_error(e, bucket, key))?;

        Ok(object_info(&result.meta, &result.attributes))
    }
}
