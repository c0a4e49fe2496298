//! API Handlers
//!
//! HTTP request handlers for object access and service endpoints.
//!
//! Reads consult the cache first and populate it on a miss. Writes and
//! deletes invalidate the cached copy before calling the backend, so a failed
//! backend call leaves a miss rather than stale data.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{
        header::{CONTENT_LENGTH, CONTENT_TYPE, ETAG, LAST_MODIFIED},
        HeaderMap, HeaderName, HeaderValue, StatusCode,
    },
    response::{IntoResponse, Response},
    Json,
};
use tracing::{debug, warn};

use crate::cache::{Admission, CacheStore};
use crate::config::Config;
use crate::error::{ProxyError, Result};
use crate::gateway::{ObjectGateway, ObjectInfo, DEFAULT_CONTENT_TYPE};
use crate::models::{HealthResponse, ObjectPath, PurgeResponse, StatsResponse};

/// Header reporting whether an object was served from the cache.
pub const X_CACHE: HeaderName = HeaderName::from_static("x-cache");

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Shared object cache
    pub cache: Arc<CacheStore>,
    /// Backend object store
    pub gateway: Arc<dyn ObjectGateway>,
    /// Largest accepted upload body in bytes
    pub max_upload_size: usize,
}

impl AppState {
    /// Creates a new AppState with the given cache and backend.
    pub fn new(cache: CacheStore, gateway: Arc<dyn ObjectGateway>) -> Self {
        Self {
            cache: Arc::new(cache),
            gateway,
            max_upload_size: Config::default().max_upload_size,
        }
    }

    /// Creates a new AppState from configuration.
    pub fn from_config(config: &Config, gateway: Arc<dyn ObjectGateway>) -> Self {
        Self {
            max_upload_size: config.max_upload_size,
            ..Self::new(CacheStore::new(config.cache_config()), gateway)
        }
    }
}

fn validated(path: ObjectPath) -> Result<ObjectPath> {
    match path.validate() {
        Some(error_msg) => Err(ProxyError::InvalidRequest(error_msg)),
        None => Ok(path),
    }
}

/// Formats a timestamp as an HTTP date, e.g. `Tue, 15 Nov 1994 08:12:31 GMT`.
fn http_date(time: &chrono::DateTime<chrono::Utc>) -> String {
    time.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

/// Builds the metadata headers shared by GET and HEAD responses.
fn object_headers(info: &ObjectInfo, cache_status: &'static str) -> HeaderMap {
    let mut headers = HeaderMap::new();

    let content_type = HeaderValue::from_str(&info.content_type)
        .unwrap_or_else(|_| HeaderValue::from_static(DEFAULT_CONTENT_TYPE));
    headers.insert(CONTENT_TYPE, content_type);
    headers.insert(CONTENT_LENGTH, HeaderValue::from(info.size));

    if let Ok(value) = HeaderValue::from_str(&http_date(&info.last_modified)) {
        headers.insert(LAST_MODIFIED, value);
    }
    if let Some(value) = info
        .etag
        .as_deref()
        .and_then(|etag| HeaderValue::from_str(etag).ok())
    {
        headers.insert(ETAG, value);
    }
    headers.insert(X_CACHE, HeaderValue::from_static(cache_status));

    headers
}

/// Handler for GET /objects/:bucket/*key
///
/// Serves the object from the cache, or fetches it from the backend and
/// offers it to the cache.
pub async fn get_object(
    State(state): State<AppState>,
    Path(path): Path<ObjectPath>,
) -> Result<Response> {
    let path = validated(path)?;
    let cache_key = path.cache_key();

    if let Some(entry) = state.cache.get(&cache_key) {
        debug!(key = %cache_key, "Cache hit");
        let headers = object_headers(&entry.info(), "HIT");
        return Ok((StatusCode::OK, headers, entry.data).into_response());
    }

    debug!(key = %cache_key, "Cache miss");
    let object = state.gateway.fetch(&path.bucket, &path.key).await?;

    let mut info = object.info.clone();
    info.size = object.data.len() as u64;
    let data = object.data.clone();

    if let Admission::Rejected = state.cache.insert(cache_key, object) {
        debug!(bucket = %path.bucket, key = %path.key, size = info.size, "Serving uncached object");
    }

    let headers = object_headers(&info, "MISS");
    Ok((StatusCode::OK, headers, data).into_response())
}

/// Handler for HEAD /objects/:bucket/*key
///
/// Serves metadata from the cache, or stats the backend on a miss. A stat
/// does not populate the cache.
pub async fn head_object(
    State(state): State<AppState>,
    Path(path): Path<ObjectPath>,
) -> Result<Response> {
    let path = validated(path)?;
    let cache_key = path.cache_key();

    if let Some(entry) = state.cache.get(&cache_key) {
        return Ok((StatusCode::OK, object_headers(&entry.info(), "HIT")).into_response());
    }

    let info = state.gateway.stat(&path.bucket, &path.key).await?;
    Ok((StatusCode::OK, object_headers(&info, "MISS")).into_response())
}

/// Handler for PUT /objects/:bucket/*key
///
/// Stores the request body in the backend with the request's content type.
pub async fn put_object(
    State(state): State<AppState>,
    Path(path): Path<ObjectPath>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<StatusCode> {
    let path = validated(path)?;

    state.cache.invalidate(&path.cache_key());

    let content_type = headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .filter(|value| !value.is_empty())
        .unwrap_or(DEFAULT_CONTENT_TYPE);

    if let Err(err) = state
        .gateway
        .store(&path.bucket, &path.key, body, content_type)
        .await
    {
        warn!(bucket = %path.bucket, key = %path.key, "Backend write failed: {}", err);
        return Err(err.into());
    }

    Ok(StatusCode::OK)
}

/// Handler for DELETE /objects/:bucket/*key
pub async fn delete_object(
    State(state): State<AppState>,
    Path(path): Path<ObjectPath>,
) -> Result<StatusCode> {
    let path = validated(path)?;

    state.cache.invalidate(&path.cache_key());
    state.gateway.remove(&path.bucket, &path.key).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Handler for GET /stats
///
/// Returns current cache statistics.
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    Json(StatsResponse::from(state.cache.stats()))
}

/// Handler for DELETE /cache
///
/// Drops every cached object. The backend is untouched.
pub async fn purge_handler(State(state): State<AppState>) -> Json<PurgeResponse> {
    let removed = state.cache.clear();
    debug!(removed, "Cache purged");
    Json(PurgeResponse::new(removed))
}

/// Handler for GET /health
///
/// Returns health status of the server.
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
