//! Response DTOs for the proxy API
//!
//! Defines the JSON bodies of the service endpoints. Object reads return raw
//! bytes, not JSON.

use serde::Serialize;

use crate::cache::CacheStats;

/// Response body for the stats endpoint (GET /stats)
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub expirations: u64,
    pub rejections: u64,
    pub invalidations: u64,
    /// Current number of entries in cache
    pub total_entries: usize,
    /// Current sum of cached object sizes in bytes
    pub total_size: u64,
    /// Configured capacity in bytes
    pub max_size: u64,
    /// Hit rate (hits / (hits + misses))
    pub hit_rate: f64,
}

impl From<CacheStats> for StatsResponse {
    fn from(stats: CacheStats) -> Self {
        Self {
            hit_rate: stats.hit_rate(),
            hits: stats.hits,
            misses: stats.misses,
            evictions: stats.evictions,
            expirations: stats.expirations,
            rejections: stats.rejections,
            invalidations: stats.invalidations,
            total_entries: stats.total_entries,
            total_size: stats.total_size,
            max_size: stats.max_size,
        }
    }
}

/// Response body for the purge endpoint (DELETE /cache)
#[derive(Debug, Clone, Serialize)]
pub struct PurgeResponse {
    pub message: String,
    pub removed: usize,
}

impl PurgeResponse {
    pub fn new(removed: usize) -> Self {
        Self {
            message: format!("Purged {} cached objects", removed),
            removed,
        }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Error response body for all error conditions
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Error message describing what went wrong
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}
