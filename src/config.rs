//! Configuration Module
//!
//! Handles loading and managing server configuration from environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::cache::{CacheConfig, DEFAULT_MAX_SIZE};
use crate::gateway::S3Config;

/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible
/// defaults. They are read once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Backend connection settings
    pub s3: S3Config,
    /// Maximum sum of cached object sizes in bytes
    pub cache_max_size: u64,
    /// Cached object lifetime in seconds
    pub cache_ttl: u64,
    /// Janitor sweep interval in seconds
    pub cleanup_interval: u64,
    /// HTTP server port
    pub server_port: u16,
    /// Largest accepted upload body in bytes
    pub max_upload_size: usize,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `S3_ENDPOINT` - Backend endpoint, or `memory` (default: localhost:9000)
    /// - `S3_ACCESS_KEY` / `S3_SECRET_KEY` - Credentials (default: minioadmin)
    /// - `S3_REGION` - Signing region (default: us-east-1)
    /// - `S3_USE_SSL` - `true` for https (default: false)
    /// - `CACHE_MAX_SIZE` - Cache capacity in bytes (default: 100 MiB)
    /// - `CACHE_TTL` - Entry TTL in seconds (default: 300)
    /// - `CLEANUP_INTERVAL` - Janitor frequency in seconds (default: 60)
    /// - `SERVER_PORT` - HTTP server port (default: 8080)
    /// - `MAX_UPLOAD_SIZE` - Upload limit in bytes (default: 512 MiB)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            s3: S3Config {
                endpoint: env_string("S3_ENDPOINT", defaults.s3.endpoint),
                region: env_string("S3_REGION", defaults.s3.region),
                access_key: env_string("S3_ACCESS_KEY", defaults.s3.access_key),
                secret_key: env_string("S3_SECRET_KEY", defaults.s3.secret_key),
                use_ssl: env::var("S3_USE_SSL").map(|v| v == "true").unwrap_or(false),
            },
            cache_max_size: env_parse("CACHE_MAX_SIZE", defaults.cache_max_size),
            cache_ttl: env_parse("CACHE_TTL", defaults.cache_ttl),
            cleanup_interval: env_parse("CLEANUP_INTERVAL", defaults.cleanup_interval),
            server_port: env_parse("SERVER_PORT", defaults.server_port),
            max_upload_size: env_parse("MAX_UPLOAD_SIZE", defaults.max_upload_size),
        }
    }

    /// Cache construction parameters.
    pub fn cache_config(&self) -> CacheConfig {
        CacheConfig {
            max_size: self.cache_max_size,
            ttl: Duration::from_secs(self.cache_ttl),
        }
    }

    pub fn cleanup_interval(&self) -> Duration {
        Duration::from_secs(self.cleanup_interval.max(1))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            s3: S3Config::default(),
            cache_max_size: DEFAULT_MAX_SIZE,
            cache_ttl: 300,
            cleanup_interval: 60,
            server_port: 8080,
            max_upload_size: 512 * 1024 * 1024,
        }
    }
}

fn env_string(name: &str, default: String) -> String {
    env::var(name)
        .ok()
        .filter(|v| !v.is_empty())
        .unwrap_or(default)
}

fn env_parse<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
