//! Object Cache Proxy - An HTTP front-end for object storage
//!
//! Proxies get/put/delete/head to an S3-compatible backend and absorbs
//! repeated reads with a bounded, TTL-based in-memory cache.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod gateway;
pub mod models;
pub mod tasks;

pub use api::AppState;
pub use config::Config;
pub use tasks::Janitor;
