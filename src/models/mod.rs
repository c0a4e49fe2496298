//! Request and Response models for the proxy API
//!
//! This module defines the path parameters and the JSON bodies used by the
//! service endpoints.

pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use requests::ObjectPath;
pub use responses::{ErrorResponse, HealthResponse, PurgeResponse, StatsResponse};
