//! Gateway error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("Object not found: {0}")]
    NotFound(String),

    #[error("Invalid object path: {0}")]
    InvalidPath(String),

    #[error("Storage backend error: {0}")]
    Backend(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}
