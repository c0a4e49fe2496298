//! Error types for the proxy
//!
//! Provides unified error handling using thiserror. The cache itself never
//! produces these; they come from request validation and the backend.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::gateway::GatewayError;
use crate::models::ErrorResponse;

// == Proxy Error Enum ==
/// Unified error type for request handling.
#[derive(Error, Debug)]
pub enum ProxyError {
    /// Object does not exist in the backend
    #[error("Object not found: {0}")]
    NotFound(String),

    /// Malformed bucket or key
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Backend unavailable or failing
    #[error("Backend error: {0}")]
    Gateway(String),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<GatewayError> for ProxyError {
    fn from(err: GatewayError) -> Self {
        match err {
            GatewayError::NotFound(path) => ProxyError::NotFound(path),
            GatewayError::InvalidPath(msg) => ProxyError::InvalidRequest(msg),
            GatewayError::Backend(msg) => ProxyError::Gateway(msg),
            GatewayError::Configuration(msg) => ProxyError::Internal(msg),
        }
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let status = match &self {
            ProxyError::NotFound(_) => StatusCode::NOT_FOUND,
            ProxyError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ProxyError::Gateway(_) => StatusCode::BAD_GATEWAY,
            ProxyError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status.is_server_error() {
            tracing::error!("{}", self);
        }

        let body = Json(ErrorResponse::new(self.to_string()));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for request handlers.
pub type Result<T> = std::result::Result<T, ProxyError>;
