//! API Module
//!
//! HTTP handlers and routing for the object proxy.
//!
//! # Endpoints
//! - `GET /objects/:bucket/*key` - Read an object (cached)
//! - `HEAD /objects/:bucket/*key` - Read object metadata
//! - `PUT /objects/:bucket/*key` - Write an object
//! - `DELETE /objects/:bucket/*key` - Delete an object
//! - `GET /stats` - Get cache statistics
//! - `DELETE /cache` - Drop every cached object
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
