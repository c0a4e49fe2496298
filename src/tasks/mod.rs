//! Background Tasks Module
//!
//! Contains background tasks that run periodically during server operation.
//!
//! # Tasks
//! - Janitor: Removes expired cache entries at the configured interval

mod janitor;

pub use janitor::{sweep_expired, Janitor};
