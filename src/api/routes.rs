//! API Routes
//!
//! Configures the Axum router with all proxy endpoints.

use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    delete_object, get_object, head_object, health_handler, purge_handler, put_object,
    stats_handler, AppState,
};

/// Creates the main router with all endpoints configured.
///
/// # Middleware
/// - Body limit: uploads larger than `AppState::max_upload_size` are refused
/// - CORS: Allows any origin
/// - Tracing: Logs all requests
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route(
            "/objects/:bucket/*key",
            get(get_object)
                .head(head_object)
                .put(put_object)
                .delete(delete_object),
        )
        .route("/stats", get(stats_handler))
        .route("/cache", delete(purge_handler))
        .route("/health", get(health_handler))
        .layer(DefaultBodyLimit::max(state.max_upload_size))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
