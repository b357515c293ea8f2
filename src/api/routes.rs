//! API Routes
//!
//! Configures the Axum router with all pagination server endpoints.

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    cache_info_handler, datasets_handler, health_handler, invalidate_handler, page_handler,
    stats_handler, AppState,
};

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `POST /datasets/:name/page` - Request one page of a dataset
/// - `GET /datasets` - List servable datasets
/// - `GET /cache/:key` - Inspect a snapshot without touching it
/// - `DELETE /cache/:key` - Invalidate a snapshot
/// - `GET /stats` - Get cache statistics
/// - `GET /health` - Health check endpoint
///
/// # Middleware
/// - CORS: Allows any origin (configurable for production)
/// - Tracing: Logs all requests for debugging
pub fn create_router(state: AppState) -> Router {
    // Configure CORS middleware
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Build router with all endpoints
    Router::new()
        .route("/datasets/:name/page", post(page_handler))
        .route("/datasets", get(datasets_handler))
        .route(
            "/cache/:key",
            get(cache_info_handler).delete(invalidate_handler),
        )
        .route("/stats", get(stats_handler))
        .route("/health", get(health_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
