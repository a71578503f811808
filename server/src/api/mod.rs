//! API Router and Application State
//!
//! Central routing configuration and shared state.

use std::sync::Arc;

use axum::{extract::DefaultBodyLimit, routing::get, Json, Router};
use serde::Serialize;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{auth, comments, config::Config, posts, repository::Repositories, tags, users};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Storage backends
    pub repos: Repositories,
    /// Server configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Create new application state.
    #[must_use]
    pub fn new(repos: Repositories, config: Config) -> Self {
        Self {
            repos,
            config: Arc::new(config),
        }
    }
}

/// Create the main application router.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let max_body_size = state.config.max_body_size;

    Router::new()
        // Health check
        .route("/health", get(health_check))
        .nest("/api/auth", auth::router(state.clone()))
        .nest("/api/posts", posts::router(state.clone()))
        .nest("/api/comments", comments::router(state.clone()))
        .nest("/api/tags", tags::router(state.clone()))
        .nest("/api/users", users::router(state.clone()))
        // Middleware
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(cors)
        .layer(DefaultBodyLimit::max(max_body_size))
        // State
        .with_state(state)
}

/// Health check response.
#[derive(Serialize)]
struct HealthResponse {
    /// Service status
    status: &'static str,
}

/// Health check endpoint.
async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}
