//! Tags

pub mod handlers;
pub mod service;
pub mod types;

use axum::{
    middleware::{from_fn, from_fn_with_state},
    routing::{delete, get, post, put},
    Router,
};

use crate::api::AppState;
use crate::auth::{require_admin, require_auth};

/// Create tag routes.
///
/// Mounted at `/api/tags` in the main router. Reads are public, create and
/// rename need a token, delete is Admin-only.
pub fn router(state: AppState) -> Router<AppState> {
    let public_routes = Router::new()
        .route("/", get(handlers::list_tags))
        .route("/{id}", get(handlers::get_tag));

    let protected_routes = Router::new()
        .route("/", post(handlers::create_tag))
        .route("/{id}", put(handlers::update_tag))
        .layer(from_fn_with_state(state.clone(), require_auth));

    let admin_routes = Router::new()
        .route("/{id}", delete(handlers::delete_tag))
        .layer(from_fn(require_admin))
        .layer(from_fn_with_state(state, require_auth));

    public_routes.merge(protected_routes).merge(admin_routes)
}
