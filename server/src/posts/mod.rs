//! Posts
//!
//! Blog posts with their tags and comments. Edits and deletes go through the
//! ownership checks in [`crate::permissions`].

pub mod handlers;
pub mod service;
pub mod types;

use axum::{
    middleware::from_fn_with_state,
    routing::{get, post, put},
    Router,
};

use crate::api::AppState;
use crate::auth::require_auth;

/// Create post routes.
///
/// Mounted at `/api/posts` in the main router.
pub fn router(state: AppState) -> Router<AppState> {
    let public_routes = Router::new()
        .route("/", get(handlers::list_posts))
        .route("/{id}", get(handlers::get_post))
        .route("/{id}/comments", get(handlers::list_post_comments));

    let protected_routes = Router::new()
        .route("/", post(handlers::create_post))
        .route(
            "/{id}",
            put(handlers::update_post).delete(handlers::delete_post),
        )
        .layer(from_fn_with_state(state, require_auth));

    public_routes.merge(protected_routes)
}
