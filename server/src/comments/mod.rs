//! Comments

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

/// Create comment routes.
///
/// Mounted at `/api/comments` in the main router. Reads are public; writes
/// require a token and edit/delete permission on the comment.
pub fn router(state: AppState) -> Router<AppState> {
    let public_routes = Router::new()
        .route("/", get(handlers::list_comments))
        .route("/{id}", get(handlers::get_comment));

    let protected_routes = Router::new()
        .route("/", post(handlers::create_comment))
        .route(
            "/{id}",
            put(handlers::update_comment).delete(handlers::delete_comment),
        )
        .layer(from_fn_with_state(state, require_auth));

    public_routes.merge(protected_routes)
}
