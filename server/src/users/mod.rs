//! Users
//!
//! Account listing, profile edits and role assignment.

pub mod handlers;
pub mod service;
pub mod types;

use axum::{
    middleware::{from_fn, from_fn_with_state},
    routing::{delete, get, put},
    Router,
};

use crate::api::AppState;
use crate::auth::{require_admin, require_auth};

/// Create user routes.
///
/// Mounted at `/api/users` in the main router.
///
/// - GET /{id} - public
/// - PUT /{id} - the user themself or an Admin
/// - GET /, DELETE /{id}, PUT /{id}/role - Admin
pub fn router(state: AppState) -> Router<AppState> {
    let public_routes = Router::new().route("/{id}", get(handlers::get_user));

    let protected_routes = Router::new()
        .route("/{id}", put(handlers::update_user))
        .layer(from_fn_with_state(state.clone(), require_auth));

    let admin_routes = Router::new()
        .route("/", get(handlers::list_users))
        .route("/{id}", delete(handlers::delete_user))
        .route("/{id}/role", put(handlers::assign_role))
        .layer(from_fn(require_admin))
        .layer(from_fn_with_state(state, require_auth));

    public_routes.merge(protected_routes).merge(admin_routes)
}
