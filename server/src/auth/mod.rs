//! Authentication Service
//!
//! Local accounts: registration, login, bearer tokens and the middleware
//! that turns a token into an [`AuthUser`].

mod error;
mod handlers;
pub mod jwt;
mod middleware;
mod password;

use axum::{
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};

use crate::api::AppState;

pub use error::{AuthError, AuthResult};
pub use handlers::{AuthResponse, MeResponse};
pub use middleware::{require_admin, require_auth, AuthUser};
pub use password::{hash_password, verify_password};

/// Create authentication router.
///
/// Public routes (no auth required):
/// - POST /register - Register a new user
/// - POST /login - Login with email/password
///
/// Protected routes (auth required):
/// - GET /me - Identity carried by the token
pub fn router(state: AppState) -> Router<AppState> {
    let public_routes = Router::new()
        .route("/register", post(handlers::register))
        .route("/login", post(handlers::login));

    let protected_routes = Router::new()
        .route("/me", get(handlers::me))
        .layer(axum_middleware::from_fn_with_state(state, require_auth));

    public_routes.merge(protected_routes)
}
