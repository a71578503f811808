//! Authentication Middleware

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::Response,
};

use super::error::AuthError;
use super::jwt::{validate_token, Claims};
use crate::api::AppState;
use crate::permissions::{Actor, Role};

/// Authenticated user injected into request extensions.
///
/// Built from verified token claims; the database is not consulted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    /// User ID.
    pub id: i64,
    /// Username.
    pub username: String,
    pub email: String,
    /// Highest role held.
    pub role: Role,
    /// Every role carried by the token.
    pub roles: Vec<Role>,
}

impl AuthUser {
    /// The identity handed to the permission checks.
    #[must_use]
    pub const fn actor(&self) -> Actor {
        Actor::new(self.id, self.role)
    }

    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

impl TryFrom<Claims> for AuthUser {
    type Error = AuthError;

    fn try_from(claims: Claims) -> Result<Self, Self::Error> {
        let actor = claims.actor()?;
        Ok(Self {
            id: actor.id,
            username: claims.name,
            email: claims.email,
            role: actor.role,
            roles: claims.roles,
        })
    }
}

/// Middleware to require authentication.
///
/// Extracts Bearer token from Authorization header, validates the JWT and
/// injects `AuthUser` into request extensions.
///
/// # Usage
///
/// ```ignore
/// Router::new()
///     .route("/protected", get(handler))
///     .layer(axum::middleware::from_fn_with_state(state, require_auth))
/// ```
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let auth_header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or(AuthError::MissingAuthHeader)?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or(AuthError::InvalidAuthHeader)?;

    let claims = validate_token(token, &state.config)?;
    let auth_user = AuthUser::try_from(claims)?;
    request.extensions_mut().insert(auth_user);

    Ok(next.run(request).await)
}

/// Middleware that requires the Admin role.
///
/// Must run after [`require_auth`].
#[tracing::instrument(skip(request, next))]
pub async fn require_admin(request: Request, next: Next) -> Result<Response, AuthError> {
    let auth = request
        .extensions()
        .get::<AuthUser>()
        .ok_or(AuthError::MissingAuthHeader)?;

    if !auth.is_admin() {
        tracing::debug!(user_id = auth.id, role = %auth.role, "Admin role required");
        return Err(AuthError::AdminRequired);
    }

    Ok(next.run(request).await)
}

/// Extractor for authenticated user in handlers.
///
/// ```ignore
/// async fn protected_handler(auth_user: AuthUser) -> impl IntoResponse {
///     format!("Hello, {}!", auth_user.username)
/// }
/// ```
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Self>()
            .cloned()
            .ok_or(AuthError::MissingAuthHeader)
    }
}
