//! Authentication HTTP Handlers

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::error::{AuthError, AuthResult};
use super::jwt::generate_token;
use super::middleware::AuthUser;
use super::password::{hash_password, verify_password};
use crate::api::AppState;
use crate::permissions::Role;

// ============================================================================
// Request/Response Types
// ============================================================================

/// Registration request.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default)]
pub struct RegisterRequest {
    #[validate(length(
        min = 3,
        max = 100,
        message = "Username must be between 3 and 100 characters"
    ))]
    pub username: String,
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    #[validate(length(
        min = 6,
        max = 100,
        message = "Password must be between 6 and 100 characters"
    ))]
    pub password: String,
    pub confirm_password: String,
}

/// Login request.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default)]
pub struct LoginRequest {
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Returned by register and login.
#[derive(Debug, Serialize, Deserialize)]
pub struct AuthResponse {
    pub id: i64,
    pub username: String,
    pub email: String,
    /// Bearer token for the `Authorization` header.
    pub token: String,
}

/// Identity carried by the caller's token.
#[derive(Debug, Serialize, Deserialize)]
pub struct MeResponse {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub role: Role,
    pub roles: Vec<Role>,
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /api/auth/register
#[tracing::instrument(skip(state, body), fields(email = %body.email))]
pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequest>,
) -> AuthResult<(StatusCode, Json<AuthResponse>)> {
    body.validate()?;
    if body.password != body.confirm_password {
        return Err(AuthError::Validation("Passwords do not match".into()));
    }

    if state.repos.users.email_exists(&body.email).await? {
        return Err(AuthError::UserAlreadyExists);
    }

    let password_hash = hash_password(&body.password)?;
    let (user, role) = state
        .repos
        .users
        .create_account(&body.username, &body.email, &password_hash)
        .await?;

    let token = generate_token(&user, &[role], &state.config)?;
    tracing::info!(user_id = user.id, role = %role, "User registered");

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            id: user.id,
            username: user.username,
            email: user.email,
            token,
        }),
    ))
}

/// POST /api/auth/login
#[tracing::instrument(skip(state, body), fields(email = %body.email))]
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> AuthResult<Json<AuthResponse>> {
    if body.validate().is_err() {
        return Err(AuthError::InvalidCredentials);
    }

    let user = state
        .repos
        .users
        .find_by_email(&body.email)
        .await?
        .ok_or(AuthError::InvalidCredentials)?;

    if !verify_password(&body.password, &user.password_hash)? {
        return Err(AuthError::InvalidCredentials);
    }

    let roles = state.repos.users.roles_for(user.id).await?;
    let token = generate_token(&user, &roles, &state.config)?;

    Ok(Json(AuthResponse {
        id: user.id,
        username: user.username,
        email: user.email,
        token,
    }))
}

/// GET /api/auth/me
#[tracing::instrument(skip(auth_user), fields(user_id = auth_user.id))]
pub async fn me(auth_user: AuthUser) -> Json<MeResponse> {
    Json(MeResponse {
        id: auth_user.id,
        username: auth_user.username,
        email: auth_user.email,
        role: auth_user.role,
        roles: auth_user.roles,
    })
}
