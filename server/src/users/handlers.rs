//! User HTTP Handlers

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;

use super::service;
use super::types::{AssignRoleRequest, UpdateUserRequest, UserResponse};
use crate::api::AppState;
use crate::auth::AuthUser;
use crate::error::ServiceResult;

/// GET /api/users
#[tracing::instrument(skip(state))]
pub async fn list_users(State(state): State<AppState>) -> ServiceResult<Json<Vec<UserResponse>>> {
    Ok(Json(service::list_users(&state.repos).await?))
}

/// GET /api/users/{id}
#[tracing::instrument(skip(state))]
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ServiceResult<Json<UserResponse>> {
    Ok(Json(service::get_user(&state.repos, id).await?))
}

/// PUT /api/users/{id}
#[tracing::instrument(skip(state, body), fields(actor_id = auth_user.id))]
pub async fn update_user(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<i64>,
    Json(body): Json<UpdateUserRequest>,
) -> ServiceResult<Json<UserResponse>> {
    let user = service::update_user(&state.repos, &auth_user.actor(), id, body).await?;
    Ok(Json(user))
}

/// DELETE /api/users/{id}
#[tracing::instrument(skip(state), fields(actor_id = auth_user.id))]
pub async fn delete_user(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<i64>,
) -> ServiceResult<StatusCode> {
    service::delete_user(&state.repos, id).await?;
    tracing::info!(user_id = id, "User deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// PUT /api/users/{id}/role
#[tracing::instrument(skip(state), fields(actor_id = auth_user.id))]
pub async fn assign_role(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<i64>,
    Json(body): Json<AssignRoleRequest>,
) -> ServiceResult<Json<UserResponse>> {
    let user = service::assign_role(&state.repos, id, body).await?;
    tracing::info!(user_id = id, roles = ?user.roles, "Role assigned");
    Ok(Json(user))
}
