//! Tag HTTP Handlers

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;

use super::service;
use super::types::TagRequest;
use crate::api::AppState;
use crate::auth::AuthUser;
use crate::db::Tag;
use crate::error::ServiceResult;

/// GET /api/tags
#[tracing::instrument(skip(state))]
pub async fn list_tags(State(state): State<AppState>) -> ServiceResult<Json<Vec<Tag>>> {
    Ok(Json(service::list_tags(&state.repos).await?))
}

/// GET /api/tags/{id}
#[tracing::instrument(skip(state))]
pub async fn get_tag(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ServiceResult<Json<Tag>> {
    Ok(Json(service::get_tag(&state.repos, id).await?))
}

/// POST /api/tags
///
/// Returns the existing tag when the name is already taken (ignoring case).
#[tracing::instrument(skip(state), fields(actor_id = auth_user.id))]
pub async fn create_tag(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(body): Json<TagRequest>,
) -> ServiceResult<(StatusCode, Json<Tag>)> {
    let tag = service::create_tag(&state.repos, body).await?;
    Ok((StatusCode::CREATED, Json(tag)))
}

/// PUT /api/tags/{id}
#[tracing::instrument(skip(state), fields(actor_id = auth_user.id))]
pub async fn update_tag(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<i64>,
    Json(body): Json<TagRequest>,
) -> ServiceResult<Json<Tag>> {
    Ok(Json(service::update_tag(&state.repos, id, body).await?))
}

/// DELETE /api/tags/{id}
#[tracing::instrument(skip(state), fields(actor_id = auth_user.id))]
pub async fn delete_tag(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<i64>,
) -> ServiceResult<StatusCode> {
    service::delete_tag(&state.repos, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
