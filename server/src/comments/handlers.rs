//! Comment HTTP Handlers

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;

use super::service;
use super::types::{CommentResponse, CreateCommentRequest, UpdateCommentRequest};
use crate::api::AppState;
use crate::auth::AuthUser;
use crate::error::ServiceResult;

/// GET /api/comments
#[tracing::instrument(skip(state))]
pub async fn list_comments(
    State(state): State<AppState>,
) -> ServiceResult<Json<Vec<CommentResponse>>> {
    Ok(Json(service::list_comments(&state.repos).await?))
}

/// GET /api/comments/{id}
#[tracing::instrument(skip(state))]
pub async fn get_comment(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ServiceResult<Json<CommentResponse>> {
    Ok(Json(service::get_comment(&state.repos, id).await?))
}

/// POST /api/comments
#[tracing::instrument(skip(state, body), fields(actor_id = auth_user.id, post_id = body.post_id))]
pub async fn create_comment(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(body): Json<CreateCommentRequest>,
) -> ServiceResult<(StatusCode, Json<CommentResponse>)> {
    let comment = service::create_comment(&state.repos, &auth_user.actor(), body).await?;
    Ok((StatusCode::CREATED, Json(comment)))
}

/// PUT /api/comments/{id}
#[tracing::instrument(skip(state, body), fields(actor_id = auth_user.id))]
pub async fn update_comment(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<i64>,
    Json(body): Json<UpdateCommentRequest>,
) -> ServiceResult<Json<CommentResponse>> {
    let comment = service::update_comment(&state.repos, &auth_user.actor(), id, body).await?;
    Ok(Json(comment))
}

/// DELETE /api/comments/{id}
#[tracing::instrument(skip(state), fields(actor_id = auth_user.id))]
pub async fn delete_comment(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<i64>,
) -> ServiceResult<StatusCode> {
    service::delete_comment(&state.repos, &auth_user.actor(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}
