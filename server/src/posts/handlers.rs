//! Post HTTP Handlers

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;

use super::service;
use super::types::{CreatePostRequest, PostResponse, UpdatePostRequest};
use crate::api::AppState;
use crate::auth::AuthUser;
use crate::comments::{service as comment_service, types::CommentResponse};
use crate::error::ServiceResult;

/// GET /api/posts
#[tracing::instrument(skip(state))]
pub async fn list_posts(State(state): State<AppState>) -> ServiceResult<Json<Vec<PostResponse>>> {
    Ok(Json(service::list_posts(&state.repos).await?))
}

/// GET /api/posts/{id}
#[tracing::instrument(skip(state))]
pub async fn get_post(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ServiceResult<Json<PostResponse>> {
    Ok(Json(service::get_post(&state.repos, id).await?))
}

/// GET /api/posts/{id}/comments
#[tracing::instrument(skip(state))]
pub async fn list_post_comments(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ServiceResult<Json<Vec<CommentResponse>>> {
    Ok(Json(
        comment_service::list_comments_for_post(&state.repos, id).await?,
    ))
}

/// POST /api/posts
#[tracing::instrument(skip(state, body), fields(actor_id = auth_user.id))]
pub async fn create_post(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(body): Json<CreatePostRequest>,
) -> ServiceResult<(StatusCode, Json<PostResponse>)> {
    let post = service::create_post(&state.repos, &auth_user.actor(), body).await?;
    tracing::info!(post_id = post.id, "Post created");
    Ok((StatusCode::CREATED, Json(post)))
}

/// PUT /api/posts/{id}
#[tracing::instrument(skip(state, body), fields(actor_id = auth_user.id))]
pub async fn update_post(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<i64>,
    Json(body): Json<UpdatePostRequest>,
) -> ServiceResult<Json<PostResponse>> {
    let post = service::update_post(&state.repos, &auth_user.actor(), id, body).await?;
    Ok(Json(post))
}

/// DELETE /api/posts/{id}
#[tracing::instrument(skip(state), fields(actor_id = auth_user.id))]
pub async fn delete_post(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<i64>,
) -> ServiceResult<StatusCode> {
    service::delete_post(&state.repos, &auth_user.actor(), id).await?;
    tracing::info!(post_id = id, "Post deleted");
    Ok(StatusCode::NO_CONTENT)
}
