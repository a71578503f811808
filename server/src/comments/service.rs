//! Comment service.
//!
//! Mutations load the comment, then check permissions, then validate input.

use validator::Validate;

use super::types::{CommentResponse, CreateCommentRequest, UpdateCommentRequest};
use crate::db::Comment;
use crate::error::{ServiceError, ServiceResult};
use crate::permissions::{require_delete, require_edit, Actor};
use crate::repository::Repositories;
use crate::users::service::{author_map, require_account};

/// Attach author summaries to comments.
pub async fn with_authors(
    repos: &Repositories,
    comments: Vec<Comment>,
) -> ServiceResult<Vec<CommentResponse>> {
    let authors = author_map(repos, comments.iter().map(|c| c.author_id)).await?;
    Ok(comments
        .into_iter()
        .map(|comment| CommentResponse::new(comment, &authors))
        .collect())
}

async fn single(repos: &Repositories, comment: Comment) -> ServiceResult<CommentResponse> {
    let mut responses = with_authors(repos, vec![comment]).await?;
    responses
        .pop()
        .ok_or_else(|| ServiceError::Internal("comment lost while resolving author".into()))
}

async fn load(repos: &Repositories, id: i64) -> ServiceResult<Comment> {
    repos
        .comments
        .find_by_id(id)
        .await?
        .ok_or(ServiceError::NotFound("Comment"))
}

/// Comment on an existing post as `actor`.
pub async fn create_comment(
    repos: &Repositories,
    actor: &Actor,
    input: CreateCommentRequest,
) -> ServiceResult<CommentResponse> {
    require_account(repos, actor).await?;
    input.validate()?;

    if repos.posts.find_by_id(input.post_id).await?.is_none() {
        return Err(ServiceError::NotFound("Post"));
    }

    let comment = repos
        .comments
        .create(input.post_id, actor.id, &input.content)
        .await?;
    single(repos, comment).await
}

pub async fn list_comments(repos: &Repositories) -> ServiceResult<Vec<CommentResponse>> {
    let comments = repos.comments.list().await?;
    with_authors(repos, comments).await
}

/// Comments on one post, newest first.
pub async fn list_comments_for_post(
    repos: &Repositories,
    post_id: i64,
) -> ServiceResult<Vec<CommentResponse>> {
    if repos.posts.find_by_id(post_id).await?.is_none() {
        return Err(ServiceError::NotFound("Post"));
    }

    let comments = repos.comments.list_for_posts(&[post_id]).await?;
    with_authors(repos, comments).await
}

pub async fn get_comment(repos: &Repositories, id: i64) -> ServiceResult<CommentResponse> {
    let comment = load(repos, id).await?;
    single(repos, comment).await
}

pub async fn update_comment(
    repos: &Repositories,
    actor: &Actor,
    id: i64,
    input: UpdateCommentRequest,
) -> ServiceResult<CommentResponse> {
    let comment = load(repos, id).await?;
    require_edit(actor, &comment)?;
    input.validate()?;

    let updated = repos
        .comments
        .update(id, &input.content)
        .await?
        .ok_or(ServiceError::NotFound("Comment"))?;
    single(repos, updated).await
}

pub async fn delete_comment(repos: &Repositories, actor: &Actor, id: i64) -> ServiceResult<()> {
    let comment = load(repos, id).await?;
    require_delete(actor, &comment)?;

    if !repos.comments.delete(id).await? {
        return Err(ServiceError::NotFound("Comment"));
    }
    Ok(())
}
