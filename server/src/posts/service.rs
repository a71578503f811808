//! Post service.
//!
//! Mutations load the post, then check permissions, then validate input.

use std::collections::HashMap;

use validator::Validate;

use super::types::{CreatePostRequest, PostResponse, UpdatePostRequest};
use crate::comments::types::CommentResponse;
use crate::db::{Post, Tag};
use crate::error::{ServiceError, ServiceResult};
use crate::permissions::{require_delete, require_edit, Actor};
use crate::repository::Repositories;
use crate::users::service::{author_map, require_account};

/// Resolve authors, tags and comments for a batch of posts.
///
/// Three bulk lookups regardless of how many posts are passed.
async fn assemble(repos: &Repositories, posts: Vec<Post>) -> ServiceResult<Vec<PostResponse>> {
    let ids: Vec<i64> = posts.iter().map(|p| p.id).collect();

    let mut tags: HashMap<i64, Vec<Tag>> = HashMap::new();
    for row in repos.posts.tags_for_posts(&ids).await? {
        tags.entry(row.post_id).or_default().push(row.into());
    }

    let comments = repos.comments.list_for_posts(&ids).await?;
    let authors = author_map(
        repos,
        posts
            .iter()
            .map(|p| p.author_id)
            .chain(comments.iter().map(|c| c.author_id)),
    )
    .await?;

    let mut comments_by_post: HashMap<i64, Vec<CommentResponse>> = HashMap::new();
    for comment in comments {
        comments_by_post
            .entry(comment.post_id)
            .or_default()
            .push(CommentResponse::new(comment, &authors));
    }

    Ok(posts
        .into_iter()
        .map(|post| PostResponse {
            author: authors.get(&post.author_id).cloned(),
            tags: tags.remove(&post.id).unwrap_or_default(),
            comments: comments_by_post.remove(&post.id).unwrap_or_default(),
            id: post.id,
            title: post.title,
            content: post.content,
            author_id: post.author_id,
            created_at: post.created_at,
            updated_at: post.updated_at,
        })
        .collect())
}

async fn single(repos: &Repositories, post: Post) -> ServiceResult<PostResponse> {
    assemble(repos, vec![post])
        .await?
        .pop()
        .ok_or_else(|| ServiceError::Internal("post lost while assembling".into()))
}

async fn load(repos: &Repositories, id: i64) -> ServiceResult<Post> {
    repos
        .posts
        .find_by_id(id)
        .await?
        .ok_or(ServiceError::NotFound("Post"))
}

/// Publish a post authored by `actor`.
pub async fn create_post(
    repos: &Repositories,
    actor: &Actor,
    input: CreatePostRequest,
) -> ServiceResult<PostResponse> {
    require_account(repos, actor).await?;
    input.validate()?;

    let post = repos
        .posts
        .create(actor.id, &input.title, &input.content)
        .await?;
    if !input.tag_ids.is_empty() {
        repos.posts.replace_tags(post.id, &input.tag_ids).await?;
    }

    single(repos, post).await
}

/// All posts, newest first.
pub async fn list_posts(repos: &Repositories) -> ServiceResult<Vec<PostResponse>> {
    let posts = repos.posts.list().await?;
    assemble(repos, posts).await
}

pub async fn get_post(repos: &Repositories, id: i64) -> ServiceResult<PostResponse> {
    let post = load(repos, id).await?;
    single(repos, post).await
}

pub async fn update_post(
    repos: &Repositories,
    actor: &Actor,
    id: i64,
    input: UpdatePostRequest,
) -> ServiceResult<PostResponse> {
    let post = load(repos, id).await?;
    require_edit(actor, &post)?;
    input.validate()?;

    let updated = repos
        .posts
        .update(id, &input.title, &input.content)
        .await?
        .ok_or(ServiceError::NotFound("Post"))?;
    if let Some(tag_ids) = &input.tag_ids {
        repos.posts.replace_tags(id, tag_ids).await?;
    }

    single(repos, updated).await
}

/// Delete a post together with its comments and tag links.
pub async fn delete_post(repos: &Repositories, actor: &Actor, id: i64) -> ServiceResult<()> {
    let post = load(repos, id).await?;
    require_delete(actor, &post)?;

    if !repos.posts.delete(id).await? {
        return Err(ServiceError::NotFound("Post"));
    }
    Ok(())
}
