//! Comment request and response types.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::db::Comment;
use crate::users::types::AuthorSummary;

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default)]
pub struct CreateCommentRequest {
    pub post_id: i64,
    #[validate(custom(function = "crate::util::not_blank", message = "Content is required"))]
    pub content: String,
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default)]
pub struct UpdateCommentRequest {
    #[validate(custom(function = "crate::util::not_blank", message = "Content is required"))]
    pub content: String,
}

/// Comment with its author resolved.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentResponse {
    pub id: i64,
    pub content: String,
    pub post_id: i64,
    pub author_id: i64,
    /// `None` only if the author vanished between queries.
    pub author: Option<AuthorSummary>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl CommentResponse {
    pub fn new(comment: Comment, authors: &HashMap<i64, AuthorSummary>) -> Self {
        Self {
            author: authors.get(&comment.author_id).cloned(),
            id: comment.id,
            content: comment.content,
            post_id: comment.post_id,
            author_id: comment.author_id,
            created_at: comment.created_at,
            updated_at: comment.updated_at,
        }
    }
}
