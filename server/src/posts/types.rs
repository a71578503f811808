//! Post request and response types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::comments::types::CommentResponse;
use crate::db::Tag;
use crate::users::types::AuthorSummary;

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default)]
pub struct CreatePostRequest {
    #[validate(
        custom(function = "crate::util::not_blank", message = "Title is required"),
        length(max = 200, message = "Title must be at most 200 characters")
    )]
    pub title: String,
    #[validate(custom(function = "crate::util::not_blank", message = "Content is required"))]
    pub content: String,
    /// Tags to link. Ids that name no tag are skipped.
    pub tag_ids: Vec<i64>,
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default)]
pub struct UpdatePostRequest {
    #[validate(
        custom(function = "crate::util::not_blank", message = "Title is required"),
        length(max = 200, message = "Title must be at most 200 characters")
    )]
    pub title: String,
    #[validate(custom(function = "crate::util::not_blank", message = "Content is required"))]
    pub content: String,
    /// `Some` replaces the post's tags; `None` leaves them untouched.
    pub tag_ids: Option<Vec<i64>>,
}

/// Post with author, tags and comments resolved.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostResponse {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub author_id: i64,
    pub author: Option<AuthorSummary>,
    pub tags: Vec<Tag>,
    pub comments: Vec<CommentResponse>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}
