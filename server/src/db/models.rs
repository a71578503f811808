//! Database Models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::permissions::OwnedResource;

/// User model.
///
/// Not serializable: responses go through dedicated types so the password
/// hash never leaves the server.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// Post model.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Post {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub author_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl OwnedResource for Post {
    fn author_id(&self) -> i64 {
        self.author_id
    }
}

/// Comment model.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Comment {
    pub id: i64,
    pub content: String,
    pub post_id: i64,
    pub author_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl OwnedResource for Comment {
    fn author_id(&self) -> i64 {
        self.author_id
    }
}

/// Tag model.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Tag {
    pub id: i64,
    pub name: String,
}

/// Tag attached to a post (bulk lookup row).
#[derive(Debug, Clone, FromRow)]
pub struct PostTagRow {
    pub post_id: i64,
    pub tag_id: i64,
    pub name: String,
}

impl From<PostTagRow> for Tag {
    fn from(row: PostTagRow) -> Self {
        Self {
            id: row.tag_id,
            name: row.name,
        }
    }
}

/// Role assignment (bulk lookup row).
#[derive(Debug, Clone, FromRow)]
pub struct UserRoleRow {
    pub user_id: i64,
    pub name: String,
}
