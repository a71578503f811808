//! User request and response types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::db::User;
use crate::permissions::Role;

/// Public view of a user. Never includes the password hash.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub roles: Vec<Role>,
    pub created_at: DateTime<Utc>,
}

impl UserResponse {
    pub fn new(user: User, roles: Vec<Role>) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            roles,
            created_at: user.created_at,
        }
    }
}

/// Author shown next to posts and comments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorSummary {
    pub id: i64,
    pub username: String,
}

impl From<&User> for AuthorSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
        }
    }
}

/// Profile update.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default)]
pub struct UpdateUserRequest {
    #[validate(length(
        min = 3,
        max = 100,
        message = "Username must be between 3 and 100 characters"
    ))]
    pub username: String,
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
}

/// Role assignment. The name must match a role exactly.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct AssignRoleRequest {
    pub role: String,
}
