//! Repository Interfaces
//!
//! Storage seams for the resource services. Services receive a
//! [`Repositories`] bundle explicitly; nothing holds a shared unit of work.
//!
//! Two implementations exist:
//! - [`crate::db::PgStore`]: `PostgreSQL`, used by the server binary
//! - [`MemoryStore`]: in-process tables, used by tests

pub mod memory;

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::PgPool;

use crate::db::{Comment, PgStore, Post, PostTagRow, Tag, User};
use crate::permissions::Role;

pub use memory::MemoryStore;

/// Storage failure.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    /// A uniqueness constraint rejected the write.
    #[error("Already exists: {0}")]
    Conflict(String),

    /// Underlying database failure.
    #[error("Database error")]
    Database(#[from] sqlx::Error),
}

/// Result type for repository operations.
pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Users, roles and credentials.
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, id: i64) -> RepositoryResult<Option<User>>;

    async fn find_by_email(&self, email: &str) -> RepositoryResult<Option<User>>;

    /// Bulk lookup (avoids N+1 when resolving authors).
    async fn find_by_ids(&self, ids: &[i64]) -> RepositoryResult<Vec<User>>;

    async fn email_exists(&self, email: &str) -> RepositoryResult<bool>;

    /// All users, oldest first.
    async fn list(&self) -> RepositoryResult<Vec<User>>;

    async fn roles_for(&self, user_id: i64) -> RepositoryResult<Vec<Role>>;

    /// Roles for several users at once, as `(user_id, role)` pairs.
    async fn roles_for_users(&self, user_ids: &[i64]) -> RepositoryResult<Vec<(i64, Role)>>;

    /// Create a local account and assign its initial role.
    ///
    /// The first account on an empty store receives [`Role::Admin`], every
    /// later one [`Role::User`]. The check and the inserts are atomic.
    async fn create_account(
        &self,
        username: &str,
        email: &str,
        password_hash: &str,
    ) -> RepositoryResult<(User, Role)>;

    /// Returns `None` when the user does not exist.
    async fn update_profile(
        &self,
        id: i64,
        username: &str,
        email: &str,
    ) -> RepositoryResult<Option<User>>;

    /// Replace the user's role set with a single role.
    async fn set_role(&self, user_id: i64, role: Role) -> RepositoryResult<()>;

    /// Returns `false` when nothing was deleted.
    async fn delete(&self, id: i64) -> RepositoryResult<bool>;
}

/// Posts and their tag links.
#[async_trait]
pub trait PostRepository: Send + Sync {
    async fn create(&self, author_id: i64, title: &str, content: &str) -> RepositoryResult<Post>;

    async fn find_by_id(&self, id: i64) -> RepositoryResult<Option<Post>>;

    /// All posts, newest first.
    async fn list(&self) -> RepositoryResult<Vec<Post>>;

    /// Replace title and content and stamp `updated_at`.
    async fn update(&self, id: i64, title: &str, content: &str) -> RepositoryResult<Option<Post>>;

    async fn delete(&self, id: i64) -> RepositoryResult<bool>;

    /// Tags linked to any of the given posts.
    async fn tags_for_posts(&self, post_ids: &[i64]) -> RepositoryResult<Vec<PostTagRow>>;

    /// Replace the post's tag links. Ids that name no tag are skipped.
    async fn replace_tags(&self, post_id: i64, tag_ids: &[i64]) -> RepositoryResult<()>;
}

/// Comments on posts.
#[async_trait]
pub trait CommentRepository: Send + Sync {
    async fn create(&self, post_id: i64, author_id: i64, content: &str)
        -> RepositoryResult<Comment>;

    async fn find_by_id(&self, id: i64) -> RepositoryResult<Option<Comment>>;

    /// All comments, newest first.
    async fn list(&self) -> RepositoryResult<Vec<Comment>>;

    /// Comments on any of the given posts, newest first.
    async fn list_for_posts(&self, post_ids: &[i64]) -> RepositoryResult<Vec<Comment>>;

    /// Replace content and stamp `updated_at`.
    async fn update(&self, id: i64, content: &str) -> RepositoryResult<Option<Comment>>;

    async fn delete(&self, id: i64) -> RepositoryResult<bool>;
}

/// Tags.
#[async_trait]
pub trait TagRepository: Send + Sync {
    async fn find_by_id(&self, id: i64) -> RepositoryResult<Option<Tag>>;

    /// Case-insensitive name lookup.
    async fn find_by_name(&self, name: &str) -> RepositoryResult<Option<Tag>>;

    /// All tags ordered by name.
    async fn list(&self) -> RepositoryResult<Vec<Tag>>;

    /// Fails with [`RepositoryError::Conflict`] if the name is taken
    /// (case-insensitive).
    async fn create(&self, name: &str) -> RepositoryResult<Tag>;

    async fn rename(&self, id: i64, name: &str) -> RepositoryResult<Option<Tag>>;

    async fn delete(&self, id: i64) -> RepositoryResult<bool>;
}

/// Repository bundle handed to services.
#[derive(Clone)]
pub struct Repositories {
    pub users: Arc<dyn UserRepository>,
    pub posts: Arc<dyn PostRepository>,
    pub comments: Arc<dyn CommentRepository>,
    pub tags: Arc<dyn TagRepository>,
}

impl Repositories {
    /// Repositories backed by `PostgreSQL`.
    #[must_use]
    pub fn postgres(pool: PgPool) -> Self {
        let store = PgStore::new(pool);
        Self {
            users: Arc::new(store.clone()),
            posts: Arc::new(store.clone()),
            comments: Arc::new(store.clone()),
            tags: Arc::new(store),
        }
    }

    /// Repositories backed by a fresh in-memory store.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::from_memory(&MemoryStore::default())
    }

    /// Repositories sharing an existing in-memory store.
    #[must_use]
    pub fn from_memory(store: &MemoryStore) -> Self {
        Self {
            users: Arc::new(store.clone()),
            posts: Arc::new(store.clone()),
            comments: Arc::new(store.clone()),
            tags: Arc::new(store.clone()),
        }
    }
}
