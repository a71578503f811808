//! `PostgreSQL` implementation of the repository traits.

use std::str::FromStr;

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::warn;

use super::models::{Comment, Post, PostTagRow, Tag, User, UserRoleRow};
use super::queries;
use crate::permissions::Role;
use crate::repository::{
    CommentRepository, PostRepository, RepositoryError, RepositoryResult, TagRepository,
    UserRepository,
};

/// Advisory lock key serializing registrations (see the seed registry in `db`).
const USER_REGISTER_LOCK: i64 = 61;

/// Map a unique-constraint violation to [`RepositoryError::Conflict`].
fn conflict_on_unique(what: String) -> impl FnOnce(sqlx::Error) -> RepositoryError {
    move |e| {
        let unique = e
            .as_database_error()
            .is_some_and(|d| d.is_unique_violation());
        if unique {
            RepositoryError::Conflict(what)
        } else {
            RepositoryError::Database(e)
        }
    }
}

fn parse_roles(rows: Vec<UserRoleRow>) -> Vec<(i64, Role)> {
    rows.into_iter()
        .filter_map(|row| match Role::from_str(&row.name) {
            Ok(role) => Some((row.user_id, role)),
            Err(e) => {
                warn!(user_id = row.user_id, error = %e, "Ignoring unknown role");
                None
            }
        })
        .collect()
}

/// Repository backed by a `PostgreSQL` pool.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PgStore {
    async fn find_by_id(&self, id: i64) -> RepositoryResult<Option<User>> {
        Ok(queries::find_user_by_id(&self.pool, id).await?)
    }

    async fn find_by_email(&self, email: &str) -> RepositoryResult<Option<User>> {
        Ok(queries::find_user_by_email(&self.pool, email).await?)
    }

    async fn find_by_ids(&self, ids: &[i64]) -> RepositoryResult<Vec<User>> {
        Ok(queries::find_users_by_ids(&self.pool, ids).await?)
    }

    async fn email_exists(&self, email: &str) -> RepositoryResult<bool> {
        Ok(queries::email_exists(&self.pool, email).await?)
    }

    async fn list(&self) -> RepositoryResult<Vec<User>> {
        Ok(queries::list_users(&self.pool).await?)
    }

    async fn roles_for(&self, user_id: i64) -> RepositoryResult<Vec<Role>> {
        let rows = queries::find_roles_for_users(&self.pool, &[user_id]).await?;
        Ok(parse_roles(rows).into_iter().map(|(_, role)| role).collect())
    }

    async fn roles_for_users(&self, user_ids: &[i64]) -> RepositoryResult<Vec<(i64, Role)>> {
        let rows = queries::find_roles_for_users(&self.pool, user_ids).await?;
        Ok(parse_roles(rows))
    }

    async fn create_account(
        &self,
        username: &str,
        email: &str,
        password_hash: &str,
    ) -> RepositoryResult<(User, Role)> {
        let mut tx = self.pool.begin().await?;

        // Serializes concurrent registrations until commit so two callers
        // cannot both observe an empty users table.
        sqlx::query("SELECT pg_advisory_xact_lock($1)")
            .bind(USER_REGISTER_LOCK)
            .execute(&mut *tx)
            .await?;

        let role = if queries::count_users(&mut tx).await? == 0 {
            Role::Admin
        } else {
            Role::User
        };

        let user = queries::insert_user(&mut tx, username, email, password_hash)
            .await
            .map_err(conflict_on_unique(format!("email {email}")))?;
        queries::grant_role(&mut tx, user.id, role.as_str()).await?;

        tx.commit().await.map_err(|e| {
            tracing::error!(
                error = %e,
                username = %username,
                "Failed to commit registration transaction - user account rolled back"
            );
            e
        })?;

        Ok((user, role))
    }

    async fn update_profile(
        &self,
        id: i64,
        username: &str,
        email: &str,
    ) -> RepositoryResult<Option<User>> {
        queries::update_user_profile(&self.pool, id, username, email)
            .await
            .map_err(conflict_on_unique(format!("email {email}")))
    }

    async fn set_role(&self, user_id: i64, role: Role) -> RepositoryResult<()> {
        let mut tx = self.pool.begin().await?;
        queries::clear_roles(&mut tx, user_id).await?;
        queries::grant_role(&mut tx, user_id, role.as_str()).await?;
        tx.commit().await?;
        Ok(())
    }

    async fn delete(&self, id: i64) -> RepositoryResult<bool> {
        Ok(queries::delete_user(&self.pool, id).await?)
    }
}

#[async_trait]
impl PostRepository for PgStore {
    async fn create(&self, author_id: i64, title: &str, content: &str) -> RepositoryResult<Post> {
        Ok(queries::create_post(&self.pool, author_id, title, content).await?)
    }

    async fn find_by_id(&self, id: i64) -> RepositoryResult<Option<Post>> {
        Ok(queries::find_post_by_id(&self.pool, id).await?)
    }

    async fn list(&self) -> RepositoryResult<Vec<Post>> {
        Ok(queries::list_posts(&self.pool).await?)
    }

    async fn update(&self, id: i64, title: &str, content: &str) -> RepositoryResult<Option<Post>> {
        Ok(queries::update_post(&self.pool, id, title, content).await?)
    }

    async fn delete(&self, id: i64) -> RepositoryResult<bool> {
        Ok(queries::delete_post(&self.pool, id).await?)
    }

    async fn tags_for_posts(&self, post_ids: &[i64]) -> RepositoryResult<Vec<PostTagRow>> {
        Ok(queries::find_tags_for_posts(&self.pool, post_ids).await?)
    }

    async fn replace_tags(&self, post_id: i64, tag_ids: &[i64]) -> RepositoryResult<()> {
        let mut tx = self.pool.begin().await?;
        queries::clear_post_tags(&mut tx, post_id).await?;
        queries::link_post_tags(&mut tx, post_id, tag_ids).await?;
        tx.commit().await?;
        Ok(())
    }
}

#[async_trait]
impl CommentRepository for PgStore {
    async fn create(
        &self,
        post_id: i64,
        author_id: i64,
        content: &str,
    ) -> RepositoryResult<Comment> {
        Ok(queries::create_comment(&self.pool, post_id, author_id, content).await?)
    }

    async fn find_by_id(&self, id: i64) -> RepositoryResult<Option<Comment>> {
        Ok(queries::find_comment_by_id(&self.pool, id).await?)
    }

    async fn list(&self) -> RepositoryResult<Vec<Comment>> {
        Ok(queries::list_comments(&self.pool).await?)
    }

    async fn list_for_posts(&self, post_ids: &[i64]) -> RepositoryResult<Vec<Comment>> {
        Ok(queries::list_comments_for_posts(&self.pool, post_ids).await?)
    }

    async fn update(&self, id: i64, content: &str) -> RepositoryResult<Option<Comment>> {
        Ok(queries::update_comment(&self.pool, id, content).await?)
    }

    async fn delete(&self, id: i64) -> RepositoryResult<bool> {
        Ok(queries::delete_comment(&self.pool, id).await?)
    }
}

#[async_trait]
impl TagRepository for PgStore {
    async fn find_by_id(&self, id: i64) -> RepositoryResult<Option<Tag>> {
        Ok(queries::find_tag_by_id(&self.pool, id).await?)
    }

    async fn find_by_name(&self, name: &str) -> RepositoryResult<Option<Tag>> {
        Ok(queries::find_tag_by_name(&self.pool, name).await?)
    }

    async fn list(&self) -> RepositoryResult<Vec<Tag>> {
        Ok(queries::list_tags(&self.pool).await?)
    }

    async fn create(&self, name: &str) -> RepositoryResult<Tag> {
        queries::create_tag(&self.pool, name)
            .await
            .map_err(conflict_on_unique(format!("tag {name}")))
    }

    async fn rename(&self, id: i64, name: &str) -> RepositoryResult<Option<Tag>> {
        queries::rename_tag(&self.pool, id, name)
            .await
            .map_err(conflict_on_unique(format!("tag {name}")))
    }

    async fn delete(&self, id: i64) -> RepositoryResult<bool> {
        Ok(queries::delete_tag(&self.pool, id).await?)
    }
}
