//! Database Queries
//!
//! Runtime queries (no compile-time `DATABASE_URL` required).
//!
//! All query functions include error context logging to aid debugging.

use sqlx::{PgConnection, PgPool};
use tracing::error;

use super::models::{Comment, Post, PostTagRow, Tag, User, UserRoleRow};

/// Log and return a database error with context.
macro_rules! db_error {
    ($query:expr) => {
        |e| {
            error!(query = $query, error = %e, "Database query failed");
            e
        }
    };
    ($query:expr, $($field:tt)*) => {
        |e| {
            error!(query = $query, $($field)*, error = %e, "Database query failed");
            e
        }
    };
}

// ============================================================================
// Users
// ============================================================================

/// Find user by ID.
pub async fn find_user_by_id(pool: &PgPool, id: i64) -> sqlx::Result<Option<User>> {
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
        .map_err(db_error!("find_user_by_id", user_id = id))
}

/// Find user by email.
pub async fn find_user_by_email(pool: &PgPool, email: &str) -> sqlx::Result<Option<User>> {
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
        .bind(email)
        .fetch_optional(pool)
        .await
        .map_err(db_error!("find_user_by_email", email = %email))
}

/// Find multiple users by IDs (bulk lookup to avoid N+1 queries).
pub async fn find_users_by_ids(pool: &PgPool, ids: &[i64]) -> sqlx::Result<Vec<User>> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ANY($1)")
        .bind(ids)
        .fetch_all(pool)
        .await
        .map_err(db_error!("find_users_by_ids", count = ids.len()))
}

/// Check if email exists.
pub async fn email_exists(pool: &PgPool, email: &str) -> sqlx::Result<bool> {
    let result: (bool,) = sqlx::query_as("SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)")
        .bind(email)
        .fetch_one(pool)
        .await
        .map_err(db_error!("email_exists", email = %email))?;

    Ok(result.0)
}

/// All users, oldest first.
pub async fn list_users(pool: &PgPool) -> sqlx::Result<Vec<User>> {
    sqlx::query_as::<_, User>("SELECT * FROM users ORDER BY id")
        .fetch_all(pool)
        .await
        .map_err(db_error!("list_users"))
}

/// Count registered users.
pub async fn count_users(conn: &mut PgConnection) -> sqlx::Result<i64> {
    sqlx::query_scalar("SELECT COUNT(*) FROM users")
        .fetch_one(conn)
        .await
        .map_err(db_error!("count_users"))
}

/// Insert a user row.
pub async fn insert_user(
    conn: &mut PgConnection,
    username: &str,
    email: &str,
    password_hash: &str,
) -> sqlx::Result<User> {
    sqlx::query_as::<_, User>(
        r"INSERT INTO users (username, email, password_hash)
          VALUES ($1, $2, $3)
          RETURNING *",
    )
    .bind(username)
    .bind(email)
    .bind(password_hash)
    .fetch_one(conn)
    .await
    .map_err(db_error!("insert_user", username = %username))
}

/// Update username and email.
pub async fn update_user_profile(
    pool: &PgPool,
    id: i64,
    username: &str,
    email: &str,
) -> sqlx::Result<Option<User>> {
    sqlx::query_as::<_, User>(
        "UPDATE users SET username = $2, email = $3 WHERE id = $1 RETURNING *",
    )
    .bind(id)
    .bind(username)
    .bind(email)
    .fetch_optional(pool)
    .await
    .map_err(db_error!("update_user_profile", user_id = id))
}

/// Delete a user. Posts, comments and role links cascade.
pub async fn delete_user(pool: &PgPool, id: i64) -> sqlx::Result<bool> {
    let result = sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await
        .map_err(db_error!("delete_user", user_id = id))?;

    Ok(result.rows_affected() > 0)
}

// ============================================================================
// Roles
// ============================================================================

/// Role names held by the given users.
pub async fn find_roles_for_users(
    pool: &PgPool,
    user_ids: &[i64],
) -> sqlx::Result<Vec<UserRoleRow>> {
    if user_ids.is_empty() {
        return Ok(Vec::new());
    }

    sqlx::query_as::<_, UserRoleRow>(
        r"SELECT ur.user_id, r.name
          FROM user_roles ur
          JOIN roles r ON r.id = ur.role_id
          WHERE ur.user_id = ANY($1)
          ORDER BY ur.user_id, r.name",
    )
    .bind(user_ids)
    .fetch_all(pool)
    .await
    .map_err(db_error!("find_roles_for_users", count = user_ids.len()))
}

/// Link a user to the role with the given name.
pub async fn grant_role(conn: &mut PgConnection, user_id: i64, role: &str) -> sqlx::Result<()> {
    sqlx::query(
        r"INSERT INTO user_roles (user_id, role_id)
          SELECT $1, id FROM roles WHERE name = $2
          ON CONFLICT DO NOTHING",
    )
    .bind(user_id)
    .bind(role)
    .execute(conn)
    .await
    .map_err(db_error!("grant_role", user_id = user_id, role = %role))?;

    Ok(())
}

/// Remove every role link of a user.
pub async fn clear_roles(conn: &mut PgConnection, user_id: i64) -> sqlx::Result<()> {
    sqlx::query("DELETE FROM user_roles WHERE user_id = $1")
        .bind(user_id)
        .execute(conn)
        .await
        .map_err(db_error!("clear_roles", user_id = user_id))?;

    Ok(())
}

// ============================================================================
// Posts
// ============================================================================

/// Create a post.
pub async fn create_post(
    pool: &PgPool,
    author_id: i64,
    title: &str,
    content: &str,
) -> sqlx::Result<Post> {
    sqlx::query_as::<_, Post>(
        r"INSERT INTO posts (title, content, author_id)
          VALUES ($1, $2, $3)
          RETURNING *",
    )
    .bind(title)
    .bind(content)
    .bind(author_id)
    .fetch_one(pool)
    .await
    .map_err(db_error!("create_post", author_id = author_id))
}

/// Find post by ID.
pub async fn find_post_by_id(pool: &PgPool, id: i64) -> sqlx::Result<Option<Post>> {
    sqlx::query_as::<_, Post>("SELECT * FROM posts WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
        .map_err(db_error!("find_post_by_id", post_id = id))
}

/// All posts, newest first.
pub async fn list_posts(pool: &PgPool) -> sqlx::Result<Vec<Post>> {
    sqlx::query_as::<_, Post>("SELECT * FROM posts ORDER BY created_at DESC, id DESC")
        .fetch_all(pool)
        .await
        .map_err(db_error!("list_posts"))
}

/// Replace title and content.
pub async fn update_post(
    pool: &PgPool,
    id: i64,
    title: &str,
    content: &str,
) -> sqlx::Result<Option<Post>> {
    sqlx::query_as::<_, Post>(
        r"UPDATE posts SET title = $2, content = $3, updated_at = NOW()
          WHERE id = $1
          RETURNING *",
    )
    .bind(id)
    .bind(title)
    .bind(content)
    .fetch_optional(pool)
    .await
    .map_err(db_error!("update_post", post_id = id))
}

/// Delete a post. Comments and tag links cascade.
pub async fn delete_post(pool: &PgPool, id: i64) -> sqlx::Result<bool> {
    let result = sqlx::query("DELETE FROM posts WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await
        .map_err(db_error!("delete_post", post_id = id))?;

    Ok(result.rows_affected() > 0)
}

/// Tags linked to any of the given posts.
pub async fn find_tags_for_posts(
    pool: &PgPool,
    post_ids: &[i64],
) -> sqlx::Result<Vec<PostTagRow>> {
    if post_ids.is_empty() {
        return Ok(Vec::new());
    }

    sqlx::query_as::<_, PostTagRow>(
        r"SELECT pt.post_id, t.id AS tag_id, t.name
          FROM post_tags pt
          JOIN tags t ON t.id = pt.tag_id
          WHERE pt.post_id = ANY($1)
          ORDER BY t.name",
    )
    .bind(post_ids)
    .fetch_all(pool)
    .await
    .map_err(db_error!("find_tags_for_posts", count = post_ids.len()))
}

/// Remove all tag links of a post.
pub async fn clear_post_tags(conn: &mut PgConnection, post_id: i64) -> sqlx::Result<()> {
    sqlx::query("DELETE FROM post_tags WHERE post_id = $1")
        .bind(post_id)
        .execute(conn)
        .await
        .map_err(db_error!("clear_post_tags", post_id = post_id))?;

    Ok(())
}

/// Link a post to existing tags. Ids that name no tag are skipped.
pub async fn link_post_tags(
    conn: &mut PgConnection,
    post_id: i64,
    tag_ids: &[i64],
) -> sqlx::Result<()> {
    if tag_ids.is_empty() {
        return Ok(());
    }

    sqlx::query(
        r"INSERT INTO post_tags (post_id, tag_id)
          SELECT $1, id FROM tags WHERE id = ANY($2)
          ON CONFLICT DO NOTHING",
    )
    .bind(post_id)
    .bind(tag_ids)
    .execute(conn)
    .await
    .map_err(db_error!("link_post_tags", post_id = post_id))?;

    Ok(())
}

// ============================================================================
// Comments
// ============================================================================

/// Create a comment.
pub async fn create_comment(
    pool: &PgPool,
    post_id: i64,
    author_id: i64,
    content: &str,
) -> sqlx::Result<Comment> {
    sqlx::query_as::<_, Comment>(
        r"INSERT INTO comments (content, post_id, author_id)
          VALUES ($1, $2, $3)
          RETURNING *",
    )
    .bind(content)
    .bind(post_id)
    .bind(author_id)
    .fetch_one(pool)
    .await
    .map_err(db_error!("create_comment", post_id = post_id, author_id = author_id))
}

/// Find comment by ID.
pub async fn find_comment_by_id(pool: &PgPool, id: i64) -> sqlx::Result<Option<Comment>> {
    sqlx::query_as::<_, Comment>("SELECT * FROM comments WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
        .map_err(db_error!("find_comment_by_id", comment_id = id))
}

/// All comments, newest first.
pub async fn list_comments(pool: &PgPool) -> sqlx::Result<Vec<Comment>> {
    sqlx::query_as::<_, Comment>("SELECT * FROM comments ORDER BY created_at DESC, id DESC")
        .fetch_all(pool)
        .await
        .map_err(db_error!("list_comments"))
}

/// Comments on any of the given posts, newest first.
pub async fn list_comments_for_posts(
    pool: &PgPool,
    post_ids: &[i64],
) -> sqlx::Result<Vec<Comment>> {
    if post_ids.is_empty() {
        return Ok(Vec::new());
    }

    sqlx::query_as::<_, Comment>(
        r"SELECT * FROM comments
          WHERE post_id = ANY($1)
          ORDER BY created_at DESC, id DESC",
    )
    .bind(post_ids)
    .fetch_all(pool)
    .await
    .map_err(db_error!("list_comments_for_posts", count = post_ids.len()))
}

/// Replace comment content.
pub async fn update_comment(
    pool: &PgPool,
    id: i64,
    content: &str,
) -> sqlx::Result<Option<Comment>> {
    sqlx::query_as::<_, Comment>(
        r"UPDATE comments SET content = $2, updated_at = NOW()
          WHERE id = $1
          RETURNING *",
    )
    .bind(id)
    .bind(content)
    .fetch_optional(pool)
    .await
    .map_err(db_error!("update_comment", comment_id = id))
}

/// Delete a comment.
pub async fn delete_comment(pool: &PgPool, id: i64) -> sqlx::Result<bool> {
    let result = sqlx::query("DELETE FROM comments WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await
        .map_err(db_error!("delete_comment", comment_id = id))?;

    Ok(result.rows_affected() > 0)
}

// ============================================================================
// Tags
// ============================================================================

/// Find tag by ID.
pub async fn find_tag_by_id(pool: &PgPool, id: i64) -> sqlx::Result<Option<Tag>> {
    sqlx::query_as::<_, Tag>("SELECT id, name FROM tags WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
        .map_err(db_error!("find_tag_by_id", tag_id = id))
}

/// Find tag by name, ignoring case.
pub async fn find_tag_by_name(pool: &PgPool, name: &str) -> sqlx::Result<Option<Tag>> {
    sqlx::query_as::<_, Tag>("SELECT id, name FROM tags WHERE LOWER(name) = LOWER($1)")
        .bind(name)
        .fetch_optional(pool)
        .await
        .map_err(db_error!("find_tag_by_name", name = %name))
}

/// All tags ordered by name.
pub async fn list_tags(pool: &PgPool) -> sqlx::Result<Vec<Tag>> {
    sqlx::query_as::<_, Tag>("SELECT id, name FROM tags ORDER BY name, id")
        .fetch_all(pool)
        .await
        .map_err(db_error!("list_tags"))
}

/// Create a tag. Fails on the case-insensitive unique index if the name is taken.
pub async fn create_tag(pool: &PgPool, name: &str) -> sqlx::Result<Tag> {
    sqlx::query_as::<_, Tag>("INSERT INTO tags (name) VALUES ($1) RETURNING id, name")
        .bind(name)
        .fetch_one(pool)
        .await
        .map_err(db_error!("create_tag", name = %name))
}

/// Rename a tag.
pub async fn rename_tag(pool: &PgPool, id: i64, name: &str) -> sqlx::Result<Option<Tag>> {
    sqlx::query_as::<_, Tag>("UPDATE tags SET name = $2 WHERE id = $1 RETURNING id, name")
        .bind(id)
        .bind(name)
        .fetch_optional(pool)
        .await
        .map_err(db_error!("rename_tag", tag_id = id))
}

/// Delete a tag. Post links cascade.
pub async fn delete_tag(pool: &PgPool, id: i64) -> sqlx::Result<bool> {
    let result = sqlx::query("DELETE FROM tags WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await
        .map_err(db_error!("delete_tag", tag_id = id))?;

    Ok(result.rows_affected() > 0)
}
