//! Database Integration Tests
//!
//! Run against a live `PostgreSQL` (`DATABASE_URL`); `#[sqlx::test]` applies
//! the migrations to a fresh database per test.

#[cfg(test)]
mod postgres_tests {
    use sqlx::PgPool;

    use super::super::*;
    use crate::permissions::Role;
    use crate::repository::{
        CommentRepository, PostRepository, RepositoryError, TagRepository, UserRepository,
    };

    // ========================================================================
    // User Tests
    // ========================================================================

    #[sqlx::test]
    #[ignore] // Requires PostgreSQL
    async fn test_create_and_find_user(pool: PgPool) {
        let store = PgStore::new(pool.clone());

        let (user, role) = store
            .create_account("testuser", "test@example.com", "hashed_password_123")
            .await
            .expect("Failed to create user");
        assert_eq!(user.username, "testuser");
        assert_eq!(role, Role::Admin, "first account is admin");

        let found = find_user_by_id(&pool, user.id)
            .await
            .expect("Query failed")
            .expect("User not found");
        assert_eq!(found.email, "test@example.com");

        let found = find_user_by_email(&pool, "test@example.com")
            .await
            .expect("Query failed")
            .expect("User not found");
        assert_eq!(found.id, user.id);

        assert!(email_exists(&pool, "test@example.com").await.expect("Query failed"));
        assert!(!email_exists(&pool, "other@example.com").await.expect("Query failed"));
    }

    #[sqlx::test]
    #[ignore] // Requires PostgreSQL
    async fn test_second_account_is_user(pool: PgPool) {
        let store = PgStore::new(pool);

        store
            .create_account("first", "first@example.com", "hash")
            .await
            .expect("Failed to create first user");
        let (second, role) = store
            .create_account("second", "second@example.com", "hash")
            .await
            .expect("Failed to create second user");

        assert_eq!(role, Role::User);
        assert_eq!(
            store.roles_for(second.id).await.expect("Query failed"),
            vec![Role::User]
        );
    }

    #[sqlx::test]
    #[ignore] // Requires PostgreSQL
    async fn test_email_uniqueness(pool: PgPool) {
        let store = PgStore::new(pool);

        store
            .create_account("one", "dup@example.com", "hash")
            .await
            .expect("Failed to create first user");
        let result = store.create_account("two", "dup@example.com", "hash").await;

        assert!(matches!(result, Err(RepositoryError::Conflict(_))));
    }

    #[sqlx::test]
    #[ignore] // Requires PostgreSQL
    async fn test_set_role_replaces_roles(pool: PgPool) {
        let store = PgStore::new(pool);
        let (user, _) = store
            .create_account("admin", "admin@example.com", "hash")
            .await
            .expect("Failed to create user");

        store
            .set_role(user.id, Role::Moderator)
            .await
            .expect("Failed to set role");

        assert_eq!(
            store.roles_for(user.id).await.expect("Query failed"),
            vec![Role::Moderator]
        );
    }

    // ========================================================================
    // Post / Comment Tests
    // ========================================================================

    #[sqlx::test]
    #[ignore] // Requires PostgreSQL
    async fn test_post_delete_cascades(pool: PgPool) {
        let store = PgStore::new(pool.clone());
        let (user, _) = store
            .create_account("author", "author@example.com", "hash")
            .await
            .expect("Failed to create user");

        let post = PostRepository::create(&store, user.id, "Title", "Body")
            .await
            .expect("Failed to create post");
        let tag = TagRepository::create(&store, "news")
            .await
            .expect("Failed to create tag");
        store
            .replace_tags(post.id, &[tag.id, 424_242])
            .await
            .expect("Failed to link tags");
        CommentRepository::create(&store, post.id, user.id, "First")
            .await
            .expect("Failed to create comment");

        let tags = find_tags_for_posts(&pool, &[post.id])
            .await
            .expect("Query failed");
        assert_eq!(tags.len(), 1, "unknown tag ids are skipped");

        assert!(delete_post(&pool, post.id).await.expect("Delete failed"));
        assert!(list_comments(&pool).await.expect("Query failed").is_empty());
        assert!(find_tag_by_id(&pool, tag.id)
            .await
            .expect("Query failed")
            .is_some());
    }

    #[sqlx::test]
    #[ignore] // Requires PostgreSQL
    async fn test_update_post_stamps_updated_at(pool: PgPool) {
        let store = PgStore::new(pool.clone());
        let (user, _) = store
            .create_account("author", "author@example.com", "hash")
            .await
            .expect("Failed to create user");
        let post = create_post(&pool, user.id, "Title", "Body")
            .await
            .expect("Failed to create post");
        assert!(post.updated_at.is_none());

        let updated = update_post(&pool, post.id, "New", "Text")
            .await
            .expect("Query failed")
            .expect("Post not found");

        assert_eq!(updated.title, "New");
        assert!(updated.updated_at.is_some());
    }

    // ========================================================================
    // Tag Tests
    // ========================================================================

    #[sqlx::test]
    #[ignore] // Requires PostgreSQL
    async fn test_tag_name_unique_ignoring_case(pool: PgPool) {
        let store = PgStore::new(pool.clone());

        TagRepository::create(&store, "Rust")
            .await
            .expect("Failed to create tag");
        let dup = TagRepository::create(&store, "rust").await;
        assert!(matches!(dup, Err(RepositoryError::Conflict(_))));

        let found = find_tag_by_name(&pool, "RUST")
            .await
            .expect("Query failed")
            .expect("Tag not found");
        assert_eq!(found.name, "Rust");
    }
}
