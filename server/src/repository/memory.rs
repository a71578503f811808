//! In-memory repository implementation.
//!
//! Mirrors the `PostgreSQL` schema closely enough for service and HTTP tests:
//! sequential ids, case-insensitive tag names, unique emails and cascading
//! deletes.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use super::{
    CommentRepository, PostRepository, RepositoryError, RepositoryResult, TagRepository,
    UserRepository,
};
use crate::db::{Comment, Post, PostTagRow, Tag, User};
use crate::permissions::Role;

#[derive(Debug, Default)]
struct Tables {
    next_id: i64,
    users: BTreeMap<i64, User>,
    user_roles: BTreeMap<i64, BTreeSet<Role>>,
    posts: BTreeMap<i64, Post>,
    comments: BTreeMap<i64, Comment>,
    tags: BTreeMap<i64, Tag>,
    post_tags: BTreeSet<(i64, i64)>,
}

impl Tables {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn tag_name_taken(&self, name: &str, except: Option<i64>) -> bool {
        let lowered = name.to_lowercase();
        self.tags
            .values()
            .any(|t| Some(t.id) != except && t.name.to_lowercase() == lowered)
    }

    fn remove_post(&mut self, post_id: i64) {
        self.posts.remove(&post_id);
        self.comments.retain(|_, c| c.post_id != post_id);
        self.post_tags.retain(|(p, _)| *p != post_id);
    }
}

/// Newest first; ids break ties between rows created in the same instant.
fn newest_first<T>(rows: &mut [T], key: impl Fn(&T) -> (chrono::DateTime<Utc>, i64)) {
    rows.sort_by(|a, b| key(b).cmp(&key(a)));
}

/// Process-local store implementing every repository trait.
///
/// Clones share the same tables.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    tables: Arc<RwLock<Tables>>,
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn find_by_id(&self, id: i64) -> RepositoryResult<Option<User>> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> RepositoryResult<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables.users.values().find(|u| u.email == email).cloned())
    }

    async fn find_by_ids(&self, ids: &[i64]) -> RepositoryResult<Vec<User>> {
        let tables = self.tables.read().await;
        Ok(ids
            .iter()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .filter_map(|id| tables.users.get(id).cloned())
            .collect())
    }

    async fn email_exists(&self, email: &str) -> RepositoryResult<bool> {
        let tables = self.tables.read().await;
        Ok(tables.users.values().any(|u| u.email == email))
    }

    async fn list(&self) -> RepositoryResult<Vec<User>> {
        Ok(self.tables.read().await.users.values().cloned().collect())
    }

    async fn roles_for(&self, user_id: i64) -> RepositoryResult<Vec<Role>> {
        let tables = self.tables.read().await;
        Ok(tables
            .user_roles
            .get(&user_id)
            .map(|roles| roles.iter().copied().collect())
            .unwrap_or_default())
    }

    async fn roles_for_users(&self, user_ids: &[i64]) -> RepositoryResult<Vec<(i64, Role)>> {
        let tables = self.tables.read().await;
        Ok(user_ids
            .iter()
            .filter_map(|id| tables.user_roles.get(id).map(|roles| (*id, roles)))
            .flat_map(|(id, roles)| roles.iter().map(move |role| (id, *role)))
            .collect())
    }

    async fn create_account(
        &self,
        username: &str,
        email: &str,
        password_hash: &str,
    ) -> RepositoryResult<(User, Role)> {
        let mut tables = self.tables.write().await;
        if tables.users.values().any(|u| u.email == email) {
            return Err(RepositoryError::Conflict(format!("email {email}")));
        }

        let role = if tables.users.is_empty() {
            Role::Admin
        } else {
            Role::User
        };

        let user = User {
            id: tables.next_id(),
            username: username.to_string(),
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            created_at: Utc::now(),
        };
        tables.users.insert(user.id, user.clone());
        tables.user_roles.insert(user.id, BTreeSet::from([role]));

        Ok((user, role))
    }

    async fn update_profile(
        &self,
        id: i64,
        username: &str,
        email: &str,
    ) -> RepositoryResult<Option<User>> {
        let mut tables = self.tables.write().await;
        if tables.users.values().any(|u| u.id != id && u.email == email) {
            return Err(RepositoryError::Conflict(format!("email {email}")));
        }

        Ok(tables.users.get_mut(&id).map(|user| {
            user.username = username.to_string();
            user.email = email.to_string();
            user.clone()
        }))
    }

    async fn set_role(&self, user_id: i64, role: Role) -> RepositoryResult<()> {
        let mut tables = self.tables.write().await;
        if tables.users.contains_key(&user_id) {
            tables.user_roles.insert(user_id, BTreeSet::from([role]));
        }
        Ok(())
    }

    async fn delete(&self, id: i64) -> RepositoryResult<bool> {
        let mut tables = self.tables.write().await;
        if tables.users.remove(&id).is_none() {
            return Ok(false);
        }

        tables.user_roles.remove(&id);
        let owned_posts: Vec<i64> = tables
            .posts
            .values()
            .filter(|p| p.author_id == id)
            .map(|p| p.id)
            .collect();
        for post_id in owned_posts {
            tables.remove_post(post_id);
        }
        tables.comments.retain(|_, c| c.author_id != id);

        Ok(true)
    }
}

#[async_trait]
impl PostRepository for MemoryStore {
    async fn create(&self, author_id: i64, title: &str, content: &str) -> RepositoryResult<Post> {
        let mut tables = self.tables.write().await;
        let post = Post {
            id: tables.next_id(),
            title: title.to_string(),
            content: content.to_string(),
            author_id,
            created_at: Utc::now(),
            updated_at: None,
        };
        tables.posts.insert(post.id, post.clone());
        Ok(post)
    }

    async fn find_by_id(&self, id: i64) -> RepositoryResult<Option<Post>> {
        Ok(self.tables.read().await.posts.get(&id).cloned())
    }

    async fn list(&self) -> RepositoryResult<Vec<Post>> {
        let mut posts: Vec<Post> = self.tables.read().await.posts.values().cloned().collect();
        newest_first(&mut posts, |p| (p.created_at, p.id));
        Ok(posts)
    }

    async fn update(&self, id: i64, title: &str, content: &str) -> RepositoryResult<Option<Post>> {
        let mut tables = self.tables.write().await;
        Ok(tables.posts.get_mut(&id).map(|post| {
            post.title = title.to_string();
            post.content = content.to_string();
            post.updated_at = Some(Utc::now());
            post.clone()
        }))
    }

    async fn delete(&self, id: i64) -> RepositoryResult<bool> {
        let mut tables = self.tables.write().await;
        if !tables.posts.contains_key(&id) {
            return Ok(false);
        }
        tables.remove_post(id);
        Ok(true)
    }

    async fn tags_for_posts(&self, post_ids: &[i64]) -> RepositoryResult<Vec<PostTagRow>> {
        let tables = self.tables.read().await;
        let mut rows: Vec<PostTagRow> = tables
            .post_tags
            .iter()
            .filter(|(post_id, _)| post_ids.contains(post_id))
            .filter_map(|(post_id, tag_id)| {
                tables.tags.get(tag_id).map(|tag| PostTagRow {
                    post_id: *post_id,
                    tag_id: tag.id,
                    name: tag.name.clone(),
                })
            })
            .collect();
        rows.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(rows)
    }

    async fn replace_tags(&self, post_id: i64, tag_ids: &[i64]) -> RepositoryResult<()> {
        let mut tables = self.tables.write().await;
        tables.post_tags.retain(|(p, _)| *p != post_id);
        let known: Vec<i64> = tag_ids
            .iter()
            .copied()
            .filter(|id| tables.tags.contains_key(id))
            .collect();
        for tag_id in known {
            tables.post_tags.insert((post_id, tag_id));
        }
        Ok(())
    }
}

#[async_trait]
impl CommentRepository for MemoryStore {
    async fn create(
        &self,
        post_id: i64,
        author_id: i64,
        content: &str,
    ) -> RepositoryResult<Comment> {
        let mut tables = self.tables.write().await;
        let comment = Comment {
            id: tables.next_id(),
            content: content.to_string(),
            post_id,
            author_id,
            created_at: Utc::now(),
            updated_at: None,
        };
        tables.comments.insert(comment.id, comment.clone());
        Ok(comment)
    }

    async fn find_by_id(&self, id: i64) -> RepositoryResult<Option<Comment>> {
        Ok(self.tables.read().await.comments.get(&id).cloned())
    }

    async fn list(&self) -> RepositoryResult<Vec<Comment>> {
        let mut comments: Vec<Comment> =
            self.tables.read().await.comments.values().cloned().collect();
        newest_first(&mut comments, |c| (c.created_at, c.id));
        Ok(comments)
    }

    async fn list_for_posts(&self, post_ids: &[i64]) -> RepositoryResult<Vec<Comment>> {
        let mut comments: Vec<Comment> = self
            .tables
            .read()
            .await
            .comments
            .values()
            .filter(|c| post_ids.contains(&c.post_id))
            .cloned()
            .collect();
        newest_first(&mut comments, |c| (c.created_at, c.id));
        Ok(comments)
    }

    async fn update(&self, id: i64, content: &str) -> RepositoryResult<Option<Comment>> {
        let mut tables = self.tables.write().await;
        Ok(tables.comments.get_mut(&id).map(|comment| {
            comment.content = content.to_string();
            comment.updated_at = Some(Utc::now());
            comment.clone()
        }))
    }

    async fn delete(&self, id: i64) -> RepositoryResult<bool> {
        Ok(self.tables.write().await.comments.remove(&id).is_some())
    }
}

#[async_trait]
impl TagRepository for MemoryStore {
    async fn find_by_id(&self, id: i64) -> RepositoryResult<Option<Tag>> {
        Ok(self.tables.read().await.tags.get(&id).cloned())
    }

    async fn find_by_name(&self, name: &str) -> RepositoryResult<Option<Tag>> {
        let lowered = name.to_lowercase();
        let tables = self.tables.read().await;
        Ok(tables
            .tags
            .values()
            .find(|t| t.name.to_lowercase() == lowered)
            .cloned())
    }

    async fn list(&self) -> RepositoryResult<Vec<Tag>> {
        let mut tags: Vec<Tag> = self.tables.read().await.tags.values().cloned().collect();
        tags.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(tags)
    }

    async fn create(&self, name: &str) -> RepositoryResult<Tag> {
        let mut tables = self.tables.write().await;
        if tables.tag_name_taken(name, None) {
            return Err(RepositoryError::Conflict(format!("tag {name}")));
        }
        let tag = Tag {
            id: tables.next_id(),
            name: name.to_string(),
        };
        tables.tags.insert(tag.id, tag.clone());
        Ok(tag)
    }

    async fn rename(&self, id: i64, name: &str) -> RepositoryResult<Option<Tag>> {
        let mut tables = self.tables.write().await;
        if tables.tag_name_taken(name, Some(id)) {
            return Err(RepositoryError::Conflict(format!("tag {name}")));
        }
        Ok(tables.tags.get_mut(&id).map(|tag| {
            tag.name = name.to_string();
            tag.clone()
        }))
    }

    async fn delete(&self, id: i64) -> RepositoryResult<bool> {
        let mut tables = self.tables.write().await;
        if tables.tags.remove(&id).is_none() {
            return Ok(false);
        }
        tables.post_tags.retain(|(_, t)| *t != id);
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_first_account_is_admin() {
        let store = MemoryStore::default();

        let (first, first_role) = store
            .create_account("alice", "alice@example.com", "hash")
            .await
            .unwrap();
        let (_, second_role) = store
            .create_account("bob", "bob@example.com", "hash")
            .await
            .unwrap();

        assert_eq!(first_role, Role::Admin);
        assert_eq!(second_role, Role::User);
        assert_eq!(store.roles_for(first.id).await.unwrap(), vec![Role::Admin]);
    }

    #[tokio::test]
    async fn test_duplicate_email_conflicts() {
        let store = MemoryStore::default();
        store
            .create_account("alice", "alice@example.com", "hash")
            .await
            .unwrap();

        let result = store
            .create_account("alice2", "alice@example.com", "hash")
            .await;
        assert!(matches!(result, Err(RepositoryError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_tag_names_unique_case_insensitive() {
        let store = MemoryStore::default();
        TagRepository::create(&store, "Rust").await.unwrap();

        let dup = TagRepository::create(&store, "rust").await;
        assert!(matches!(dup, Err(RepositoryError::Conflict(_))));

        let found = store.find_by_name("RUST").await.unwrap().unwrap();
        assert_eq!(found.name, "Rust");
    }

    #[tokio::test]
    async fn test_delete_post_cascades() {
        let store = MemoryStore::default();
        let (user, _) = store
            .create_account("alice", "alice@example.com", "hash")
            .await
            .unwrap();
        let tag = TagRepository::create(&store, "news").await.unwrap();
        let post = PostRepository::create(&store, user.id, "Title", "Body")
            .await
            .unwrap();
        store.replace_tags(post.id, &[tag.id, 9999]).await.unwrap();
        CommentRepository::create(&store, post.id, user.id, "First!")
            .await
            .unwrap();

        let tags = store.tags_for_posts(&[post.id]).await.unwrap();
        assert_eq!(tags.len(), 1, "unknown tag ids are skipped");

        assert!(PostRepository::delete(&store, post.id).await.unwrap());
        assert!(CommentRepository::list(&store).await.unwrap().is_empty());
        assert!(store.tags_for_posts(&[post.id]).await.unwrap().is_empty());
        assert!(TagRepository::find_by_id(&store, tag.id)
            .await
            .unwrap()
            .is_some());
    }

    #[tokio::test]
    async fn test_delete_user_cascades() {
        let store = MemoryStore::default();
        let (alice, _) = store
            .create_account("alice", "alice@example.com", "hash")
            .await
            .unwrap();
        let (bob, _) = store
            .create_account("bob", "bob@example.com", "hash")
            .await
            .unwrap();
        let post = PostRepository::create(&store, alice.id, "Title", "Body")
            .await
            .unwrap();
        CommentRepository::create(&store, post.id, bob.id, "Nice")
            .await
            .unwrap();

        assert!(UserRepository::delete(&store, bob.id).await.unwrap());
        assert!(CommentRepository::list(&store).await.unwrap().is_empty());
        assert!(PostRepository::find_by_id(&store, post.id)
            .await
            .unwrap()
            .is_some());

        assert!(UserRepository::delete(&store, alice.id).await.unwrap());
        assert!(PostRepository::list(&store).await.unwrap().is_empty());
        assert!(!UserRepository::delete(&store, alice.id).await.unwrap());
    }
}
