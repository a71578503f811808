//! Reusable test helpers for HTTP integration tests.
//!
//! Provides `TestApp` for building and sending requests through the full axum
//! router over an in-memory store, plus utilities for user creation and JWT
//! generation.
#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{self, Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use quill_server::api::{create_router, AppState};
use quill_server::auth::{hash_password, jwt};
use quill_server::config::Config;
use quill_server::permissions::Role;
use quill_server::repository::{MemoryStore, Repositories};
use tower::ServiceExt;

// ============================================================================
// Test App
// ============================================================================

/// A test application wrapping the full axum router.
pub struct TestApp {
    pub router: Router,
    pub repos: Repositories,
    pub config: Arc<Config>,
}

impl TestApp {
    /// Create a new test app with an empty in-memory store.
    pub fn new() -> Self {
        Self::with_config(Config::default_for_test())
    }

    /// Create a test app with a custom config.
    pub fn with_config(config: Config) -> Self {
        let repos = Repositories::from_memory(&MemoryStore::default());
        let state = AppState::new(repos.clone(), config.clone());
        let router = create_router(state);

        Self {
            router,
            repos,
            config: Arc::new(config),
        }
    }

    /// Build an HTTP request with the given method and URI.
    pub fn request(method: Method, uri: &str) -> http::request::Builder {
        Request::builder().method(method).uri(uri)
    }

    /// Send a request through the router via `tower::ServiceExt::oneshot`.
    pub async fn oneshot(&self, request: Request<Body>) -> Response<Body> {
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("oneshot request failed")
    }

    /// Send a request with an optional bearer token and JSON body.
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<serde_json::Value>,
    ) -> Response<Body> {
        let mut builder = Self::request(method, uri);
        if let Some(token) = token {
            builder = builder.header("Authorization", format!("Bearer {token}"));
        }
        let req = match body {
            Some(json) => builder
                .header("Content-Type", "application/json")
                .body(Body::from(serde_json::to_string(&json).unwrap()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        self.oneshot(req).await
    }

    /// Create a user holding exactly `role` and return `(user_id, token)`.
    pub async fn create_user(&self, username: &str, role: Role) -> (i64, String) {
        let hash = hash_password("password123").expect("Failed to hash password");
        let (user, _) = self
            .repos
            .users
            .create_account(username, &format!("{username}@example.com"), &hash)
            .await
            .expect("Failed to create test user");
        self.repos
            .users
            .set_role(user.id, role)
            .await
            .expect("Failed to set role");

        let token = jwt::generate_token(&user, &[role], &self.config)
            .expect("Failed to generate token");
        (user.id, token)
    }

    /// Create a post as the token holder and return its id.
    pub async fn create_post(&self, token: &str, title: &str) -> i64 {
        let resp = self
            .send(
                Method::POST,
                "/api/posts",
                Some(token),
                Some(serde_json::json!({ "title": title, "content": "Body" })),
            )
            .await;
        assert_eq!(resp.status(), 201, "Post creation should return 201");
        body_to_json(resp).await["id"].as_i64().expect("post id")
    }

    /// Create a comment as the token holder and return its id.
    pub async fn create_comment(&self, token: &str, post_id: i64, content: &str) -> i64 {
        let resp = self
            .send(
                Method::POST,
                "/api/comments",
                Some(token),
                Some(serde_json::json!({ "post_id": post_id, "content": content })),
            )
            .await;
        assert_eq!(resp.status(), 201, "Comment creation should return 201");
        body_to_json(resp).await["id"].as_i64().expect("comment id")
    }
}

/// Collect a response body and parse it as JSON.
pub async fn body_to_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("Failed to collect response body")
        .to_bytes();
    serde_json::from_slice(&bytes).unwrap_or_else(|e| {
        let preview = String::from_utf8_lossy(&bytes);
        panic!("Failed to parse response as JSON: {e}\nBody: {preview}")
    })
}
