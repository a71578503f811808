//! HTTP Integration Tests for tags.
//!
//! Run with: `cargo test --test tags_http_test -- --nocapture`

mod helpers;

use axum::http::Method;
use helpers::{body_to_json, TestApp};
use quill_server::permissions::Role;
use serde_json::json;

fn named(name: &str) -> Option<serde_json::Value> {
    Some(json!({ "name": name }))
}

#[tokio::test]
async fn test_create_tag_is_case_insensitive_idempotent() {
    let app = TestApp::new();
    let (_, token) = app.create_user("user", Role::User).await;

    let resp = app.send(Method::POST, "/api/tags", Some(&token), named("tech")).await;
    assert_eq!(resp.status(), 201);
    let first = body_to_json(resp).await;

    let resp = app.send(Method::POST, "/api/tags", Some(&token), named("Tech")).await;
    assert_eq!(resp.status(), 201);
    let second = body_to_json(resp).await;

    assert_eq!(second["id"], first["id"]);
    assert_eq!(second["name"], "tech");

    let resp = app.send(Method::GET, "/api/tags", None, None).await;
    assert_eq!(body_to_json(resp).await.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_create_tag_requires_auth_and_name() {
    let app = TestApp::new();
    let (_, token) = app.create_user("user", Role::User).await;

    let resp = app.send(Method::POST, "/api/tags", None, named("tech")).await;
    assert_eq!(resp.status(), 401);

    let resp = app.send(Method::POST, "/api/tags", Some(&token), named("")).await;
    assert_eq!(resp.status(), 400);

    let resp = app
        .send(Method::POST, "/api/tags", Some(&token), named(&"x".repeat(51)))
        .await;
    assert_eq!(resp.status(), 400);
}

#[tokio::test]
async fn test_rename_tag() {
    let app = TestApp::new();
    let (_, token) = app.create_user("user", Role::User).await;
    let resp = app.send(Method::POST, "/api/tags", Some(&token), named("rust")).await;
    let rust = body_to_json(resp).await;
    app.send(Method::POST, "/api/tags", Some(&token), named("go")).await;
    let uri = format!("/api/tags/{}", rust["id"]);

    let resp = app.send(Method::PUT, &uri, Some(&token), named("Rust")).await;
    assert_eq!(resp.status(), 200);
    assert_eq!(body_to_json(resp).await["name"], "Rust");

    let resp = app.send(Method::PUT, &uri, Some(&token), named("GO")).await;
    assert_eq!(resp.status(), 400);

    let resp = app.send(Method::PUT, "/api/tags/999", Some(&token), named("new")).await;
    assert_eq!(resp.status(), 404);
}

#[tokio::test]
async fn test_delete_tag_is_admin_only() {
    let app = TestApp::new();
    let (_, admin) = app.create_user("admin", Role::Admin).await;
    let (_, moderator) = app.create_user("moderator", Role::Moderator).await;
    let resp = app.send(Method::POST, "/api/tags", Some(&admin), named("temp")).await;
    let tag = body_to_json(resp).await;
    let uri = format!("/api/tags/{}", tag["id"]);

    let resp = app.send(Method::DELETE, &uri, None, None).await;
    assert_eq!(resp.status(), 401);

    let resp = app.send(Method::DELETE, &uri, Some(&moderator), None).await;
    assert_eq!(resp.status(), 403);

    let resp = app.send(Method::DELETE, &uri, Some(&admin), None).await;
    assert_eq!(resp.status(), 204);

    let resp = app.send(Method::GET, &uri, None, None).await;
    assert_eq!(resp.status(), 404);
}

#[tokio::test]
async fn test_tags_listed_by_name() {
    let app = TestApp::new();
    let (_, token) = app.create_user("user", Role::User).await;
    for name in ["web", "async", "rust"] {
        app.send(Method::POST, "/api/tags", Some(&token), named(name)).await;
    }

    let resp = app.send(Method::GET, "/api/tags", None, None).await;
    let names: Vec<String> = body_to_json(resp)
        .await
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["name"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(names, vec!["async", "rust", "web"]);
}
