//! Integration tests for the public and admin blog endpoints.
//!
//! Posts live on disk, so these run without a database.

mod common;

use axum::http::{Method, StatusCode};
use axum::Router;
use common::{
    get_request, json_request, offline_app_with, parse_response_body, temp_blog_dir,
    with_admin_secret, write_post,
};
use serde_json::json;
use std::path::PathBuf;
use tower::ServiceExt;

fn blog_app() -> (Router, PathBuf) {
    let dir = temp_blog_dir();
    let dir_str = dir.to_string_lossy().to_string();
    let app = offline_app_with(&[("content.blog_dir", dir_str.as_str())]);
    (app, dir)
}

#[tokio::test]
async fn test_public_list_hides_drafts_and_sorts_newest_first() {
    let (app, dir) = blog_app();
    write_post(&dir, "older", "published", "2024-01-10", &["tax"]);
    write_post(&dir, "newer", "published", "2024-03-05", &["savings"]);
    write_post(&dir, "hidden", "draft", "2024-04-01", &["tax"]);

    let response = app.oneshot(get_request("/api/blog")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = parse_response_body(response).await;
    let slugs: Vec<&str> = body["posts"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["slug"].as_str().unwrap())
        .collect();
    assert_eq!(slugs, vec!["newer", "older"]);
}

#[tokio::test]
async fn test_public_list_filters_by_tag() {
    let (app, dir) = blog_app();
    write_post(&dir, "rrsp-basics", "published", "2024-01-10", &["retirement"]);
    write_post(&dir, "budgeting", "published", "2024-02-10", &["savings"]);

    let response = app
        .oneshot(get_request("/api/blog?tag=retirement"))
        .await
        .unwrap();
    let body = parse_response_body(response).await;
    let posts = body["posts"].as_array().unwrap();
    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0]["slug"], "rrsp-basics");
}

#[tokio::test]
async fn test_public_get_renders_html() {
    let (app, dir) = blog_app();
    write_post(&dir, "first-post", "published", "2024-01-10", &[]);

    let response = app
        .oneshot(get_request("/api/blog/first-post"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = parse_response_body(response).await;
    assert_eq!(body["post"]["title"], "Post first-post");
    assert!(body["post"]["html"].as_str().unwrap().contains("<strong>body</strong>"));
    assert!(body["post"].get("markdown").is_none());
}

#[tokio::test]
async fn test_public_get_draft_is_not_found() {
    let (app, dir) = blog_app();
    write_post(&dir, "secret", "draft", "2024-01-10", &[]);

    let response = app.oneshot(get_request("/api/blog/secret")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(parse_response_body(response).await["error"], "not_found");
}

#[tokio::test]
async fn test_public_get_rejects_path_traversal() {
    let (app, _dir) = blog_app();
    let response = app
        .oneshot(get_request("/api/blog/..%2Fsecrets"))
        .await
        .unwrap();
    assert!(response.status().is_client_error());
}

#[tokio::test]
async fn test_admin_blog_requires_auth() {
    let (app, _dir) = blog_app();
    let response = app.oneshot(get_request("/api/admin/blog")).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_admin_blog_lifecycle() {
    let (app, dir) = blog_app();

    // Create a draft; slug derives from the title.
    let response = app
        .clone()
        .oneshot(with_admin_secret(json_request(
            Method::POST,
            "/api/admin/blog",
            json!({
                "title": "TFSA vs RRSP: Which First?",
                "description": "Choosing an account",
                "tags": ["Retirement", " tax "],
                "body": "Start with **goals**."
            }),
        )))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = parse_response_body(response).await;
    let slug = body["post"]["slug"].as_str().unwrap().to_string();
    assert_eq!(slug, "tfsa-vs-rrsp-which-first");
    assert_eq!(body["post"]["status"], "draft");
    assert_eq!(body["post"]["tags"], json!(["retirement", "tax"]));
    assert!(dir.join(format!("{}.md", slug)).exists());

    // Same slug again conflicts.
    let response = app
        .clone()
        .oneshot(with_admin_secret(json_request(
            Method::POST,
            "/api/admin/blog",
            json!({ "title": "TFSA vs RRSP: Which First?", "body": "dup" }),
        )))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    // Drafts are visible to admins only.
    let response = app
        .clone()
        .oneshot(with_admin_secret(get_request("/api/admin/blog")))
        .await
        .unwrap();
    let body = parse_response_body(response).await;
    assert_eq!(body["posts"].as_array().unwrap().len(), 1);

    let response = app
        .clone()
        .oneshot(get_request(&format!("/api/blog/{}", slug)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // Publish under a new slug.
    let response = app
        .clone()
        .oneshot(with_admin_secret(json_request(
            Method::PUT,
            &format!("/api/admin/blog/{}", slug),
            json!({
                "title": "TFSA or RRSP",
                "slug": "tfsa-or-rrsp",
                "status": "published",
                "date": "2024-05-01",
                "body": "Updated **body**."
            }),
        )))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(!dir.join(format!("{}.md", slug)).exists());
    assert!(dir.join("tfsa-or-rrsp.md").exists());

    let response = app
        .clone()
        .oneshot(get_request("/api/blog/tfsa-or-rrsp"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = parse_response_body(response).await;
    assert_eq!(body["post"]["date"], "2024-05-01");

    // Admin read includes the raw markdown.
    let response = app
        .clone()
        .oneshot(with_admin_secret(get_request("/api/admin/blog/tfsa-or-rrsp")))
        .await
        .unwrap();
    let body = parse_response_body(response).await;
    assert_eq!(body["post"]["markdown"], "Updated **body**.");

    let response = app
        .clone()
        .oneshot(with_admin_secret(json_request(
            Method::DELETE,
            "/api/admin/blog/tfsa-or-rrsp",
            json!({}),
        )))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(parse_response_body(response).await["ok"], true);

    let response = app
        .oneshot(with_admin_secret(get_request("/api/admin/blog/tfsa-or-rrsp")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_admin_blog_rejects_invalid_slug() {
    let (app, _dir) = blog_app();
    let response = app
        .oneshot(with_admin_secret(json_request(
            Method::POST,
            "/api/admin/blog",
            json!({ "title": "Bad", "slug": "../escape", "body": "x" }),
        )))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(parse_response_body(response).await["error"], "validation_error");
}

#[tokio::test]
async fn test_admin_blog_update_missing_post() {
    let (app, _dir) = blog_app();
    let response = app
        .oneshot(with_admin_secret(json_request(
            Method::PUT,
            "/api/admin/blog/never-written",
            json!({ "title": "Ghost", "body": "boo" }),
        )))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
