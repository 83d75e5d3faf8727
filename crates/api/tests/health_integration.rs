//! Integration tests for health checks, metrics and global middleware.

mod common;

use axum::http::{header, Request, StatusCode};
use axum::body::Body;
use common::{get_request, offline_app, offline_app_with, parse_response_body};
use tower::ServiceExt;

#[tokio::test]
async fn test_liveness() {
    let app = offline_app();
    let response = app.oneshot(get_request("/api/health/live")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = parse_response_body(response).await;
    assert_eq!(body["ok"], true);
    assert_eq!(body["status"], "alive");
}

#[tokio::test]
async fn test_health_reports_unreachable_database() {
    let app = offline_app();
    let response = app.oneshot(get_request("/api/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

    let body = parse_response_body(response).await;
    assert_eq!(body["ok"], false);
    assert_eq!(body["status"], "unhealthy");
    assert_eq!(body["database"]["connected"], false);
    assert!(body["database"]["latency_ms"].is_null());
    assert_eq!(body["services"]["email"], false);
    assert_eq!(body["services"]["ai"], false);
    assert!(body["version"].is_string());
}

#[tokio::test]
async fn test_health_reports_configured_services() {
    let app = offline_app_with(&[("email.enabled", "true"), ("email.provider", "console")]);
    let response = app.oneshot(get_request("/api/health")).await.unwrap();

    let body = parse_response_body(response).await;
    assert_eq!(body["services"]["email"], true);
    assert_eq!(body["services"]["ai"], false);
}

#[tokio::test]
async fn test_readiness_without_database() {
    let app = offline_app();
    let response = app.oneshot(get_request("/api/health/ready")).await.unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(parse_response_body(response).await["ok"], false);
}

#[tokio::test]
async fn test_metrics_endpoint() {
    advisory_api::middleware::init_metrics().unwrap();
    let app = offline_app();

    // Generate at least one recorded request.
    let _ = app
        .clone()
        .oneshot(get_request("/api/health/live"))
        .await
        .unwrap();

    let response = app.oneshot(get_request("/metrics")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response.headers().get(header::CONTENT_TYPE).unwrap();
    assert!(content_type.to_str().unwrap().starts_with("text/plain"));
}

#[tokio::test]
async fn test_security_headers_present() {
    let app = offline_app();
    let response = app.oneshot(get_request("/api/health/live")).await.unwrap();

    let headers = response.headers();
    assert_eq!(headers.get("x-content-type-options").unwrap(), "nosniff");
    assert_eq!(headers.get("x-frame-options").unwrap(), "DENY");
    assert!(headers.get("strict-transport-security").is_none());
}

#[tokio::test]
async fn test_hsts_when_enabled() {
    let app = offline_app_with(&[("security.hsts_enabled", "true")]);
    let response = app.oneshot(get_request("/api/health/live")).await.unwrap();
    assert!(response.headers().get("strict-transport-security").is_some());
}

#[tokio::test]
async fn test_request_id_is_echoed() {
    let app = offline_app();
    let request = Request::builder()
        .uri("/api/health/live")
        .header("x-request-id", "req-42")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.headers().get("x-request-id").unwrap(), "req-42");
}

#[tokio::test]
async fn test_request_id_is_generated() {
    let app = offline_app();
    let response = app.oneshot(get_request("/api/health/live")).await.unwrap();
    let id = response.headers().get("x-request-id").unwrap().to_str().unwrap();
    assert!(!id.is_empty());
}

#[tokio::test]
async fn test_unknown_route() {
    let app = offline_app();
    let response = app.oneshot(get_request("/api/nope")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
