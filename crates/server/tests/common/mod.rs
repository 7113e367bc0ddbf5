//! Shared helpers for the HTTP integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use wishlist_core::storage::memory::InMemoryBackend;
use wishlist_core::GiftStore;
use wishlist_server::auth::{AdminPassword, AuthConfig};
use wishlist_server::state::AppState;

pub const ADMIN_PASSWORD: &str = "christmas2024";
pub const JWT_SECRET: &str = "test-secret-that-is-long-enough-for-hmac";

pub fn test_auth() -> AuthConfig {
    AuthConfig::new(JWT_SECRET, AdminPassword::Plain(ADMIN_PASSWORD.into()))
}

/// App over a fresh in-memory backend.
pub fn build_test_app() -> Router {
    build_app_with_store(GiftStore::new(Arc::new(InMemoryBackend::new())))
}

/// App with no backend (read-only example data).
pub fn build_unconfigured_app() -> Router {
    build_app_with_store(GiftStore::unconfigured())
}

pub fn build_app_with_store(store: GiftStore) -> Router {
    wishlist_server::app(AppState::new(store, test_auth(), "test"))
}

/// A valid admin bearer token.
pub fn admin_token() -> String {
    test_auth().create_token().unwrap()
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    app.oneshot(request).await.unwrap()
}

/// Send a JSON request, optionally with a bearer token.
pub async fn send_json(
    app: Router,
    method: Method,
    uri: &str,
    body: Value,
    token: Option<&str>,
) -> Response<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = builder.body(Body::from(body.to_string())).unwrap();
    app.oneshot(request).await.unwrap()
}

/// Send a body-less request with the bearer token.
pub async fn send_authed(app: Router, method: Method, uri: &str) -> Response<Body> {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {}", admin_token()))
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}
