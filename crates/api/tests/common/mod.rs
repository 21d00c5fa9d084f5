#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{Method, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;

use pagecraft_api::app::build_app;
use pagecraft_api::auth::jwt::JwtConfig;
use pagecraft_api::auth::password::hash_password;
use pagecraft_api::config::ServerConfig;
use pagecraft_api::state::AppState;
use pagecraft_db::models::user::{CreateUser, User};
use pagecraft_db::repositories::UserRepo;

/// Seeded role ids (see the RBAC migration).
pub const ROLE_ADMIN_ID: i64 = 1;
pub const ROLE_EDITOR_ID: i64 = 2;
pub const ROLE_AUTHOR_ID: i64 = 3;
pub const ROLE_VIEWER_ID: i64 = 4;

/// Password used for every user created by [`create_test_user`].
pub const TEST_PASSWORD: &str = "correct-horse-battery";

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        cookie_secure: false,
        bootstrap_admin: None,
        jwt: JwtConfig {
            secret: "test-secret-that-is-long-enough-for-hs256".to_string(),
            access_token_expiry_mins: 15,
            refresh_token_expiry_days: 7,
        },
    }
}

/// Build the application exactly as the server binary does.
pub fn build_test_app(pool: PgPool) -> Router {
    let state = AppState {
        pool,
        config: Arc::new(test_config()),
    };
    build_app(state).unwrap()
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

/// Send a request with an optional bearer token and JSON body.
pub async fn send(
    app: Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<serde_json::Value>,
) -> Response {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(json) => builder
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response {
    send(app, Method::GET, uri, None, None).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response {
    send(app, Method::GET, uri, Some(token), None).await
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response {
    send(app, Method::POST, uri, None, Some(body)).await
}

pub async fn post_json_auth(
    app: Router,
    uri: &str,
    token: &str,
    body: serde_json::Value,
) -> Response {
    send(app, Method::POST, uri, Some(token), Some(body)).await
}

pub async fn put_json_auth(
    app: Router,
    uri: &str,
    token: &str,
    body: serde_json::Value,
) -> Response {
    send(app, Method::PUT, uri, Some(token), Some(body)).await
}

pub async fn patch_json_auth(
    app: Router,
    uri: &str,
    token: &str,
    body: serde_json::Value,
) -> Response {
    send(app, Method::PATCH, uri, Some(token), Some(body)).await
}

pub async fn delete_auth(app: Router, uri: &str, token: &str) -> Response {
    send(app, Method::DELETE, uri, Some(token), None).await
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// Create a user directly in the database with [`TEST_PASSWORD`].
pub async fn create_test_user(pool: &PgPool, username: &str, role_id: i64) -> User {
    let input = CreateUser {
        username: username.to_string(),
        email: format!("{username}@test.com"),
        password_hash: hash_password(TEST_PASSWORD).expect("hashing should succeed"),
        role_id,
        organization_id: None,
    };
    UserRepo::create(pool, &input)
        .await
        .expect("user creation should succeed")
}

/// Log in through the API and return the access token.
pub async fn login(pool: &PgPool, username: &str) -> String {
    let app = build_test_app(pool.clone());
    let response = post_json(
        app,
        "/api/v1/auth/login",
        serde_json::json!({ "username": username, "password": TEST_PASSWORD }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK, "login should succeed");
    body_json(response).await["access_token"]
        .as_str()
        .unwrap()
        .to_string()
}

/// Create a user with the given role and return its access token.
pub async fn user_token(pool: &PgPool, username: &str, role_id: i64) -> (User, String) {
    let user = create_test_user(pool, username, role_id).await;
    let token = login(pool, username).await;
    (user, token)
}

/// Create a page through the API as `token` and return its JSON.
pub async fn create_page(pool: &PgPool, token: &str, body: serde_json::Value) -> serde_json::Value {
    let response = post_json_auth(build_test_app(pool.clone()), "/api/v1/cms/pages", token, body).await;
    assert_eq!(response.status(), StatusCode::CREATED, "page creation should succeed");
    body_json(response).await["data"].clone()
}

/// A single text block, suitable for a publishable page.
pub fn text_blocks() -> serde_json::Value {
    serde_json::json!([{ "id": "b1", "type": "text", "content": { "text": "Hello" } }])
}
