//! HTTP-level integration tests for the auth endpoints.
//!
//! Covers login, refresh rotation, logout, the access-token cookie, and
//! account lockout.

mod common;

use axum::body::Body;
use axum::http::header::{COOKIE, SET_COOKIE};
use axum::http::{Request, StatusCode};
use common::{
    body_json, build_test_app, create_test_user, get, get_auth, post_json, post_json_auth,
    ROLE_ADMIN_ID, ROLE_EDITOR_ID, TEST_PASSWORD,
};
use sqlx::PgPool;
use tower::ServiceExt;

fn credentials(username: &str, password: &str) -> serde_json::Value {
    serde_json::json!({ "username": username, "password": password })
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_login_success_sets_cookie(pool: PgPool) {
    let user = create_test_user(&pool, "loginuser", ROLE_EDITOR_ID).await;
    let app = build_test_app(pool);

    let response = post_json(app, "/api/v1/auth/login", credentials("loginuser", TEST_PASSWORD)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let cookie = response
        .headers()
        .get(SET_COOKIE)
        .expect("login must set a cookie")
        .to_str()
        .unwrap()
        .to_string();
    assert!(cookie.starts_with("access_token="));
    assert!(cookie.contains("HttpOnly"));

    let json = body_json(response).await;
    assert!(json["access_token"].is_string());
    assert!(json["refresh_token"].is_string());
    assert_eq!(json["expires_in"], 15 * 60);
    assert_eq!(json["user"]["id"], user.id);
    assert_eq!(json["user"]["role"], "editor");
    assert!(json["user"].get("password_hash").is_none());
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_login_wrong_password(pool: PgPool) {
    create_test_user(&pool, "wrongpw", ROLE_EDITOR_ID).await;
    let app = build_test_app(pool);

    let response = post_json(app, "/api/v1/auth/login", credentials("wrongpw", "not-the-password")).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["code"], "UNAUTHORIZED");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_login_unknown_user(pool: PgPool) {
    let app = build_test_app(pool);
    let response = post_json(app, "/api/v1/auth/login", credentials("ghost", TEST_PASSWORD)).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_account_locks_after_five_failures(pool: PgPool) {
    create_test_user(&pool, "locked", ROLE_EDITOR_ID).await;

    for _ in 0..5 {
        let response = post_json(
            build_test_app(pool.clone()),
            "/api/v1/auth/login",
            credentials("locked", "bad-password-attempt"),
        )
        .await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    // Even the right password is refused while locked.
    let response = post_json(
        build_test_app(pool.clone()),
        "/api/v1/auth/login",
        credentials("locked", TEST_PASSWORD),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_refresh_rotates_token(pool: PgPool) {
    create_test_user(&pool, "refresher", ROLE_EDITOR_ID).await;
    let login = body_json(
        post_json(
            build_test_app(pool.clone()),
            "/api/v1/auth/login",
            credentials("refresher", TEST_PASSWORD),
        )
        .await,
    )
    .await;
    let refresh_token = login["refresh_token"].as_str().unwrap().to_string();

    let response = post_json(
        build_test_app(pool.clone()),
        "/api/v1/auth/refresh",
        serde_json::json!({ "refresh_token": refresh_token }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_ne!(json["refresh_token"], refresh_token);

    // The old token was revoked by the rotation.
    let response = post_json(
        build_test_app(pool),
        "/api/v1/auth/refresh",
        serde_json::json!({ "refresh_token": refresh_token }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_logout_clears_cookie_and_revokes_sessions(pool: PgPool) {
    create_test_user(&pool, "leaver", ROLE_ADMIN_ID).await;
    let login = body_json(
        post_json(
            build_test_app(pool.clone()),
            "/api/v1/auth/login",
            credentials("leaver", TEST_PASSWORD),
        )
        .await,
    )
    .await;
    let access = login["access_token"].as_str().unwrap();
    let refresh = login["refresh_token"].as_str().unwrap();

    let response = post_json_auth(
        build_test_app(pool.clone()),
        "/api/v1/auth/logout",
        access,
        serde_json::json!({}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    let cookie = response.headers().get(SET_COOKIE).unwrap().to_str().unwrap();
    assert!(cookie.contains("Max-Age=0"));

    let response = post_json(
        build_test_app(pool),
        "/api/v1/auth/refresh",
        serde_json::json!({ "refresh_token": refresh }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_me_accepts_bearer_and_cookie(pool: PgPool) {
    create_test_user(&pool, "whoami", ROLE_EDITOR_ID).await;
    let token = common::login(&pool, "whoami").await;

    let response = get_auth(build_test_app(pool.clone()), "/api/v1/auth/me", &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["username"], "whoami");

    let request = Request::builder()
        .uri("/api/v1/auth/me")
        .header(COOKIE, format!("access_token={token}"))
        .body(Body::empty())
        .unwrap();
    let response = build_test_app(pool).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_me_requires_token(pool: PgPool) {
    let response = get(build_test_app(pool.clone()), "/api/v1/auth/me").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = get_auth(build_test_app(pool), "/api/v1/auth/me", "not-a-jwt").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
