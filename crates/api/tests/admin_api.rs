//! HTTP-level integration tests for user, organization, and role
//! administration.

mod common;

use axum::http::StatusCode;
use common::{
    body_json, build_test_app, create_page, delete_auth, get_auth, post_json, post_json_auth,
    put_json_auth, user_token, ROLE_ADMIN_ID, ROLE_AUTHOR_ID, ROLE_EDITOR_ID, ROLE_VIEWER_ID,
};
use serde_json::{json, Value};
use sqlx::PgPool;

async fn create_org(pool: &PgPool, admin: &str, name: &str) -> Value {
    let response = post_json_auth(
        build_test_app(pool.clone()),
        "/api/v1/admin/organizations",
        admin,
        json!({ "name": name }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["data"].clone()
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_admin_routes_require_admin(pool: PgPool) {
    let (_, editor) = user_token(&pool, "editor1", ROLE_EDITOR_ID).await;
    for uri in [
        "/api/v1/admin/users",
        "/api/v1/admin/roles",
        "/api/v1/admin/organizations",
        "/api/v1/admin/permissions",
    ] {
        let response = get_auth(build_test_app(pool.clone()), uri, &editor).await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN, "{uri}");
    }
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_create_user_and_login(pool: PgPool) {
    let (_, admin) = user_token(&pool, "admin1", ROLE_ADMIN_ID).await;

    let response = post_json_auth(
        build_test_app(pool.clone()),
        "/api/v1/admin/users",
        &admin,
        json!({
            "username": "newbie",
            "email": "newbie@test.com",
            "password": "short",
            "role_id": ROLE_AUTHOR_ID
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = post_json_auth(
        build_test_app(pool.clone()),
        "/api/v1/admin/users",
        &admin,
        json!({
            "username": "newbie",
            "email": "newbie@test.com",
            "password": "a-long-enough-password",
            "role_id": ROLE_AUTHOR_ID
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["data"]["role"], "author");
    assert!(json["data"].get("password_hash").is_none());

    let response = post_json(
        build_test_app(pool.clone()),
        "/api/v1/auth/login",
        json!({ "username": "newbie", "password": "a-long-enough-password" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = post_json_auth(
        build_test_app(pool),
        "/api/v1/admin/users",
        &admin,
        json!({
            "username": "newbie",
            "email": "other@test.com",
            "password": "a-long-enough-password",
            "role_id": ROLE_AUTHOR_ID
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_deactivated_user_cannot_log_in(pool: PgPool) {
    let (admin_user, admin) = user_token(&pool, "admin2", ROLE_ADMIN_ID).await;
    let (user, _) = user_token(&pool, "goner", ROLE_VIEWER_ID).await;

    let response = delete_auth(
        build_test_app(pool.clone()),
        &format!("/api/v1/admin/users/{}", admin_user.id),
        &admin,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = delete_auth(
        build_test_app(pool.clone()),
        &format!("/api/v1/admin/users/{}", user.id),
        &admin,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = post_json(
        build_test_app(pool),
        "/api/v1/auth/login",
        json!({ "username": "goner", "password": common::TEST_PASSWORD }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_reset_password(pool: PgPool) {
    let (_, admin) = user_token(&pool, "admin3", ROLE_ADMIN_ID).await;
    let (user, _) = user_token(&pool, "forgetful", ROLE_VIEWER_ID).await;

    let response = post_json_auth(
        build_test_app(pool.clone()),
        &format!("/api/v1/admin/users/{}/reset-password", user.id),
        &admin,
        json!({ "new_password": "brand-new-password-1" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = post_json(
        build_test_app(pool),
        "/api/v1/auth/login",
        json!({ "username": "forgetful", "password": "brand-new-password-1" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_organization_crud(pool: PgPool) {
    let (_, admin) = user_token(&pool, "admin4", ROLE_ADMIN_ID).await;
    let org = create_org(&pool, &admin, "Acme Corp").await;
    assert_eq!(org["slug"], "acme-corp");
    let uri = format!("/api/v1/admin/organizations/{}", org["id"]);

    let response = post_json_auth(
        build_test_app(pool.clone()),
        "/api/v1/admin/organizations",
        &admin,
        json!({ "name": "Acme Corp" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = put_json_auth(
        build_test_app(pool.clone()),
        &uri,
        &admin,
        json!({ "name": "Acme Inc", "slug": "acme-inc" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["slug"], "acme-inc");

    // Referenced by a page, so it cannot be removed yet.
    let page = create_page(
        &pool,
        &admin,
        json!({ "title": "Org page", "organization_id": org["id"] }),
    )
    .await;
    let response = delete_auth(build_test_app(pool.clone()), &uri, &admin).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    delete_auth(
        build_test_app(pool.clone()),
        &format!("/api/v1/cms/pages/{}", page["id"]),
        &admin,
    )
    .await;
    let response = delete_auth(build_test_app(pool.clone()), &uri, &admin).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = get_auth(build_test_app(pool), &uri, &admin).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_builtin_roles_and_permissions(pool: PgPool) {
    let (_, admin) = user_token(&pool, "admin5", ROLE_ADMIN_ID).await;

    let json = body_json(get_auth(build_test_app(pool.clone()), "/api/v1/admin/roles", &admin).await).await;
    let names: Vec<&str> = json["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["name"].as_str().unwrap())
        .collect();
    for builtin in ["admin", "editor", "author", "viewer"] {
        assert!(names.contains(&builtin), "missing {builtin}");
    }

    let json = body_json(
        get_auth(build_test_app(pool.clone()), "/api/v1/admin/permissions", &admin).await,
    )
    .await;
    assert_eq!(json["data"].as_array().unwrap().len(), 4);

    let json = body_json(
        get_auth(
            build_test_app(pool.clone()),
            &format!("/api/v1/admin/roles/{ROLE_AUTHOR_ID}"),
            &admin,
        )
        .await,
    )
    .await;
    assert_eq!(json["data"]["name"], "author");
    assert_eq!(json["data"]["permissions"].as_array().unwrap().len(), 2);

    let response = delete_auth(
        build_test_app(pool),
        &format!("/api/v1/admin/roles/{ROLE_VIEWER_ID}"),
        &admin,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_custom_role_assignment(pool: PgPool) {
    let (_, admin) = user_token(&pool, "admin6", ROLE_ADMIN_ID).await;
    let (user, _) = user_token(&pool, "member", ROLE_VIEWER_ID).await;
    let org = create_org(&pool, &admin, "Studio").await;
    let other_org = create_org(&pool, &admin, "Elsewhere").await;

    let response = post_json_auth(
        build_test_app(pool.clone()),
        "/api/v1/admin/roles",
        &admin,
        json!({ "name": "editor", "organization_id": org["id"] }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = post_json_auth(
        build_test_app(pool.clone()),
        "/api/v1/admin/roles",
        &admin,
        json!({ "name": "publisher", "organization_id": org["id"] }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let role = body_json(response).await["data"].clone();
    let role_uri = format!("/api/v1/admin/roles/{}", role["id"]);

    let response = put_json_auth(
        build_test_app(pool.clone()),
        &format!("{role_uri}/permissions"),
        &admin,
        json!({ "permissions": ["VIEW", "PUBLISH"] }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"].as_array().unwrap().len(), 2);

    let assignments_uri = format!("/api/v1/admin/users/{}/roles", user.id);
    let response = post_json_auth(
        build_test_app(pool.clone()),
        &assignments_uri,
        &admin,
        json!({ "role_id": role["id"], "organization_id": other_org["id"] }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = post_json_auth(
        build_test_app(pool.clone()),
        &assignments_uri,
        &admin,
        json!({ "role_id": role["id"], "organization_id": org["id"] }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let assignment = body_json(response).await["data"].clone();

    let json = body_json(get_auth(build_test_app(pool.clone()), &assignments_uri, &admin).await).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 1);

    let response = delete_auth(
        build_test_app(pool.clone()),
        &format!("{assignments_uri}/{}", assignment["id"]),
        &admin,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = delete_auth(build_test_app(pool), &role_uri, &admin).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}
