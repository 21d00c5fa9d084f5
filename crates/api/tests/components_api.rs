//! HTTP-level integration tests for component definitions, instances,
//! and rendering component blocks.

mod common;

use axum::http::StatusCode;
use common::{
    body_json, build_test_app, create_page, delete_auth, get, get_auth, post_json_auth,
    put_json_auth, user_token, ROLE_AUTHOR_ID, ROLE_EDITOR_ID,
};
use serde_json::{json, Value};
use sqlx::PgPool;

fn card_component() -> Value {
    json!({
        "name": "feature_card",
        "display_name": "Feature card",
        "category": "marketing",
        "properties": [
            { "name": "title", "property_type": "string", "required": true },
            {
                "name": "variant",
                "property_type": "select",
                "options": ["light", "dark"],
                "default_value": "light"
            },
            { "name": "count", "property_type": "number" }
        ]
    })
}

async fn create_component(pool: &PgPool, token: &str, body: Value) -> Value {
    let response = post_json_auth(build_test_app(pool.clone()), "/api/v1/cms/components", token, body).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["data"].clone()
}

async fn create_instance(pool: &PgPool, token: &str, page_id: &Value, body: Value) -> Value {
    let response = post_json_auth(
        build_test_app(pool.clone()),
        &format!("/api/v1/cms/pages/{page_id}/components"),
        token,
        body,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["data"].clone()
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_component_definition_crud(pool: PgPool) {
    let (_, editor) = user_token(&pool, "editor1", ROLE_EDITOR_ID).await;
    let (_, author) = user_token(&pool, "author1", ROLE_AUTHOR_ID).await;

    let response = post_json_auth(
        build_test_app(pool.clone()),
        "/api/v1/cms/components",
        &author,
        card_component(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let component = create_component(&pool, &editor, card_component()).await;
    assert_eq!(component["name"], "feature_card");
    assert_eq!(component["is_active"], true);
    let names: Vec<&str> = component["properties"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["title", "variant", "count"]);

    let response = post_json_auth(
        build_test_app(pool.clone()),
        "/api/v1/cms/components",
        &editor,
        card_component(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let uri = format!("/api/v1/cms/components/{}", component["id"]);
    let response = put_json_auth(
        build_test_app(pool.clone()),
        &uri,
        &editor,
        json!({ "display_name": "Card", "properties": [
            { "name": "title", "property_type": "string", "required": true }
        ] }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["display_name"], "Card");
    assert_eq!(json["data"]["properties"].as_array().unwrap().len(), 1);

    let json = body_json(
        get_auth(
            build_test_app(pool.clone()),
            "/api/v1/cms/components?category=marketing",
            &author,
        )
        .await,
    )
    .await;
    assert_eq!(json["data"].as_array().unwrap().len(), 1);

    let response = delete_auth(build_test_app(pool.clone()), &uri, &editor).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    let response = get_auth(build_test_app(pool), &uri, &editor).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_invalid_property_definitions(pool: PgPool) {
    let (_, editor) = user_token(&pool, "editor2", ROLE_EDITOR_ID).await;
    let response = post_json_auth(
        build_test_app(pool),
        "/api/v1/cms/components",
        &editor,
        json!({
            "name": "broken",
            "display_name": "Broken",
            "properties": [{ "name": "mode", "property_type": "select" }]
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_instance_data_is_validated_and_defaulted(pool: PgPool) {
    let (_, editor) = user_token(&pool, "editor3", ROLE_EDITOR_ID).await;
    let component = create_component(&pool, &editor, card_component()).await;
    let page = create_page(&pool, &editor, json!({ "title": "Landing" })).await;
    let uri = format!("/api/v1/cms/pages/{}/components", page["id"]);

    for data in [
        json!({ "variant": "dark" }),
        json!({ "title": 7 }),
        json!({ "title": "x", "variant": "neon" }),
        json!({ "title": "x", "colour": "red" }),
    ] {
        let response = post_json_auth(
            build_test_app(pool.clone()),
            &uri,
            &editor,
            json!({ "component_id": component["id"], "data": data }),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "data: {data}");
    }

    let instance = create_instance(
        &pool,
        &editor,
        &page["id"],
        json!({ "component_id": component["id"], "data": { "title": "Fast" } }),
    )
    .await;
    assert_eq!(instance["data"], json!({ "title": "Fast", "variant": "light" }));

    let response = put_json_auth(
        build_test_app(pool.clone()),
        &format!("{uri}/{}", instance["id"]),
        &editor,
        json!({ "data": { "title": "Faster", "count": 3 } }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["data"]["count"], 3);

    let response = put_json_auth(
        build_test_app(pool),
        &format!("{uri}/{}", instance["id"]),
        &editor,
        json!({ "data": { "count": 3 } }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_nesting_is_one_level_deep(pool: PgPool) {
    let (_, editor) = user_token(&pool, "editor4", ROLE_EDITOR_ID).await;
    let component = create_component(&pool, &editor, card_component()).await;
    let page = create_page(&pool, &editor, json!({ "title": "Nested" })).await;
    let data = json!({ "title": "t" });

    let root = create_instance(
        &pool,
        &editor,
        &page["id"],
        json!({ "component_id": component["id"], "data": data }),
    )
    .await;
    let child = create_instance(
        &pool,
        &editor,
        &page["id"],
        json!({ "component_id": component["id"], "parent_id": root["id"], "data": data }),
    )
    .await;

    let response = post_json_auth(
        build_test_app(pool.clone()),
        &format!("/api/v1/cms/pages/{}/components", page["id"]),
        &editor,
        json!({ "component_id": component["id"], "parent_id": child["id"], "data": data }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = body_json(
        get_auth(
            build_test_app(pool),
            &format!("/api/v1/cms/pages/{}/components", page["id"]),
            &editor,
        )
        .await,
    )
    .await;
    let tree = json["data"].as_array().unwrap();
    assert_eq!(tree.len(), 1);
    assert_eq!(tree[0]["id"], root["id"]);
    assert_eq!(tree[0]["children"][0]["id"], child["id"]);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_component_block_renders_publicly(pool: PgPool) {
    let (_, editor) = user_token(&pool, "editor5", ROLE_EDITOR_ID).await;
    let component = create_component(&pool, &editor, card_component()).await;
    let page = create_page(&pool, &editor, json!({ "title": "Rendered", "slug": "rendered" })).await;
    let page_uri = format!("/api/v1/cms/pages/{}", page["id"]);

    let root = create_instance(
        &pool,
        &editor,
        &page["id"],
        json!({ "component_id": component["id"], "data": { "title": "Parent" } }),
    )
    .await;
    create_instance(
        &pool,
        &editor,
        &page["id"],
        json!({ "component_id": component["id"], "parent_id": root["id"], "data": { "title": "Child" } }),
    )
    .await;

    let response = put_json_auth(
        build_test_app(pool.clone()),
        &page_uri,
        &editor,
        json!({ "blocks": [
            { "id": "hero", "type": "hero", "content": { "heading": "Hi" } },
            { "id": "card", "type": "component", "content": { "instance_id": root["id"] } }
        ] }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = post_json_auth(
        build_test_app(pool.clone()),
        &format!("{page_uri}/publish"),
        &editor,
        json!({}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(get(build_test_app(pool.clone()), "/api/v1/public/pages/rendered").await).await;
    let blocks = json["data"]["blocks"].as_array().unwrap();
    assert_eq!(blocks.len(), 2);
    assert!(blocks[0].get("component").is_none());
    let rendered = &blocks[1]["component"];
    assert_eq!(rendered["name"], "feature_card");
    assert_eq!(rendered["data"]["title"], "Parent");
    assert_eq!(rendered["children"][0]["data"]["title"], "Child");

    // Referenced instances and in-use components cannot be deleted.
    let response = delete_auth(
        build_test_app(pool.clone()),
        &format!("{page_uri}/components/{}", root["id"]),
        &editor,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = delete_auth(
        build_test_app(pool),
        &format!("/api/v1/cms/components/{}", component["id"]),
        &editor,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_block_must_reference_existing_instance(pool: PgPool) {
    let (_, editor) = user_token(&pool, "editor6", ROLE_EDITOR_ID).await;
    let page = create_page(&pool, &editor, json!({ "title": "Dangling" })).await;

    let response = put_json_auth(
        build_test_app(pool),
        &format!("/api/v1/cms/pages/{}", page["id"]),
        &editor,
        json!({ "blocks": [
            { "id": "c", "type": "component", "content": { "instance_id": 424242 } }
        ] }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_restore_rejects_version_with_deleted_instance(pool: PgPool) {
    let (_, editor) = user_token(&pool, "editor7", ROLE_EDITOR_ID).await;
    let component = create_component(&pool, &editor, card_component()).await;
    let page = create_page(&pool, &editor, json!({ "title": "Restorable" })).await;
    let page_uri = format!("/api/v1/cms/pages/{}", page["id"]);
    let instance = create_instance(
        &pool,
        &editor,
        &page["id"],
        json!({ "component_id": component["id"], "data": { "title": "Card" } }),
    )
    .await;

    let hero = json!({ "id": "hero", "type": "hero", "content": { "heading": "Hi" } });
    let response = put_json_auth(
        build_test_app(pool.clone()),
        &page_uri,
        &editor,
        json!({ "blocks": [
            hero,
            { "id": "card", "type": "component", "content": { "instance_id": instance["id"] } }
        ] }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = post_json_auth(
        build_test_app(pool.clone()),
        &format!("{page_uri}/versions"),
        &editor,
        json!({ "change_summary": "with card" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = put_json_auth(
        build_test_app(pool.clone()),
        &page_uri,
        &editor,
        json!({ "blocks": [hero] }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = delete_auth(
        build_test_app(pool.clone()),
        &format!("{page_uri}/components/{}", instance["id"]),
        &editor,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = post_json_auth(
        build_test_app(pool.clone()),
        &format!("{page_uri}/versions/1/restore"),
        &editor,
        json!({}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");

    let json = body_json(get_auth(build_test_app(pool), &page_uri, &editor).await).await;
    let blocks = json["data"]["blocks"].as_array().unwrap();
    assert_eq!(blocks.len(), 1);
    assert_eq!(blocks[0]["id"], "hero");
}
