//! Integration tests for access rules, role lookups, and components.

use assert_matches::assert_matches;
use serde_json::json;
use sqlx::PgPool;
use pagecraft_core::access::{AccessType, PagePermission, PermissionSet};
use pagecraft_core::component::{PropertyDef, PropertyType};
use pagecraft_db::models::component::{
    build_instance_tree, CreateComponent, UpdateComponent,
};
use pagecraft_db::models::page::CreatePage;
use pagecraft_db::models::page_access_rule::UpsertPageAccessRule;
use pagecraft_db::models::role::CreateRoleAssignment;
use pagecraft_db::models::user::CreateUser;
use pagecraft_db::repositories::{
    ComponentInstanceRepo, ComponentRepo, OrganizationRepo, PageAccessRuleRepo, PageRepo,
    RoleRepo, UserRepo, UserRoleRepo,
};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn page(pool: &PgPool, slug: &str) -> i64 {
    let input = CreatePage {
        title: slug.to_string(),
        slug: None,
        description: None,
        blocks: vec![],
        organization_id: None,
    };
    PageRepo::create(pool, &input, slug, None).await.unwrap().id
}

fn rule(access_type: AccessType, permissions: &[PagePermission]) -> UpsertPageAccessRule {
    UpsertPageAccessRule {
        access_type,
        role_id: None,
        user_id: None,
        organization_id: None,
        permissions: permissions.iter().copied().collect(),
    }
}

fn prop(name: &str, property_type: PropertyType, required: bool) -> PropertyDef {
    PropertyDef {
        name: name.to_string(),
        property_type,
        required,
        default_value: None,
        options: None,
    }
}

fn card() -> CreateComponent {
    CreateComponent {
        name: "card".to_string(),
        display_name: "Card".to_string(),
        description: None,
        category: Some("layout".to_string()),
        organization_id: None,
        properties: vec![
            prop("title", PropertyType::String, true),
            prop("count", PropertyType::Number, false),
        ],
    }
}

// ---------------------------------------------------------------------------
// Roles
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_seeded_role_permissions(pool: PgPool) {
    let author = RoleRepo::find_by_name(&pool, "author").await.unwrap().unwrap();
    let names: Vec<String> = RoleRepo::permissions_for_role(&pool, author.id)
        .await
        .unwrap()
        .into_iter()
        .map(|p| p.name)
        .collect();
    assert_eq!(names, vec!["VIEW", "EDIT"]);

    let viewer = RoleRepo::find_by_name(&pool, "viewer").await.unwrap().unwrap();
    let mut union = RoleRepo::permission_names_for_roles(&pool, &[author.id, viewer.id])
        .await
        .unwrap();
    union.sort();
    assert_eq!(union, vec!["EDIT", "VIEW"]);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_set_permissions_replaces_grants(pool: PgPool) {
    let viewer = RoleRepo::find_by_name(&pool, "viewer").await.unwrap().unwrap();
    let granted = RoleRepo::set_permissions(
        &pool,
        viewer.id,
        &["VIEW".to_string(), "PUBLISH".to_string()],
    )
    .await
    .unwrap();
    let names: Vec<&str> = granted.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["VIEW", "PUBLISH"]);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_applicable_roles_respect_org_scope(pool: PgPool) {
    let acme = OrganizationRepo::create(&pool, "Acme", "acme", None).await.unwrap();
    let other = OrganizationRepo::create(&pool, "Other", "other", None).await.unwrap();
    let user = UserRepo::create(
        &pool,
        &CreateUser {
            username: "alice".to_string(),
            email: "alice@example.com".to_string(),
            password_hash: "x".to_string(),
            role_id: 4,
            organization_id: Some(acme.id),
        },
    )
    .await
    .unwrap();

    UserRoleRepo::assign(
        &pool,
        user.id,
        &CreateRoleAssignment {
            role_id: 2,
            organization_id: Some(acme.id),
        },
    )
    .await
    .unwrap();

    let mut in_acme = UserRoleRepo::applicable_role_ids(&pool, user.id, Some(acme.id))
        .await
        .unwrap();
    in_acme.sort();
    assert_eq!(in_acme, vec![2, 4]);

    let in_other = UserRoleRepo::applicable_role_ids(&pool, user.id, Some(other.id))
        .await
        .unwrap();
    assert_eq!(in_other, vec![4]);

    let orgs = UserRoleRepo::organization_ids(&pool, user.id).await.unwrap();
    assert_eq!(orgs, vec![acme.id]);

    let dup = UserRoleRepo::assign(
        &pool,
        user.id,
        &CreateRoleAssignment {
            role_id: 2,
            organization_id: Some(acme.id),
        },
    )
    .await
    .unwrap_err();
    assert_matches!(
        dup,
        sqlx::Error::Database(db) if db.constraint() == Some("uq_user_roles_assignment")
    );
}

// ---------------------------------------------------------------------------
// Access rules
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_rule_round_trip_and_cascade(pool: PgPool) {
    let page_id = page(&pool, "about").await;

    let created = PageAccessRuleRepo::create(
        &pool,
        page_id,
        &rule(AccessType::Public, &[PagePermission::View]),
        None,
    )
    .await
    .unwrap();
    assert_eq!(created.access_type, AccessType::Public);
    assert_eq!(
        created.permissions,
        [PagePermission::View].into_iter().collect::<PermissionSet>()
    );

    let mut replacement = rule(AccessType::RoleBased, &[PagePermission::View, PagePermission::Edit]);
    replacement.role_id = Some(3);
    let updated = PageAccessRuleRepo::update(&pool, page_id, created.id, &replacement)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.role_id, Some(3));
    assert_eq!(updated.to_rule().permissions.to_strings(), vec!["VIEW", "EDIT"]);

    PageRepo::delete(&pool, page_id).await.unwrap();
    let rules = PageAccessRuleRepo::list_by_page(&pool, page_id).await.unwrap();
    assert!(rules.is_empty());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_rule_target_constraint(pool: PgPool) {
    let page_id = page(&pool, "about").await;
    // ROLE_BASED without role_id slips past the DTO but not the table.
    let err = PageAccessRuleRepo::create(
        &pool,
        page_id,
        &rule(AccessType::RoleBased, &[PagePermission::View]),
        None,
    )
    .await
    .unwrap_err();
    assert_matches!(
        err,
        sqlx::Error::Database(db) if db.constraint() == Some("ck_page_access_rules_target")
    );
}

#[sqlx::test(migrations = "./migrations")]
async fn test_rule_lookup_is_scoped_to_page(pool: PgPool) {
    let first = page(&pool, "first").await;
    let second = page(&pool, "second").await;
    let created = PageAccessRuleRepo::create(
        &pool,
        first,
        &rule(AccessType::Private, &[PagePermission::Edit]),
        None,
    )
    .await
    .unwrap();

    assert!(PageAccessRuleRepo::find(&pool, second, created.id)
        .await
        .unwrap()
        .is_none());
    assert!(!PageAccessRuleRepo::delete(&pool, second, created.id)
        .await
        .unwrap());
}

// ---------------------------------------------------------------------------
// Components
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_component_create_and_replace_properties(pool: PgPool) {
    let created = ComponentRepo::create(&pool, &card(), None).await.unwrap();
    assert_eq!(created.properties.len(), 2);
    assert_eq!(created.properties[0].name, "title");
    assert_eq!(created.properties[1].sort_order, 1);

    let update = UpdateComponent {
        display_name: Some("Feature card".to_string()),
        description: None,
        category: None,
        is_active: None,
        properties: Some(vec![prop("headline", PropertyType::RichText, false)]),
    };
    let updated = ComponentRepo::update(&pool, created.component.id, &update)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.component.display_name, "Feature card");
    assert_eq!(updated.component.category.as_deref(), Some("layout"));
    assert_eq!(updated.properties.len(), 1);
    assert_eq!(updated.properties[0].property_type, PropertyType::RichText);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_component_name_unique(pool: PgPool) {
    ComponentRepo::create(&pool, &card(), None).await.unwrap();
    let err = ComponentRepo::create(&pool, &card(), None).await.unwrap_err();
    assert_matches!(
        err,
        sqlx::Error::Database(db) if db.constraint() == Some("uq_components_global_name")
    );
}

#[sqlx::test(migrations = "./migrations")]
async fn test_component_in_use_cannot_be_deleted(pool: PgPool) {
    let page_id = page(&pool, "home").await;
    let component = ComponentRepo::create(&pool, &card(), None).await.unwrap();
    ComponentInstanceRepo::create(
        &pool,
        page_id,
        component.component.id,
        None,
        &json!({ "title": "Hi" }),
        None,
    )
    .await
    .unwrap();

    let err = ComponentRepo::delete(&pool, component.component.id)
        .await
        .unwrap_err();
    assert_matches!(err, sqlx::Error::Database(db) if db.code().as_deref() == Some("23503"));
}

#[sqlx::test(migrations = "./migrations")]
async fn test_instances_tree_and_cascade(pool: PgPool) {
    let page_id = page(&pool, "home").await;
    let component = ComponentRepo::create(&pool, &card(), None).await.unwrap();
    let component_id = component.component.id;

    let root = ComponentInstanceRepo::create(&pool, page_id, component_id, None, &json!({}), None)
        .await
        .unwrap();
    let second_root =
        ComponentInstanceRepo::create(&pool, page_id, component_id, None, &json!({}), None)
            .await
            .unwrap();
    let child =
        ComponentInstanceRepo::create(&pool, page_id, component_id, Some(root.id), &json!({}), None)
            .await
            .unwrap();

    assert_eq!(root.sort_order, 0);
    assert_eq!(second_root.sort_order, 1);
    assert_eq!(child.sort_order, 0);

    let tree = build_instance_tree(ComponentInstanceRepo::list_by_page(&pool, page_id).await.unwrap());
    assert_eq!(tree.len(), 2);
    assert_eq!(tree[0].children.len(), 1);
    assert_eq!(tree[0].children[0].id, child.id);

    assert!(ComponentInstanceRepo::delete(&pool, page_id, root.id).await.unwrap());
    assert!(ComponentInstanceRepo::find_by_id(&pool, child.id)
        .await
        .unwrap()
        .is_none());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_organization_in_use_cannot_be_deleted(pool: PgPool) {
    let acme = OrganizationRepo::create(&pool, "Acme", "acme", None).await.unwrap();
    let input = CreatePage {
        title: "Acme home".to_string(),
        slug: None,
        description: None,
        blocks: vec![],
        organization_id: Some(acme.id),
    };
    PageRepo::create(&pool, &input, "acme-home", None).await.unwrap();

    let err = OrganizationRepo::delete(&pool, acme.id).await.unwrap_err();
    assert_matches!(err, sqlx::Error::Database(db) if db.code().as_deref() == Some("23503"));
}
