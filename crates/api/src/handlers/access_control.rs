//! Handlers for `/cms/pages/{id}/access-control`.
//!
//! Rule management is admin-only. `effective` is open to any CMS user and
//! reports what the caller may do on the page.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;
use pagecraft_core::access::PermissionSet;
use pagecraft_core::error::CoreError;
use pagecraft_core::roles::ROLE_ADMIN;
use pagecraft_core::types::DbId;
use pagecraft_db::models::page_access_rule::{PageAccessRule, UpsertPageAccessRule};
use pagecraft_db::repositories::{OrganizationRepo, PageAccessRuleRepo, RoleRepo, UserRepo};
use pagecraft_db::DbPool;

use crate::access::permissions_with_rules;
use crate::error::{AppError, AppResult};
use crate::handlers::pages::ensure_page;
use crate::middleware::rbac::{RequireAdmin, RequireAuth};
use crate::response::DataResponse;
use crate::state::AppState;

/// Where an effective permission set came from.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PermissionSource {
    /// Admins hold every permission.
    Admin,
    /// The page has no rules; the caller's role grants apply.
    Roles,
    /// The union of the page's matching rules.
    Rules,
}

/// Response body for `GET /cms/pages/{id}/access-control/effective`.
#[derive(Debug, Serialize)]
pub struct EffectivePermissions {
    pub page_id: DbId,
    pub permissions: PermissionSet,
    pub source: PermissionSource,
}

fn rule_not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "PageAccessRule",
        id,
    })
}

/// Validate the discriminator and check the target row exists.
async fn validate_rule(pool: &DbPool, input: &UpsertPageAccessRule) -> AppResult<()> {
    input.to_rule().validate()?;

    let missing = if let Some(role_id) = input.role_id {
        RoleRepo::find_by_id(pool, role_id)
            .await?
            .is_none()
            .then(|| format!("Role {role_id} does not exist"))
    } else if let Some(user_id) = input.user_id {
        UserRepo::find_by_id(pool, user_id)
            .await?
            .is_none()
            .then(|| format!("User {user_id} does not exist"))
    } else if let Some(org_id) = input.organization_id {
        OrganizationRepo::find_by_id(pool, org_id)
            .await?
            .is_none()
            .then(|| format!("Organization {org_id} does not exist"))
    } else {
        None
    };

    match missing {
        Some(msg) => Err(AppError::Core(CoreError::Validation(msg))),
        None => Ok(()),
    }
}

/// GET /api/v1/cms/pages/{id}/access-control
pub async fn list_rules(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(page_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<PageAccessRule>>>> {
    ensure_page(&state.pool, page_id).await?;
    let rules = PageAccessRuleRepo::list_by_page(&state.pool, page_id).await?;
    Ok(Json(DataResponse { data: rules }))
}

/// POST /api/v1/cms/pages/{id}/access-control
pub async fn create_rule(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(page_id): Path<DbId>,
    Json(input): Json<UpsertPageAccessRule>,
) -> AppResult<(StatusCode, Json<DataResponse<PageAccessRule>>)> {
    ensure_page(&state.pool, page_id).await?;
    validate_rule(&state.pool, &input).await?;

    let rule =
        PageAccessRuleRepo::create(&state.pool, page_id, &input, Some(admin.user_id)).await?;

    tracing::info!(
        user_id = admin.user_id,
        page_id,
        rule_id = rule.id,
        access_type = %rule.access_type,
        "Page access rule created",
    );
    Ok((StatusCode::CREATED, Json(DataResponse { data: rule })))
}

/// GET /api/v1/cms/pages/{id}/access-control/{rule_id}
pub async fn get_rule(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path((page_id, rule_id)): Path<(DbId, DbId)>,
) -> AppResult<Json<DataResponse<PageAccessRule>>> {
    let rule = PageAccessRuleRepo::find(&state.pool, page_id, rule_id)
        .await?
        .ok_or_else(|| rule_not_found(rule_id))?;
    Ok(Json(DataResponse { data: rule }))
}

/// PUT /api/v1/cms/pages/{id}/access-control/{rule_id}
///
/// Replace a rule's type, target, and permissions.
pub async fn update_rule(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path((page_id, rule_id)): Path<(DbId, DbId)>,
    Json(input): Json<UpsertPageAccessRule>,
) -> AppResult<Json<DataResponse<PageAccessRule>>> {
    validate_rule(&state.pool, &input).await?;

    let rule = PageAccessRuleRepo::update(&state.pool, page_id, rule_id, &input)
        .await?
        .ok_or_else(|| rule_not_found(rule_id))?;

    tracing::info!(user_id = admin.user_id, page_id, rule_id, "Page access rule updated");
    Ok(Json(DataResponse { data: rule }))
}

/// DELETE /api/v1/cms/pages/{id}/access-control/{rule_id}
pub async fn delete_rule(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path((page_id, rule_id)): Path<(DbId, DbId)>,
) -> AppResult<StatusCode> {
    if !PageAccessRuleRepo::delete(&state.pool, page_id, rule_id).await? {
        return Err(rule_not_found(rule_id));
    }
    tracing::info!(user_id = admin.user_id, page_id, rule_id, "Page access rule deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/cms/pages/{id}/access-control/effective
///
/// The caller's evaluated permission set on this page.
pub async fn effective(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(page_id): Path<DbId>,
) -> AppResult<Json<DataResponse<EffectivePermissions>>> {
    let page = ensure_page(&state.pool, page_id).await?;
    let rules = PageAccessRuleRepo::list_by_page(&state.pool, page_id).await?;

    let source = if user.role == ROLE_ADMIN {
        PermissionSource::Admin
    } else if rules.is_empty() {
        PermissionSource::Roles
    } else {
        PermissionSource::Rules
    };
    let permissions = permissions_with_rules(&state.pool, Some(&user), &page, &rules).await?;

    Ok(Json(DataResponse {
        data: EffectivePermissions {
            page_id,
            permissions,
            source,
        },
    }))
}
