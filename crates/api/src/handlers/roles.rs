//! Handlers for `/admin/roles` and `/admin/permissions`.
//!
//! The seeded global roles (`admin`, `editor`, `author`, `viewer`) can have
//! their grants changed but cannot be deleted. New roles are always scoped
//! to an organization.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use pagecraft_core::access::PermissionSet;
use pagecraft_core::error::CoreError;
use pagecraft_core::roles::is_builtin;
use pagecraft_core::types::DbId;
use pagecraft_db::models::role::{CreateRole, Permission, Role};
use pagecraft_db::repositories::{OrganizationRepo, PermissionRepo, RoleRepo};
use pagecraft_db::DbPool;

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

/// Request body for `PUT /admin/roles/{id}/permissions`.
#[derive(Debug, Deserialize)]
pub struct SetPermissionsRequest {
    pub permissions: PermissionSet,
}

/// A role with its granted permissions.
#[derive(Debug, Serialize)]
pub struct RoleWithPermissions {
    #[serde(flatten)]
    pub role: Role,
    pub permissions: Vec<Permission>,
}

fn validate_role_name(name: &str) -> Result<(), CoreError> {
    if name.trim().is_empty() || name.len() > 100 {
        return Err(CoreError::Validation(
            "Role name must be between 1 and 100 characters".into(),
        ));
    }
    if is_builtin(name) {
        return Err(CoreError::Validation(format!(
            "Role name '{name}' is reserved"
        )));
    }
    Ok(())
}

async fn ensure_role(pool: &DbPool, id: DbId) -> AppResult<Role> {
    RoleRepo::find_by_id(pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Role", id }))
}

/// GET /api/v1/admin/roles
pub async fn list_roles(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> AppResult<Json<DataResponse<Vec<Role>>>> {
    let roles = RoleRepo::list(&state.pool).await?;
    Ok(Json(DataResponse { data: roles }))
}

/// POST /api/v1/admin/roles
///
/// Create an organization-scoped role with no grants. Built-in role names
/// are reserved.
pub async fn create_role(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Json(input): Json<CreateRole>,
) -> AppResult<(StatusCode, Json<DataResponse<Role>>)> {
    validate_role_name(&input.name)?;
    let Some(org_id) = input.organization_id else {
        return Err(AppError::Core(CoreError::Validation(
            "Custom roles must be scoped to an organization".into(),
        )));
    };
    if OrganizationRepo::find_by_id(&state.pool, org_id).await?.is_none() {
        return Err(AppError::Core(CoreError::Validation(format!(
            "Organization {org_id} does not exist"
        ))));
    }

    let role = RoleRepo::create(&state.pool, &input).await?;

    tracing::info!(
        user_id = admin.user_id,
        role_id = role.id,
        organization_id = org_id,
        name = %role.name,
        "Role created",
    );
    Ok((StatusCode::CREATED, Json(DataResponse { data: role })))
}

/// GET /api/v1/admin/roles/{id}
pub async fn get_role(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<RoleWithPermissions>>> {
    let role = ensure_role(&state.pool, id).await?;
    let permissions = RoleRepo::permissions_for_role(&state.pool, id).await?;
    Ok(Json(DataResponse {
        data: RoleWithPermissions { role, permissions },
    }))
}

/// DELETE /api/v1/admin/roles/{id}
///
/// Built-in roles cannot be deleted. A role still used as someone's
/// primary role fails with 409.
pub async fn delete_role(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    let role = ensure_role(&state.pool, id).await?;
    if role.organization_id.is_none() && is_builtin(&role.name) {
        return Err(AppError::Core(CoreError::Conflict(format!(
            "Built-in role '{}' cannot be deleted",
            role.name
        ))));
    }

    if !RoleRepo::delete(&state.pool, id).await? {
        return Err(AppError::Core(CoreError::NotFound { entity: "Role", id }));
    }
    tracing::info!(user_id = admin.user_id, role_id = id, name = %role.name, "Role deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/admin/roles/{id}/permissions
pub async fn get_role_permissions(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<Permission>>>> {
    ensure_role(&state.pool, id).await?;
    let permissions = RoleRepo::permissions_for_role(&state.pool, id).await?;
    Ok(Json(DataResponse { data: permissions }))
}

/// PUT /api/v1/admin/roles/{id}/permissions
///
/// Replace the role's grants. Unknown permission names fail deserialization.
pub async fn set_role_permissions(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
    Json(input): Json<SetPermissionsRequest>,
) -> AppResult<Json<DataResponse<Vec<Permission>>>> {
    ensure_role(&state.pool, id).await?;

    let names = input.permissions.to_strings();
    let permissions = RoleRepo::set_permissions(&state.pool, id, &names).await?;

    tracing::info!(
        user_id = admin.user_id,
        role_id = id,
        permissions = ?names,
        "Role permissions replaced",
    );
    Ok(Json(DataResponse { data: permissions }))
}

/// GET /api/v1/admin/permissions
pub async fn list_permissions(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> AppResult<Json<DataResponse<Vec<Permission>>>> {
    let permissions = PermissionRepo::list(&state.pool).await?;
    Ok(Json(DataResponse { data: permissions }))
}
