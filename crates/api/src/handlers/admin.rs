//! Handlers for `/admin/users` (user management and role assignments).
//!
//! All handlers require the `admin` role via [`RequireAdmin`].

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use pagecraft_core::error::CoreError;
use pagecraft_core::pagination::{clamp_limit, clamp_offset, DEFAULT_LIMIT, MAX_LIMIT};
use pagecraft_core::types::DbId;
use pagecraft_core::user::{validate_email, validate_username};
use pagecraft_db::models::role::{CreateRoleAssignment, Role, RoleAssignment};
use pagecraft_db::models::user::{CreateUser, UpdateUser, User, UserResponse};
use pagecraft_db::repositories::{OrganizationRepo, RoleRepo, UserRepo, UserRoleRepo};
use pagecraft_db::DbPool;

use crate::auth::password::{hash_password, validate_password_strength};
use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireAdmin;
use crate::query::PaginationParams;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// Request body for `POST /admin/users`.
#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub role_id: DbId,
    pub organization_id: Option<DbId>,
}

/// Request body for `PUT /admin/users/{id}`.
#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub role_id: Option<DbId>,
    pub organization_id: Option<DbId>,
    pub is_active: Option<bool>,
}

/// Request body for `POST /admin/users/{id}/reset-password`.
#[derive(Debug, Deserialize)]
pub struct ResetPasswordRequest {
    pub new_password: String,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn user_not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound { entity: "User", id })
}

/// Load a role that may serve as a primary role. Only global roles qualify,
/// since route gates are decided by the primary role's name.
async fn ensure_primary_role(pool: &DbPool, role_id: DbId) -> AppResult<Role> {
    let role = RoleRepo::find_by_id(pool, role_id).await?.ok_or_else(|| {
        AppError::Core(CoreError::Validation(format!(
            "Role {role_id} does not exist"
        )))
    })?;
    if role.organization_id.is_some() {
        return Err(AppError::Core(CoreError::Validation(format!(
            "Role '{}' is organization-scoped and cannot be a primary role",
            role.name
        ))));
    }
    Ok(role)
}

async fn ensure_organization(pool: &DbPool, organization_id: DbId) -> AppResult<()> {
    if OrganizationRepo::find_by_id(pool, organization_id).await?.is_none() {
        return Err(AppError::Core(CoreError::Validation(format!(
            "Organization {organization_id} does not exist"
        ))));
    }
    Ok(())
}

/// Convert a [`User`] row into a safe [`UserResponse`] by resolving the role name.
async fn user_to_response(pool: &DbPool, user: &User) -> AppResult<UserResponse> {
    let role_name = RoleRepo::resolve_name(pool, user.role_id).await?;
    Ok(UserResponse::from_user(user, role_name))
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

/// POST /api/v1/admin/users
///
/// Create a new user. Validates password strength, hashes it, and returns
/// a safe [`UserResponse`] with 201 Created.
pub async fn create_user(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Json(input): Json<CreateUserRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<UserResponse>>)> {
    validate_username(&input.username)?;
    validate_email(&input.email)?;
    validate_password_strength(&input.password)?;
    let role = ensure_primary_role(&state.pool, input.role_id).await?;
    if let Some(org_id) = input.organization_id {
        ensure_organization(&state.pool, org_id).await?;
    }

    let password_hash = hash_password(&input.password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    let user = UserRepo::create(
        &state.pool,
        &CreateUser {
            username: input.username,
            email: input.email,
            password_hash,
            role_id: role.id,
            organization_id: input.organization_id,
        },
    )
    .await?;

    tracing::info!(
        user_id = admin.user_id,
        created_user_id = user.id,
        role = %role.name,
        "User created",
    );
    let response = UserResponse::from_user(&user, role.name);
    Ok((StatusCode::CREATED, Json(DataResponse { data: response })))
}

/// GET /api/v1/admin/users
///
/// List users with resolved role names, newest first. Paginated with
/// `limit`/`offset`.
pub async fn list_users(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Query(params): Query<PaginationParams>,
) -> AppResult<Json<DataResponse<Vec<UserResponse>>>> {
    let limit = clamp_limit(params.limit, DEFAULT_LIMIT, MAX_LIMIT);
    let offset = clamp_offset(params.offset);
    let users = UserRepo::list(&state.pool, limit, offset).await?;

    // Pre-fetch all roles to avoid N+1 queries.
    let roles = RoleRepo::list(&state.pool).await?;

    let responses = users
        .iter()
        .map(|u| {
            let role_name = roles
                .iter()
                .find(|r| r.id == u.role_id)
                .map(|r| r.name.clone())
                .unwrap_or_else(|| "unknown".to_string());
            UserResponse::from_user(u, role_name)
        })
        .collect();

    Ok(Json(DataResponse { data: responses }))
}

/// GET /api/v1/admin/users/{id}
pub async fn get_user(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<UserResponse>>> {
    let user = UserRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| user_not_found(id))?;
    let response = user_to_response(&state.pool, &user).await?;
    Ok(Json(DataResponse { data: response }))
}

/// PUT /api/v1/admin/users/{id}
///
/// Update profile fields, primary role, organization, or active flag (not
/// the password).
pub async fn update_user(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateUserRequest>,
) -> AppResult<Json<DataResponse<UserResponse>>> {
    if let Some(username) = &input.username {
        validate_username(username)?;
    }
    if let Some(email) = &input.email {
        validate_email(email)?;
    }
    if let Some(role_id) = input.role_id {
        ensure_primary_role(&state.pool, role_id).await?;
    }
    if let Some(org_id) = input.organization_id {
        ensure_organization(&state.pool, org_id).await?;
    }

    let update_dto = UpdateUser {
        username: input.username,
        email: input.email,
        role_id: input.role_id,
        organization_id: input.organization_id,
        is_active: input.is_active,
    };

    let user = UserRepo::update(&state.pool, id, &update_dto)
        .await?
        .ok_or_else(|| user_not_found(id))?;

    tracing::info!(user_id = admin.user_id, updated_user_id = id, "User updated");
    let response = user_to_response(&state.pool, &user).await?;
    Ok(Json(DataResponse { data: response }))
}

/// DELETE /api/v1/admin/users/{id}
///
/// Soft-deactivate a user (sets `is_active = false`). Returns 204 No Content.
pub async fn deactivate_user(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if id == admin.user_id {
        return Err(AppError::Core(CoreError::Validation(
            "Administrators cannot deactivate themselves".into(),
        )));
    }
    if !UserRepo::deactivate(&state.pool, id).await? {
        return Err(user_not_found(id));
    }
    tracing::info!(user_id = admin.user_id, deactivated_user_id = id, "User deactivated");
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/admin/users/{id}/reset-password
pub async fn reset_password(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
    Json(input): Json<ResetPasswordRequest>,
) -> AppResult<StatusCode> {
    validate_password_strength(&input.new_password)?;

    let hashed = hash_password(&input.new_password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    if !UserRepo::update_password(&state.pool, id, &hashed).await? {
        return Err(user_not_found(id));
    }
    tracing::info!(user_id = admin.user_id, target_user_id = id, "Password reset");
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Role assignments
// ---------------------------------------------------------------------------

/// GET /api/v1/admin/users/{id}/roles
pub async fn list_role_assignments(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<RoleAssignment>>>> {
    UserRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| user_not_found(id))?;
    let assignments = UserRoleRepo::list_for_user(&state.pool, id).await?;
    Ok(Json(DataResponse { data: assignments }))
}

/// POST /api/v1/admin/users/{id}/roles
///
/// Grant an additional role, globally or within one organization. An
/// organization-scoped role can only be assigned within its organization.
pub async fn assign_role(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
    Json(input): Json<CreateRoleAssignment>,
) -> AppResult<(StatusCode, Json<DataResponse<RoleAssignment>>)> {
    UserRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| user_not_found(id))?;

    let role = RoleRepo::find_by_id(&state.pool, input.role_id)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Validation(format!(
                "Role {} does not exist",
                input.role_id
            )))
        })?;
    if let Some(role_org) = role.organization_id {
        if input.organization_id != Some(role_org) {
            return Err(AppError::Core(CoreError::Validation(format!(
                "Role '{}' can only be assigned within organization {role_org}",
                role.name
            ))));
        }
    }
    if let Some(org_id) = input.organization_id {
        ensure_organization(&state.pool, org_id).await?;
    }

    let assignment = UserRoleRepo::assign(&state.pool, id, &input).await?;

    tracing::info!(
        user_id = admin.user_id,
        target_user_id = id,
        role_id = role.id,
        organization_id = input.organization_id,
        "Role assigned",
    );
    Ok((StatusCode::CREATED, Json(DataResponse { data: assignment })))
}

/// DELETE /api/v1/admin/users/{id}/roles/{assignment_id}
pub async fn unassign_role(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path((id, assignment_id)): Path<(DbId, DbId)>,
) -> AppResult<StatusCode> {
    if !UserRoleRepo::unassign(&state.pool, id, assignment_id).await? {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "RoleAssignment",
            id: assignment_id,
        }));
    }
    tracing::info!(user_id = admin.user_id, target_user_id = id, assignment_id, "Role unassigned");
    Ok(StatusCode::NO_CONTENT)
}
