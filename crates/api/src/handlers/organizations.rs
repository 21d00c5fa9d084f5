//! Handlers for `/admin/organizations`.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use pagecraft_core::error::CoreError;
use pagecraft_core::organization::validate_name;
use pagecraft_core::slug::{resolve_slug, validate_slug};
use pagecraft_core::types::DbId;
use pagecraft_db::models::organization::{CreateOrganization, Organization, UpdateOrganization};
use pagecraft_db::repositories::OrganizationRepo;

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

fn organization_not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "Organization",
        id,
    })
}

/// GET /api/v1/admin/organizations
pub async fn list_organizations(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> AppResult<Json<DataResponse<Vec<Organization>>>> {
    let organizations = OrganizationRepo::list(&state.pool).await?;
    Ok(Json(DataResponse {
        data: organizations,
    }))
}

/// POST /api/v1/admin/organizations
///
/// The slug is generated from the name when not provided.
pub async fn create_organization(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Json(input): Json<CreateOrganization>,
) -> AppResult<(StatusCode, Json<DataResponse<Organization>>)> {
    validate_name(&input.name)?;
    let slug = resolve_slug(input.slug.as_deref(), &input.name)?;

    let organization = OrganizationRepo::create(
        &state.pool,
        &input.name,
        &slug,
        input.description.as_deref(),
    )
    .await?;

    tracing::info!(
        user_id = admin.user_id,
        organization_id = organization.id,
        slug = %organization.slug,
        "Organization created",
    );
    Ok((StatusCode::CREATED, Json(DataResponse { data: organization })))
}

/// GET /api/v1/admin/organizations/{id}
pub async fn get_organization(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Organization>>> {
    let organization = OrganizationRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| organization_not_found(id))?;
    Ok(Json(DataResponse { data: organization }))
}

/// PUT /api/v1/admin/organizations/{id}
pub async fn update_organization(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateOrganization>,
) -> AppResult<Json<DataResponse<Organization>>> {
    if let Some(name) = &input.name {
        validate_name(name)?;
    }
    if let Some(slug) = &input.slug {
        validate_slug(slug)?;
    }

    let organization = OrganizationRepo::update(&state.pool, id, &input)
        .await?
        .ok_or_else(|| organization_not_found(id))?;

    tracing::info!(user_id = admin.user_id, organization_id = id, "Organization updated");
    Ok(Json(DataResponse { data: organization }))
}

/// DELETE /api/v1/admin/organizations/{id}
///
/// Fails with 409 while users, pages, or components still belong to it.
pub async fn delete_organization(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if !OrganizationRepo::delete(&state.pool, id).await? {
        return Err(organization_not_found(id));
    }
    tracing::info!(user_id = admin.user_id, organization_id = id, "Organization deleted");
    Ok(StatusCode::NO_CONTENT)
}
