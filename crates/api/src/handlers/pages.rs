//! Handlers for the `/cms/pages` resource.
//!
//! Route gates come from the RBAC extractors; on top of that every
//! single-page operation checks the caller's effective permissions on the
//! page (see [`crate::access`]).

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use pagecraft_core::access::PagePermission;
use pagecraft_core::block::{referenced_instance_ids, validate_blocks};
use pagecraft_core::error::CoreError;
use pagecraft_core::page::{validate_description, validate_title, PageStatus};
use pagecraft_core::pagination::{clamp_limit, clamp_offset, DEFAULT_LIMIT, MAX_LIMIT};
use pagecraft_core::slug::{resolve_slug, validate_slug};
use pagecraft_core::types::DbId;
use pagecraft_db::models::page::{CreatePage, Page, PageListParams, PageSummary, UpdatePage};
use pagecraft_db::repositories::{OrganizationRepo, PageRepo, StatusChange};
use pagecraft_db::DbPool;

use crate::access::require_page_permission;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::{RequireAuth, RequireAuthor, RequireEditor};
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// Request body for `PATCH /cms/pages/{id}/status`.
#[derive(Debug, Deserialize)]
pub struct ChangeStatusRequest {
    pub status: PageStatus,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Load a page or fail with 404.
pub(crate) async fn ensure_page(pool: &DbPool, id: DbId) -> AppResult<Page> {
    PageRepo::find_by_id(pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Page", id }))
}

async fn ensure_organization_exists(pool: &DbPool, organization_id: DbId) -> AppResult<()> {
    if OrganizationRepo::find_by_id(pool, organization_id).await?.is_none() {
        return Err(AppError::Core(CoreError::Validation(format!(
            "Organization {organization_id} does not exist"
        ))));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/v1/cms/pages
///
/// List pages, optionally filtered by `status`, `organization_id`, and a
/// title/slug `search`. Paginated with `limit`/`offset`.
pub async fn list_pages(
    State(state): State<AppState>,
    RequireAuth(_user): RequireAuth,
    Query(params): Query<PageListParams>,
) -> AppResult<Json<DataResponse<Vec<PageSummary>>>> {
    let status = params
        .status
        .as_deref()
        .map(str::parse::<PageStatus>)
        .transpose()?;
    let limit = clamp_limit(params.limit, DEFAULT_LIMIT, MAX_LIMIT);
    let offset = clamp_offset(params.offset);

    let pages = PageRepo::list(
        &state.pool,
        status,
        params.organization_id,
        params.search.as_deref(),
        limit,
        offset,
    )
    .await?;
    Ok(Json(DataResponse { data: pages }))
}

/// POST /api/v1/cms/pages
///
/// Create a page. It always starts in `DRAFT`. The slug is generated from
/// the title when not provided.
pub async fn create_page(
    State(state): State<AppState>,
    RequireAuthor(user): RequireAuthor,
    Json(input): Json<CreatePage>,
) -> AppResult<(StatusCode, Json<DataResponse<Page>>)> {
    validate_title(&input.title)?;
    if let Some(description) = &input.description {
        validate_description(description)?;
    }
    validate_blocks(&input.blocks)?;
    if !referenced_instance_ids(&input.blocks).is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "Component blocks can only be added after the page exists".into(),
        )));
    }
    if let Some(org_id) = input.organization_id {
        ensure_organization_exists(&state.pool, org_id).await?;
    }

    let slug = resolve_slug(input.slug.as_deref(), &input.title)?;
    let page = PageRepo::create(&state.pool, &input, &slug, Some(user.user_id)).await?;

    tracing::info!(user_id = user.user_id, page_id = page.id, slug = %page.slug, "Page created");
    Ok((StatusCode::CREATED, Json(DataResponse { data: page })))
}

/// GET /api/v1/cms/pages/{id}
pub async fn get_page(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Page>>> {
    let page = ensure_page(&state.pool, id).await?;
    require_page_permission(&state.pool, &user, &page, PagePermission::View).await?;
    Ok(Json(DataResponse { data: page }))
}

/// PUT /api/v1/cms/pages/{id}
///
/// Update title, slug, description, and/or blocks. Status is changed only
/// through the status and publish endpoints.
pub async fn update_page(
    State(state): State<AppState>,
    RequireAuthor(user): RequireAuthor,
    Path(id): Path<DbId>,
    Json(input): Json<UpdatePage>,
) -> AppResult<Json<DataResponse<Page>>> {
    let page = ensure_page(&state.pool, id).await?;
    require_page_permission(&state.pool, &user, &page, PagePermission::Edit).await?;

    if let Some(title) = &input.title {
        validate_title(title)?;
    }
    if let Some(description) = &input.description {
        validate_description(description)?;
    }
    if let Some(slug) = &input.slug {
        validate_slug(slug)?;
    }
    if let Some(blocks) = &input.blocks {
        validate_blocks(blocks)?;
    }

    let updated = PageRepo::update(
        &state.pool,
        id,
        &input,
        input.slug.as_deref(),
        Some(user.user_id),
    )
    .await?
    .ok_or(AppError::Core(CoreError::NotFound { entity: "Page", id }))?;

    tracing::info!(user_id = user.user_id, page_id = id, "Page updated");
    Ok(Json(DataResponse { data: updated }))
}

/// DELETE /api/v1/cms/pages/{id}
///
/// Delete a page with its versions, access rules, and component instances.
pub async fn delete_page(
    State(state): State<AppState>,
    RequireEditor(user): RequireEditor,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    let page = ensure_page(&state.pool, id).await?;
    require_page_permission(&state.pool, &user, &page, PagePermission::Delete).await?;

    if !PageRepo::delete(&state.pool, id).await? {
        return Err(AppError::Core(CoreError::NotFound { entity: "Page", id }));
    }

    tracing::info!(user_id = user.user_id, page_id = id, slug = %page.slug, "Page deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// PATCH /api/v1/cms/pages/{id}/status
///
/// Move a page to another status. Entering `PUBLISHED` snapshots a version.
pub async fn change_status(
    State(state): State<AppState>,
    RequireEditor(user): RequireEditor,
    Path(id): Path<DbId>,
    Json(input): Json<ChangeStatusRequest>,
) -> AppResult<Json<DataResponse<StatusChange>>> {
    transition(&state, &user, id, input.status).await
}

/// POST /api/v1/cms/pages/{id}/publish
///
/// Shorthand for a status change to `PUBLISHED`.
pub async fn publish_page(
    State(state): State<AppState>,
    RequireEditor(user): RequireEditor,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<StatusChange>>> {
    transition(&state, &user, id, PageStatus::Published).await
}

async fn transition(
    state: &AppState,
    user: &AuthUser,
    id: DbId,
    to: PageStatus,
) -> AppResult<Json<DataResponse<StatusChange>>> {
    let page = ensure_page(&state.pool, id).await?;
    require_page_permission(&state.pool, user, &page, PagePermission::Publish).await?;

    let change = PageRepo::transition_status(&state.pool, id, to, Some(user.user_id))
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Page", id }))?;

    tracing::info!(
        user_id = user.user_id,
        page_id = id,
        from = %page.status,
        to = %to,
        version = change.version.as_ref().map(|v| v.version),
        "Page status changed",
    );
    Ok(Json(DataResponse { data: change }))
}
