//! Handlers for `/cms/pages/{id}/versions`.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use pagecraft_core::access::PagePermission;
use pagecraft_core::error::CoreError;
use pagecraft_core::types::DbId;
use pagecraft_core::version::{
    diff_snapshots, validate_change_summary, SnapshotDiff, SnapshotView, VersionAction,
};
use pagecraft_db::models::page::Page;
use pagecraft_db::models::page_version::{CreatePageVersion, PageVersion, PageVersionSummary};
use pagecraft_db::repositories::{PageRepo, PageVersionRepo};
use pagecraft_db::DbPool;

use crate::access::require_page_permission;
use crate::error::{AppError, AppResult};
use crate::handlers::pages::ensure_page;
use crate::middleware::rbac::{RequireAuth, RequireAuthor, RequireEditor};
use crate::response::DataResponse;
use crate::state::AppState;

/// Query parameters for `GET /cms/pages/{id}/versions/diff`.
#[derive(Debug, Deserialize)]
pub struct DiffParams {
    pub v1: i32,
    /// Defaults to the page's current content.
    pub v2: Option<i32>,
}

/// Response body for the diff endpoint.
#[derive(Debug, Serialize)]
pub struct VersionDiff {
    pub page_id: DbId,
    pub v1: i32,
    /// `None` when compared against the current page.
    pub v2: Option<i32>,
    #[serde(flatten)]
    pub diff: SnapshotDiff,
}

fn version_not_found(page_id: DbId, version: i32) -> AppError {
    AppError::Core(CoreError::NotFoundByKey {
        entity: "PageVersion",
        key: format!("{page_id}/v{version}"),
    })
}

async fn ensure_version(pool: &DbPool, page_id: DbId, version: i32) -> AppResult<PageVersion> {
    PageVersionRepo::find(pool, page_id, version)
        .await?
        .ok_or_else(|| version_not_found(page_id, version))
}

fn page_view(page: &Page) -> SnapshotView<'_> {
    SnapshotView {
        title: &page.title,
        description: page.description.as_deref(),
        blocks: &page.blocks,
    }
}

/// GET /api/v1/cms/pages/{id}/versions
///
/// Version history, newest first.
pub async fn list_versions(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<PageVersionSummary>>>> {
    let page = ensure_page(&state.pool, id).await?;
    require_page_permission(&state.pool, &user, &page, PagePermission::View).await?;

    let versions = PageVersionRepo::list_by_page(&state.pool, id).await?;
    Ok(Json(DataResponse { data: versions }))
}

/// POST /api/v1/cms/pages/{id}/versions
///
/// Snapshot the page's current content as a `MANUAL` (default) or
/// `AUTOSAVE` version. `PUBLISH` versions are only written by publishing.
pub async fn create_version(
    State(state): State<AppState>,
    RequireAuthor(user): RequireAuthor,
    Path(id): Path<DbId>,
    Json(input): Json<CreatePageVersion>,
) -> AppResult<(StatusCode, Json<DataResponse<PageVersion>>)> {
    let action = input.action.unwrap_or(VersionAction::Manual);
    if action == VersionAction::Publish {
        return Err(AppError::Core(CoreError::Validation(
            "PUBLISH versions are created by publishing the page".into(),
        )));
    }
    if let Some(summary) = &input.change_summary {
        validate_change_summary(summary)?;
    }

    let page = ensure_page(&state.pool, id).await?;
    require_page_permission(&state.pool, &user, &page, PagePermission::Edit).await?;

    let version = PageVersionRepo::create_snapshot(
        &state.pool,
        id,
        action,
        input.change_summary.as_deref(),
        Some(user.user_id),
    )
    .await?
    .ok_or(AppError::Core(CoreError::NotFound { entity: "Page", id }))?;

    tracing::info!(
        user_id = user.user_id,
        page_id = id,
        version = version.version,
        action = %action,
        "Page version created",
    );
    Ok((StatusCode::CREATED, Json(DataResponse { data: version })))
}

/// GET /api/v1/cms/pages/{id}/versions/{version}
pub async fn get_version(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path((id, version)): Path<(DbId, i32)>,
) -> AppResult<Json<DataResponse<PageVersion>>> {
    let page = ensure_page(&state.pool, id).await?;
    require_page_permission(&state.pool, &user, &page, PagePermission::View).await?;

    let snapshot = ensure_version(&state.pool, id, version).await?;
    Ok(Json(DataResponse { data: snapshot }))
}

/// DELETE /api/v1/cms/pages/{id}/versions/{version}
pub async fn delete_version(
    State(state): State<AppState>,
    RequireEditor(user): RequireEditor,
    Path((id, version)): Path<(DbId, i32)>,
) -> AppResult<StatusCode> {
    let page = ensure_page(&state.pool, id).await?;
    require_page_permission(&state.pool, &user, &page, PagePermission::Publish).await?;

    if !PageVersionRepo::delete(&state.pool, id, version).await? {
        return Err(version_not_found(id, version));
    }

    tracing::info!(user_id = user.user_id, page_id = id, version, "Page version deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/cms/pages/{id}/versions/{version}/restore
///
/// Copy a snapshot's title, description, and blocks back onto the page.
/// The page keeps its status and no new version is written.
pub async fn restore_version(
    State(state): State<AppState>,
    RequireEditor(user): RequireEditor,
    Path((id, version)): Path<(DbId, i32)>,
) -> AppResult<Json<DataResponse<Page>>> {
    let page = ensure_page(&state.pool, id).await?;
    require_page_permission(&state.pool, &user, &page, PagePermission::Publish).await?;

    let restored = PageRepo::restore_version(&state.pool, id, version, Some(user.user_id))
        .await?
        .ok_or_else(|| version_not_found(id, version))?;

    tracing::info!(user_id = user.user_id, page_id = id, version, "Page version restored");
    Ok(Json(DataResponse { data: restored }))
}

/// GET /api/v1/cms/pages/{id}/versions/diff?v1=&v2=
///
/// Structural diff from `v1` to `v2`, or to the current page when `v2` is
/// omitted.
pub async fn diff_versions(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<DbId>,
    Query(params): Query<DiffParams>,
) -> AppResult<Json<DataResponse<VersionDiff>>> {
    let page = ensure_page(&state.pool, id).await?;
    require_page_permission(&state.pool, &user, &page, PagePermission::View).await?;

    let old = ensure_version(&state.pool, id, params.v1).await?;
    let diff = match params.v2 {
        Some(v2) => {
            let new = ensure_version(&state.pool, id, v2).await?;
            diff_snapshots(old.view(), new.view())
        }
        None => diff_snapshots(old.view(), page_view(&page)),
    };

    Ok(Json(DataResponse {
        data: VersionDiff {
            page_id: id,
            v1: params.v1,
            v2: params.v2,
            diff,
        },
    }))
}
