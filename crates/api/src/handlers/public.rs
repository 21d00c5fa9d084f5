//! Handler for the public page renderer.

use std::collections::{BTreeSet, HashMap};

use axum::extract::{Path, State};
use axum::Json;
use pagecraft_core::error::CoreError;
use pagecraft_core::types::DbId;
use pagecraft_db::repositories::{ComponentInstanceRepo, ComponentRepo, PageRepo};

use crate::access::ensure_publicly_visible;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::OptionalAuthUser;
use crate::render::{render_page, RenderedPage};
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/public/pages/{slug}
///
/// Serve a published page the caller may view. Anything else, including a
/// page that exists but is hidden from the caller, is a 404.
pub async fn get_page_by_slug(
    State(state): State<AppState>,
    OptionalAuthUser(user): OptionalAuthUser,
    Path(slug): Path<String>,
) -> AppResult<Json<DataResponse<RenderedPage>>> {
    let page = PageRepo::find_by_slug(&state.pool, &slug)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::NotFoundByKey {
                entity: "Page",
                key: slug.clone(),
            })
        })?;
    ensure_publicly_visible(&state.pool, user.as_ref(), &page).await?;

    let instances = ComponentInstanceRepo::list_by_page(&state.pool, page.id).await?;
    let component_ids: BTreeSet<DbId> = instances.iter().map(|i| i.component_id).collect();
    let mut names = HashMap::with_capacity(component_ids.len());
    for component_id in component_ids {
        if let Some(component) = ComponentRepo::find_by_id(&state.pool, component_id).await? {
            names.insert(component_id, component.name);
        }
    }

    tracing::debug!(page_id = page.id, slug = %page.slug, "Serving public page");
    Ok(Json(DataResponse {
        data: render_page(&page, &instances, &names),
    }))
}
