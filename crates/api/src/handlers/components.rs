//! Handlers for `/cms/components` (definitions) and
//! `/cms/pages/{id}/components` (instances placed on a page).

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde_json::Value;
use pagecraft_core::access::PagePermission;
use pagecraft_core::component::{
    validate_component_name, validate_instance_data, validate_nesting, validate_property_defs,
};
use pagecraft_core::error::CoreError;
use pagecraft_core::types::DbId;
use pagecraft_db::models::component::{
    build_instance_tree, Component, ComponentInstance, ComponentInstanceNode, ComponentListParams,
    ComponentWithProperties, CreateComponent, CreateComponentInstance, UpdateComponent,
    UpdateComponentInstance,
};
use pagecraft_db::models::page::Page;
use pagecraft_db::repositories::{ComponentInstanceRepo, ComponentRepo, OrganizationRepo};
use pagecraft_db::DbPool;

use crate::access::require_page_permission;
use crate::error::{AppError, AppResult};
use crate::handlers::pages::ensure_page;
use crate::middleware::rbac::{RequireAuth, RequireAuthor, RequireEditor};
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn ensure_component(pool: &DbPool, id: DbId) -> AppResult<ComponentWithProperties> {
    ComponentRepo::find_with_properties(pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Component",
            id,
        }))
}

fn instance_not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "ComponentInstance",
        id,
    })
}

fn validate_display_name(display_name: &str) -> Result<(), CoreError> {
    if display_name.trim().is_empty() {
        return Err(CoreError::Validation(
            "Display name must not be empty".into(),
        ));
    }
    Ok(())
}

/// A component may be placed on a page if it is active and either global
/// or owned by the page's organization.
fn ensure_placeable(component: &Component, page: &Page) -> Result<(), CoreError> {
    if !component.is_active {
        return Err(CoreError::Validation(format!(
            "Component '{}' is inactive",
            component.name
        )));
    }
    if component.organization_id.is_some() && component.organization_id != page.organization_id {
        return Err(CoreError::Validation(format!(
            "Component '{}' belongs to another organization",
            component.name
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Component definitions
// ---------------------------------------------------------------------------

/// GET /api/v1/cms/components
///
/// Active components, optionally filtered by `category` and
/// `organization_id`. Pass `include_inactive=true` to list all.
pub async fn list_components(
    State(state): State<AppState>,
    RequireAuth(_user): RequireAuth,
    Query(params): Query<ComponentListParams>,
) -> AppResult<Json<DataResponse<Vec<Component>>>> {
    let components = ComponentRepo::list(&state.pool, &params).await?;
    Ok(Json(DataResponse { data: components }))
}

/// GET /api/v1/cms/components/{id}
pub async fn get_component(
    State(state): State<AppState>,
    RequireAuth(_user): RequireAuth,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<ComponentWithProperties>>> {
    let component = ensure_component(&state.pool, id).await?;
    Ok(Json(DataResponse { data: component }))
}

/// POST /api/v1/cms/components
pub async fn create_component(
    State(state): State<AppState>,
    RequireEditor(user): RequireEditor,
    Json(input): Json<CreateComponent>,
) -> AppResult<(StatusCode, Json<DataResponse<ComponentWithProperties>>)> {
    validate_component_name(&input.name)?;
    validate_display_name(&input.display_name)?;
    validate_property_defs(&input.properties)?;
    if let Some(org_id) = input.organization_id {
        if OrganizationRepo::find_by_id(&state.pool, org_id).await?.is_none() {
            return Err(AppError::Core(CoreError::Validation(format!(
                "Organization {org_id} does not exist"
            ))));
        }
    }

    let component = ComponentRepo::create(&state.pool, &input, Some(user.user_id)).await?;

    tracing::info!(
        user_id = user.user_id,
        component_id = component.component.id,
        name = %component.component.name,
        "Component created",
    );
    Ok((StatusCode::CREATED, Json(DataResponse { data: component })))
}

/// PUT /api/v1/cms/components/{id}
///
/// Update metadata. When `properties` is present it replaces the whole
/// property list.
pub async fn update_component(
    State(state): State<AppState>,
    RequireEditor(user): RequireEditor,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateComponent>,
) -> AppResult<Json<DataResponse<ComponentWithProperties>>> {
    if let Some(display_name) = &input.display_name {
        validate_display_name(display_name)?;
    }
    if let Some(properties) = &input.properties {
        validate_property_defs(properties)?;
    }

    let component = ComponentRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Component",
            id,
        }))?;

    tracing::info!(
        user_id = user.user_id,
        component_id = id,
        properties_replaced = input.properties.is_some(),
        "Component updated",
    );
    Ok(Json(DataResponse { data: component }))
}

/// DELETE /api/v1/cms/components/{id}
///
/// Fails with 409 while instances of the component exist.
pub async fn delete_component(
    State(state): State<AppState>,
    RequireEditor(user): RequireEditor,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if !ComponentRepo::delete(&state.pool, id).await? {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Component",
            id,
        }));
    }
    tracing::info!(user_id = user.user_id, component_id = id, "Component deleted");
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Instances
// ---------------------------------------------------------------------------

/// GET /api/v1/cms/pages/{id}/components
///
/// The page's instances as a tree of roots with their children.
pub async fn list_instances(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(page_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<ComponentInstanceNode>>>> {
    let page = ensure_page(&state.pool, page_id).await?;
    require_page_permission(&state.pool, &user, &page, PagePermission::View).await?;

    let instances = ComponentInstanceRepo::list_by_page(&state.pool, page_id).await?;
    Ok(Json(DataResponse {
        data: build_instance_tree(instances),
    }))
}

/// POST /api/v1/cms/pages/{id}/components
///
/// Place a component on the page. Data is validated against the
/// component's properties and defaults are filled in.
pub async fn create_instance(
    State(state): State<AppState>,
    RequireAuthor(user): RequireAuthor,
    Path(page_id): Path<DbId>,
    Json(input): Json<CreateComponentInstance>,
) -> AppResult<(StatusCode, Json<DataResponse<ComponentInstance>>)> {
    let page = ensure_page(&state.pool, page_id).await?;
    require_page_permission(&state.pool, &user, &page, PagePermission::Edit).await?;

    let component = ComponentRepo::find_with_properties(&state.pool, input.component_id)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Validation(format!(
                "Component {} does not exist",
                input.component_id
            )))
        })?;
    ensure_placeable(&component.component, &page)?;

    if let Some(parent_id) = input.parent_id {
        let parent = ComponentInstanceRepo::find_by_id(&state.pool, parent_id)
            .await?
            .ok_or_else(|| {
                AppError::Core(CoreError::Validation(format!(
                    "Parent instance {parent_id} does not exist"
                )))
            })?;
        validate_nesting(page_id, None, &parent.placement())?;
    }

    let data = validate_instance_data(&component.property_defs(), &input.data)?;
    let instance = ComponentInstanceRepo::create(
        &state.pool,
        page_id,
        input.component_id,
        input.parent_id,
        &Value::Object(data),
        input.sort_order,
    )
    .await?;

    tracing::info!(
        user_id = user.user_id,
        page_id,
        instance_id = instance.id,
        component_id = input.component_id,
        "Component instance created",
    );
    Ok((StatusCode::CREATED, Json(DataResponse { data: instance })))
}

/// PUT /api/v1/cms/pages/{id}/components/{instance_id}
pub async fn update_instance(
    State(state): State<AppState>,
    RequireAuthor(user): RequireAuthor,
    Path((page_id, instance_id)): Path<(DbId, DbId)>,
    Json(input): Json<UpdateComponentInstance>,
) -> AppResult<Json<DataResponse<ComponentInstance>>> {
    let page = ensure_page(&state.pool, page_id).await?;
    require_page_permission(&state.pool, &user, &page, PagePermission::Edit).await?;

    let existing = ComponentInstanceRepo::find(&state.pool, page_id, instance_id)
        .await?
        .ok_or_else(|| instance_not_found(instance_id))?;

    let data = match &input.data {
        Some(data) => {
            let component = ensure_component(&state.pool, existing.component_id).await?;
            Some(Value::Object(validate_instance_data(
                &component.property_defs(),
                data,
            )?))
        }
        None => None,
    };

    let instance = ComponentInstanceRepo::update(
        &state.pool,
        page_id,
        instance_id,
        data.as_ref(),
        input.sort_order,
    )
    .await?
    .ok_or_else(|| instance_not_found(instance_id))?;

    tracing::info!(user_id = user.user_id, page_id, instance_id, "Component instance updated");
    Ok(Json(DataResponse { data: instance }))
}

/// DELETE /api/v1/cms/pages/{id}/components/{instance_id}
///
/// Deletes the instance and its children. Fails with 409 while a block on
/// the page still references any of them.
pub async fn delete_instance(
    State(state): State<AppState>,
    RequireAuthor(user): RequireAuthor,
    Path((page_id, instance_id)): Path<(DbId, DbId)>,
) -> AppResult<StatusCode> {
    let page = ensure_page(&state.pool, page_id).await?;
    require_page_permission(&state.pool, &user, &page, PagePermission::Edit).await?;

    if !ComponentInstanceRepo::delete(&state.pool, page_id, instance_id).await? {
        return Err(instance_not_found(instance_id));
    }

    tracing::info!(user_id = user.user_id, page_id, instance_id, "Component instance deleted");
    Ok(StatusCode::NO_CONTENT)
}
