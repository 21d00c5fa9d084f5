//! Route definitions for the `/cms` resource.

use axum::routing::{get, patch, post, put};
use axum::Router;

use crate::handlers::{access_control, components, pages, versions};
use crate::state::AppState;

/// Routes mounted at `/cms`.
///
/// Role gates and page permissions are enforced by handler extractors.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/pages", get(pages::list_pages).post(pages::create_page))
        .route(
            "/pages/{id}",
            get(pages::get_page)
                .put(pages::update_page)
                .delete(pages::delete_page),
        )
        .route("/pages/{id}/status", patch(pages::change_status))
        .route("/pages/{id}/publish", post(pages::publish_page))
        .merge(version_routes())
        .merge(access_routes())
        .merge(component_routes())
}

/// ```text
/// GET    /pages/{id}/versions                      -> list_versions
/// POST   /pages/{id}/versions                      -> create_version
/// GET    /pages/{id}/versions/diff                 -> diff_versions
/// GET    /pages/{id}/versions/{version}            -> get_version
/// DELETE /pages/{id}/versions/{version}            -> delete_version
/// POST   /pages/{id}/versions/{version}/restore    -> restore_version
/// ```
fn version_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/pages/{id}/versions",
            get(versions::list_versions).post(versions::create_version),
        )
        .route("/pages/{id}/versions/diff", get(versions::diff_versions))
        .route(
            "/pages/{id}/versions/{version}",
            get(versions::get_version).delete(versions::delete_version),
        )
        .route(
            "/pages/{id}/versions/{version}/restore",
            post(versions::restore_version),
        )
}

/// ```text
/// GET    /pages/{id}/access-control                -> list_rules
/// POST   /pages/{id}/access-control                -> create_rule
/// GET    /pages/{id}/access-control/effective      -> effective
/// GET    /pages/{id}/access-control/{rule_id}      -> get_rule
/// PUT    /pages/{id}/access-control/{rule_id}      -> update_rule
/// DELETE /pages/{id}/access-control/{rule_id}      -> delete_rule
/// ```
fn access_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/pages/{id}/access-control",
            get(access_control::list_rules).post(access_control::create_rule),
        )
        .route(
            "/pages/{id}/access-control/effective",
            get(access_control::effective),
        )
        .route(
            "/pages/{id}/access-control/{rule_id}",
            get(access_control::get_rule)
                .put(access_control::update_rule)
                .delete(access_control::delete_rule),
        )
}

/// ```text
/// GET    /pages/{id}/components                    -> list_instances
/// POST   /pages/{id}/components                    -> create_instance
/// PUT    /pages/{id}/components/{instance_id}      -> update_instance
/// DELETE /pages/{id}/components/{instance_id}      -> delete_instance
/// GET    /components                               -> list_components
/// POST   /components                               -> create_component
/// GET    /components/{id}                          -> get_component
/// PUT    /components/{id}                          -> update_component
/// DELETE /components/{id}                          -> delete_component
/// ```
fn component_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/pages/{id}/components",
            get(components::list_instances).post(components::create_instance),
        )
        .route(
            "/pages/{id}/components/{instance_id}",
            put(components::update_instance).delete(components::delete_instance),
        )
        .route(
            "/components",
            get(components::list_components).post(components::create_component),
        )
        .route(
            "/components/{id}",
            get(components::get_component)
                .put(components::update_component)
                .delete(components::delete_component),
        )
}
