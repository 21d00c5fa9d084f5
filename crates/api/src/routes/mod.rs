pub mod admin;
pub mod auth;
pub mod cms;
pub mod health;
pub mod public;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/login                                        login (public)
/// /auth/refresh                                      refresh (public)
/// /auth/logout                                       logout (requires auth)
/// /auth/me                                           current user
///
/// /public/pages/{slug}                               published page (optional auth)
///
/// /cms/pages                                         list, create
/// /cms/pages/{id}                                    get, update, delete
/// /cms/pages/{id}/status                             change status (PATCH)
/// /cms/pages/{id}/publish                            publish (POST)
/// /cms/pages/{id}/versions                           list, create snapshot
/// /cms/pages/{id}/versions/diff                      diff (?v1=&v2=)
/// /cms/pages/{id}/versions/{version}                 get, delete
/// /cms/pages/{id}/versions/{version}/restore         restore (POST)
/// /cms/pages/{id}/access-control                     list, create rules (admin)
/// /cms/pages/{id}/access-control/effective           caller's permissions
/// /cms/pages/{id}/access-control/{rule_id}           get, update, delete (admin)
/// /cms/pages/{id}/components                         instance tree, place instance
/// /cms/pages/{id}/components/{instance_id}           update, delete instance
/// /cms/components                                    list, create
/// /cms/components/{id}                               get, update, delete
///
/// /admin/organizations                               list, create
/// /admin/organizations/{id}                          get, update, delete
/// /admin/users                                       list, create
/// /admin/users/{id}                                  get, update, deactivate
/// /admin/users/{id}/reset-password                   reset password
/// /admin/users/{id}/roles                            list, assign
/// /admin/users/{id}/roles/{assignment_id}            unassign
/// /admin/roles                                       list, create
/// /admin/roles/{id}                                  get, delete
/// /admin/roles/{id}/permissions                      get, replace
/// /admin/permissions                                 list
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Authentication routes (login, refresh, logout, me).
        .nest("/auth", auth::router())
        // Public renderer.
        .nest("/public", public::router())
        // Authoring: pages, versions, access rules, components.
        .nest("/cms", cms::router())
        // Organizations, users, roles, permissions.
        .nest("/admin", admin::router())
}
