//! Route definitions for the `/admin` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{admin, organizations, roles};
use crate::state::AppState;

/// Routes mounted at `/admin`.
///
/// All routes require the `admin` role (enforced by handler extractors).
///
/// ```text
/// GET    /organizations                      -> list_organizations
/// POST   /organizations                      -> create_organization
/// GET    /organizations/{id}                 -> get_organization
/// PUT    /organizations/{id}                 -> update_organization
/// DELETE /organizations/{id}                 -> delete_organization
/// GET    /users                              -> list_users
/// POST   /users                              -> create_user
/// GET    /users/{id}                         -> get_user
/// PUT    /users/{id}                         -> update_user
/// DELETE /users/{id}                         -> deactivate_user
/// POST   /users/{id}/reset-password          -> reset_password
/// GET    /users/{id}/roles                   -> list_role_assignments
/// POST   /users/{id}/roles                   -> assign_role
/// DELETE /users/{id}/roles/{assignment_id}   -> unassign_role
/// GET    /roles                              -> list_roles
/// POST   /roles                              -> create_role
/// GET    /roles/{id}                         -> get_role
/// DELETE /roles/{id}                         -> delete_role
/// GET    /roles/{id}/permissions             -> get_role_permissions
/// PUT    /roles/{id}/permissions             -> set_role_permissions
/// GET    /permissions                        -> list_permissions
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/organizations",
            get(organizations::list_organizations).post(organizations::create_organization),
        )
        .route(
            "/organizations/{id}",
            get(organizations::get_organization)
                .put(organizations::update_organization)
                .delete(organizations::delete_organization),
        )
        .route("/users", get(admin::list_users).post(admin::create_user))
        .route(
            "/users/{id}",
            get(admin::get_user)
                .put(admin::update_user)
                .delete(admin::deactivate_user),
        )
        .route("/users/{id}/reset-password", post(admin::reset_password))
        .route(
            "/users/{id}/roles",
            get(admin::list_role_assignments).post(admin::assign_role),
        )
        .route(
            "/users/{id}/roles/{assignment_id}",
            axum::routing::delete(admin::unassign_role),
        )
        .route("/roles", get(roles::list_roles).post(roles::create_role))
        .route(
            "/roles/{id}",
            get(roles::get_role).delete(roles::delete_role),
        )
        .route(
            "/roles/{id}/permissions",
            get(roles::get_role_permissions).put(roles::set_role_permissions),
        )
        .route("/permissions", get(roles::list_permissions))
}
