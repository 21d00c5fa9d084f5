//! Page-level permission checks for handlers.
//!
//! Route gates in [`crate::middleware::rbac`] decide who may call an
//! endpoint at all. The helpers here decide what the caller may do to one
//! particular page, by resolving their roles and organizations and
//! evaluating the page's access rules.

use pagecraft_core::access::{
    effective_permissions, require_permission, PagePermission, PermissionSet, Principal,
    UserPrincipal,
};
use pagecraft_core::error::CoreError;
use pagecraft_core::roles::ROLE_ADMIN;
use pagecraft_core::types::DbId;
use pagecraft_db::models::page::Page;
use pagecraft_db::models::page_access_rule::PageAccessRule;
use pagecraft_db::repositories::{PageAccessRuleRepo, RoleRepo, UserRoleRepo};
use pagecraft_db::DbPool;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;

/// Resolve an authenticated caller into a principal for a page in
/// `organization_id`.
///
/// Role assignments scoped to other organizations are ignored.
pub async fn resolve_principal(
    pool: &DbPool,
    user: &AuthUser,
    organization_id: Option<DbId>,
) -> AppResult<UserPrincipal> {
    let role_ids = UserRoleRepo::applicable_role_ids(pool, user.user_id, organization_id).await?;
    let organization_ids = UserRoleRepo::organization_ids(pool, user.user_id).await?;
    let names = RoleRepo::permission_names_for_roles(pool, &role_ids).await?;
    let role_permissions = PermissionSet::try_from(names).map_err(|e| {
        AppError::InternalError(format!("Stored role permission is invalid: {e}"))
    })?;

    Ok(UserPrincipal {
        user_id: user.user_id,
        primary_role: user.role.clone(),
        role_ids,
        organization_ids,
        role_permissions,
    })
}

/// Evaluate against already-loaded rules.
pub async fn permissions_with_rules(
    pool: &DbPool,
    user: Option<&AuthUser>,
    page: &Page,
    rules: &[PageAccessRule],
) -> AppResult<PermissionSet> {
    let principal = match user {
        Some(u) if u.role == ROLE_ADMIN => return Ok(PermissionSet::all()),
        Some(u) => Principal::User(resolve_principal(pool, u, page.organization_id).await?),
        None => Principal::Anonymous,
    };
    let rules: Vec<_> = rules.iter().map(PageAccessRule::to_rule).collect();
    Ok(effective_permissions(&principal, &page.context(), &rules))
}

/// The permissions `user` (or an anonymous caller) holds on `page`.
pub async fn page_permissions(
    pool: &DbPool,
    user: Option<&AuthUser>,
    page: &Page,
) -> AppResult<PermissionSet> {
    if user.is_some_and(|u| u.role == ROLE_ADMIN) {
        return Ok(PermissionSet::all());
    }
    let rules = PageAccessRuleRepo::list_by_page(pool, page.id).await?;
    permissions_with_rules(pool, user, page, &rules).await
}

/// Fail with 403 unless `user` holds `permission` on `page`.
pub async fn require_page_permission(
    pool: &DbPool,
    user: &AuthUser,
    page: &Page,
    permission: PagePermission,
) -> AppResult<()> {
    let granted = page_permissions(pool, Some(user), page).await?;
    require_permission(&granted, permission).map_err(AppError::Core)
}

/// Whether an anonymous or authenticated caller may read `page` through the
/// public renderer. A denial is reported as the page not existing.
pub async fn ensure_publicly_visible(
    pool: &DbPool,
    user: Option<&AuthUser>,
    page: &Page,
) -> AppResult<()> {
    let hidden = || {
        AppError::Core(CoreError::NotFoundByKey {
            entity: "Page",
            key: page.slug.clone(),
        })
    };
    if !page.published {
        return Err(hidden());
    }
    let granted = page_permissions(pool, user, page).await?;
    if granted.contains(PagePermission::View) {
        Ok(())
    } else {
        Err(hidden())
    }
}
