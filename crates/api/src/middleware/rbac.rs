//! Role-based access control (RBAC) extractors.
//!
//! Each extractor wraps [`AuthUser`] and rejects requests whose primary role
//! ranks below the requirement (`admin` > `editor` > `author` > `viewer`).
//! Per-page access rules are checked separately in [`crate::access`].

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use pagecraft_core::error::CoreError;
use pagecraft_core::roles::{satisfies, ROLE_ADMIN, ROLE_AUTHOR, ROLE_EDITOR, ROLE_VIEWER};

use super::auth::AuthUser;
use crate::error::AppError;
use crate::state::AppState;

async fn require_role(
    parts: &mut Parts,
    state: &AppState,
    required: &str,
    message: &str,
) -> Result<AuthUser, AppError> {
    let user = AuthUser::from_request_parts(parts, state).await?;
    if !satisfies(&user.role, required) {
        return Err(AppError::Core(CoreError::Forbidden(message.into())));
    }
    Ok(user)
}

/// Requires the `admin` role. Rejects with 403 Forbidden otherwise.
pub struct RequireAdmin(pub AuthUser);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        require_role(parts, state, ROLE_ADMIN, "Admin role required")
            .await
            .map(RequireAdmin)
    }
}

/// Requires `editor` or higher.
pub struct RequireEditor(pub AuthUser);

impl FromRequestParts<AppState> for RequireEditor {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        require_role(parts, state, ROLE_EDITOR, "Editor or Admin role required")
            .await
            .map(RequireEditor)
    }
}

/// Requires `author` or higher.
pub struct RequireAuthor(pub AuthUser);

impl FromRequestParts<AppState> for RequireAuthor {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        require_role(parts, state, ROLE_AUTHOR, "Author role or higher required")
            .await
            .map(RequireAuthor)
    }
}

/// Requires any CMS role (`viewer` or higher).
///
/// Users holding a custom primary role outside the built-in ladder rank
/// below `viewer` and are rejected.
pub struct RequireAuth(pub AuthUser);

impl FromRequestParts<AppState> for RequireAuth {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        require_role(parts, state, ROLE_VIEWER, "CMS access requires a role")
            .await
            .map(RequireAuth)
    }
}
