//! JWT-based authentication extractors for Axum handlers.

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum_extra::extract::cookie::CookieJar;
use pagecraft_core::error::CoreError;
use pagecraft_core::types::DbId;

use crate::auth::cookie::ACCESS_TOKEN_COOKIE;
use crate::auth::jwt::validate_token;
use crate::error::AppError;
use crate::state::AppState;

/// Authenticated user decoded from the access token.
///
/// The token is read from `Authorization: Bearer <jwt>` first, falling back
/// to the `access_token` cookie.
///
/// ```ignore
/// async fn my_handler(user: AuthUser) -> AppResult<Json<()>> {
///     tracing::info!(user_id = user.user_id, role = %user.role, "handling request");
///     Ok(Json(()))
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AuthUser {
    /// The user's internal database id (from `claims.sub`).
    pub user_id: DbId,
    /// Primary role name (e.g. `"admin"`, `"editor"`).
    pub role: String,
    /// Home organization (from `claims.org`).
    pub organization_id: Option<DbId>,
}

/// Pull the raw token out of the request, if one was presented.
///
/// A malformed `Authorization` header is an error; a missing one is not.
fn extract_token(parts: &Parts) -> Result<Option<String>, AppError> {
    if let Some(value) = parts.headers.get(AUTHORIZATION) {
        let header = value.to_str().map_err(|_| {
            AppError::Core(CoreError::Unauthorized(
                "Invalid Authorization header".into(),
            ))
        })?;
        let token = header.strip_prefix("Bearer ").ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized(
                "Invalid Authorization format. Expected: Bearer <token>".into(),
            ))
        })?;
        return Ok(Some(token.to_string()));
    }

    let jar = CookieJar::from_headers(&parts.headers);
    Ok(jar
        .get(ACCESS_TOKEN_COOKIE)
        .map(|c| c.value().to_string())
        .filter(|v| !v.is_empty()))
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = extract_token(parts)?.ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized(
                "Missing access token".into(),
            ))
        })?;

        let claims = validate_token(&token, &state.config.jwt).map_err(|_| {
            AppError::Core(CoreError::Unauthorized("Invalid or expired token".into()))
        })?;

        Ok(AuthUser {
            user_id: claims.sub,
            role: claims.role,
            organization_id: claims.org,
        })
    }
}

/// The caller if they presented a valid token, otherwise `None`.
///
/// Invalid or expired tokens are treated as anonymous so a stale cookie never
/// blocks public pages.
#[derive(Debug, Clone)]
pub struct OptionalAuthUser(pub Option<AuthUser>);

impl FromRequestParts<AppState> for OptionalAuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        Ok(OptionalAuthUser(
            AuthUser::from_request_parts(parts, state).await.ok(),
        ))
    }
}
