//! First-run setup.

use pagecraft_core::roles::ROLE_ADMIN;
use pagecraft_core::user::{validate_email, validate_username};
use pagecraft_db::models::user::CreateUser;
use pagecraft_db::repositories::{RoleRepo, UserRepo};
use pagecraft_db::DbPool;

use crate::auth::password::{hash_password, validate_password_strength};
use crate::config::BootstrapAdmin;
use crate::error::{AppError, AppResult};

/// Create the first admin account when the `users` table is empty.
///
/// Returns `true` if a user was created. Does nothing once any user exists,
/// so the credentials can stay in the environment across restarts.
pub async fn ensure_admin(pool: &DbPool, admin: &BootstrapAdmin) -> AppResult<bool> {
    if UserRepo::count(pool).await? > 0 {
        return Ok(false);
    }

    validate_username(&admin.username)?;
    validate_email(&admin.email)?;
    validate_password_strength(&admin.password)?;

    let role = RoleRepo::find_by_name(pool, ROLE_ADMIN)
        .await?
        .ok_or_else(|| AppError::InternalError("Seeded admin role is missing".into()))?;

    let password_hash = hash_password(&admin.password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    let user = UserRepo::create(
        pool,
        &CreateUser {
            username: admin.username.clone(),
            email: admin.email.clone(),
            password_hash,
            role_id: role.id,
            organization_id: None,
        },
    )
    .await?;

    tracing::info!(user_id = user.id, username = %user.username, "Bootstrap admin created");
    Ok(true)
}
