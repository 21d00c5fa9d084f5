//! Repository for the `permissions` catalogue.

use sqlx::PgPool;

use crate::models::role::Permission;

/// Read access to the seeded permission catalogue.
pub struct PermissionRepo;

impl PermissionRepo {
    pub async fn list(pool: &PgPool) -> Result<Vec<Permission>, sqlx::Error> {
        sqlx::query_as::<_, Permission>(
            "SELECT id, name, description, created_at FROM permissions ORDER BY id ASC",
        )
        .fetch_all(pool)
        .await
    }
}
