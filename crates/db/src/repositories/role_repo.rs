//! Repository for the `roles` and `role_permissions` tables.

use sqlx::PgPool;
use pagecraft_core::types::DbId;

use crate::models::role::{CreateRole, Permission, Role};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, name, description, organization_id, created_at, updated_at";

/// Provides CRUD operations for roles and their permission grants.
pub struct RoleRepo;

impl RoleRepo {
    /// Find a role by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Role>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM roles WHERE id = $1");
        sqlx::query_as::<_, Role>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a global role by name (case-sensitive).
    pub async fn find_by_name(pool: &PgPool, name: &str) -> Result<Option<Role>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM roles WHERE name = $1 AND organization_id IS NULL");
        sqlx::query_as::<_, Role>(&query)
            .bind(name)
            .fetch_optional(pool)
            .await
    }

    /// List all roles ordered by ID ascending.
    pub async fn list(pool: &PgPool) -> Result<Vec<Role>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM roles ORDER BY id ASC");
        sqlx::query_as::<_, Role>(&query).fetch_all(pool).await
    }

    pub async fn create(pool: &PgPool, input: &CreateRole) -> Result<Role, sqlx::Error> {
        let query = format!(
            "INSERT INTO roles (name, description, organization_id)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Role>(&query)
            .bind(&input.name)
            .bind(&input.description)
            .bind(input.organization_id)
            .fetch_one(pool)
            .await
    }

    /// Delete a role. Fails with a foreign-key violation while it is some
    /// user's primary role.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM roles WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Resolve a role ID to its name, returning `"unknown"` if the ID is missing.
    pub async fn resolve_name(pool: &PgPool, role_id: DbId) -> Result<String, sqlx::Error> {
        Ok(Self::find_by_id(pool, role_id)
            .await?
            .map(|r| r.name)
            .unwrap_or_else(|| "unknown".to_string()))
    }

    /// Permissions granted to a single role, by name.
    pub async fn permissions_for_role(
        pool: &PgPool,
        role_id: DbId,
    ) -> Result<Vec<Permission>, sqlx::Error> {
        sqlx::query_as::<_, Permission>(
            "SELECT p.id, p.name, p.description, p.created_at
             FROM role_permissions rp
             JOIN permissions p ON p.id = rp.permission_id
             WHERE rp.role_id = $1
             ORDER BY p.id ASC",
        )
        .bind(role_id)
        .fetch_all(pool)
        .await
    }

    /// Distinct permission names granted by any of `role_ids`.
    pub async fn permission_names_for_roles(
        pool: &PgPool,
        role_ids: &[DbId],
    ) -> Result<Vec<String>, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT DISTINCT p.name
             FROM role_permissions rp
             JOIN permissions p ON p.id = rp.permission_id
             WHERE rp.role_id = ANY($1)",
        )
        .bind(role_ids)
        .fetch_all(pool)
        .await
    }

    /// Replace a role's permission grants with `names` in one transaction.
    ///
    /// Unknown names are ignored by the join; callers validate them first.
    pub async fn set_permissions(
        pool: &PgPool,
        role_id: DbId,
        names: &[String],
    ) -> Result<Vec<Permission>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        sqlx::query("DELETE FROM role_permissions WHERE role_id = $1")
            .bind(role_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query(
            "INSERT INTO role_permissions (role_id, permission_id)
             SELECT $1, id FROM permissions WHERE name = ANY($2)",
        )
        .bind(role_id)
        .bind(names)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Self::permissions_for_role(pool, role_id).await
    }
}
