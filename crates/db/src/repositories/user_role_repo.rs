//! Repository for the `user_roles` table (role assignments).

use sqlx::PgPool;
use pagecraft_core::types::DbId;

use crate::models::role::{CreateRoleAssignment, RoleAssignment};

const COLUMNS: &str = "id, user_id, role_id, organization_id, created_at";

/// Provides operations for additional role assignments.
pub struct UserRoleRepo;

impl UserRoleRepo {
    pub async fn list_for_user(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Vec<RoleAssignment>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM user_roles WHERE user_id = $1 ORDER BY id ASC");
        sqlx::query_as::<_, RoleAssignment>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    /// Assign a role. A duplicate assignment violates `uq_user_roles_assignment`.
    pub async fn assign(
        pool: &PgPool,
        user_id: DbId,
        input: &CreateRoleAssignment,
    ) -> Result<RoleAssignment, sqlx::Error> {
        let query = format!(
            "INSERT INTO user_roles (user_id, role_id, organization_id)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, RoleAssignment>(&query)
            .bind(user_id)
            .bind(input.role_id)
            .bind(input.organization_id)
            .fetch_one(pool)
            .await
    }

    /// Remove one of a user's assignments. Returns `true` if a row was deleted.
    pub async fn unassign(
        pool: &PgPool,
        user_id: DbId,
        assignment_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM user_roles WHERE id = $1 AND user_id = $2")
            .bind(assignment_id)
            .bind(user_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Role ids a user holds on a page owned by `organization_id`: the
    /// primary role plus every global assignment and every assignment scoped
    /// to that organization.
    pub async fn applicable_role_ids(
        pool: &PgPool,
        user_id: DbId,
        organization_id: Option<DbId>,
    ) -> Result<Vec<DbId>, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT role_id FROM users WHERE id = $1
             UNION
             SELECT role_id FROM user_roles
             WHERE user_id = $1
               AND (organization_id IS NULL OR organization_id = $2)",
        )
        .bind(user_id)
        .bind(organization_id)
        .fetch_all(pool)
        .await
    }

    /// Organizations a user belongs to: their home organization plus any
    /// organization they hold a scoped role in.
    pub async fn organization_ids(pool: &PgPool, user_id: DbId) -> Result<Vec<DbId>, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT organization_id FROM users
             WHERE id = $1 AND organization_id IS NOT NULL
             UNION
             SELECT organization_id FROM user_roles
             WHERE user_id = $1 AND organization_id IS NOT NULL",
        )
        .bind(user_id)
        .fetch_all(pool)
        .await
    }
}
