//! Repository for the `page_access_rules` table.

use sqlx::PgPool;
use pagecraft_core::types::DbId;

use crate::models::page_access_rule::{PageAccessRule, UpsertPageAccessRule};

const COLUMNS: &str = "id, page_id, access_type, role_id, user_id, organization_id, \
    permissions, created_by, created_at, updated_at";

/// Provides CRUD operations for per-page access rules.
pub struct PageAccessRuleRepo;

impl PageAccessRuleRepo {
    pub async fn list_by_page(
        pool: &PgPool,
        page_id: DbId,
    ) -> Result<Vec<PageAccessRule>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM page_access_rules WHERE page_id = $1 ORDER BY id ASC");
        sqlx::query_as::<_, PageAccessRule>(&query)
            .bind(page_id)
            .fetch_all(pool)
            .await
    }

    /// Find a rule, scoped to its page.
    pub async fn find(
        pool: &PgPool,
        page_id: DbId,
        id: DbId,
    ) -> Result<Option<PageAccessRule>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM page_access_rules WHERE id = $1 AND page_id = $2");
        sqlx::query_as::<_, PageAccessRule>(&query)
            .bind(id)
            .bind(page_id)
            .fetch_optional(pool)
            .await
    }

    pub async fn create(
        pool: &PgPool,
        page_id: DbId,
        input: &UpsertPageAccessRule,
        user_id: Option<DbId>,
    ) -> Result<PageAccessRule, sqlx::Error> {
        let query = format!(
            "INSERT INTO page_access_rules
                (page_id, access_type, role_id, user_id, organization_id, permissions, created_by)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, PageAccessRule>(&query)
            .bind(page_id)
            .bind(input.access_type.as_str())
            .bind(input.role_id)
            .bind(input.user_id)
            .bind(input.organization_id)
            .bind(input.permissions.to_strings())
            .bind(user_id)
            .fetch_one(pool)
            .await
    }

    /// Replace a rule's type, target, and permissions.
    pub async fn update(
        pool: &PgPool,
        page_id: DbId,
        id: DbId,
        input: &UpsertPageAccessRule,
    ) -> Result<Option<PageAccessRule>, sqlx::Error> {
        let query = format!(
            "UPDATE page_access_rules SET
                access_type = $3,
                role_id = $4,
                user_id = $5,
                organization_id = $6,
                permissions = $7
             WHERE id = $1 AND page_id = $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, PageAccessRule>(&query)
            .bind(id)
            .bind(page_id)
            .bind(input.access_type.as_str())
            .bind(input.role_id)
            .bind(input.user_id)
            .bind(input.organization_id)
            .bind(input.permissions.to_strings())
            .fetch_optional(pool)
            .await
    }

    pub async fn delete(pool: &PgPool, page_id: DbId, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM page_access_rules WHERE id = $1 AND page_id = $2")
            .bind(id)
            .bind(page_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
