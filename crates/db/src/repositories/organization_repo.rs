//! Repository for the `organizations` table.

use sqlx::PgPool;
use pagecraft_core::types::DbId;

use crate::models::organization::{Organization, UpdateOrganization};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, name, slug, description, created_at, updated_at";

/// Provides CRUD operations for organizations.
pub struct OrganizationRepo;

impl OrganizationRepo {
    /// Insert a new organization with an already-resolved slug.
    pub async fn create(
        pool: &PgPool,
        name: &str,
        slug: &str,
        description: Option<&str>,
    ) -> Result<Organization, sqlx::Error> {
        let query = format!(
            "INSERT INTO organizations (name, slug, description)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Organization>(&query)
            .bind(name)
            .bind(slug)
            .bind(description)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Organization>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM organizations WHERE id = $1");
        sqlx::query_as::<_, Organization>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List all organizations alphabetically.
    pub async fn list(pool: &PgPool) -> Result<Vec<Organization>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM organizations ORDER BY name ASC");
        sqlx::query_as::<_, Organization>(&query)
            .fetch_all(pool)
            .await
    }

    /// Update an organization. Only non-`None` fields are applied.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateOrganization,
    ) -> Result<Option<Organization>, sqlx::Error> {
        let query = format!(
            "UPDATE organizations SET
                name = COALESCE($2, name),
                slug = COALESCE($3, slug),
                description = COALESCE($4, description)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Organization>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.slug)
            .bind(&input.description)
            .fetch_optional(pool)
            .await
    }

    /// Delete an organization. Fails with a foreign-key violation while
    /// users, pages, or components still reference it.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM organizations WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
