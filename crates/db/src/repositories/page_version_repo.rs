//! Repository for the `page_versions` table.
//!
//! Version numbers come from the per-page `page_version_counters` row,
//! bumped while the page row is locked. A number is never handed out twice,
//! so deleting the newest snapshot leaves a gap instead of a reused number.

use sqlx::{PgPool, Postgres, Transaction};
use pagecraft_core::types::DbId;
use pagecraft_core::version::VersionAction;

use crate::models::page_version::{PageVersion, PageVersionSummary};
use crate::repositories::page_repo::PageRepo;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, page_id, version, title, description, blocks, action, \
    change_summary, created_by, created_at";

/// Provides snapshot and lookup operations for page versions.
pub struct PageVersionRepo;

impl PageVersionRepo {
    /// Snapshot the page's current title, description, and blocks.
    ///
    /// Returns `None` if the page does not exist.
    pub async fn create_snapshot(
        pool: &PgPool,
        page_id: DbId,
        action: VersionAction,
        change_summary: Option<&str>,
        user_id: Option<DbId>,
    ) -> Result<Option<PageVersion>, sqlx::Error> {
        let mut tx = pool.begin().await?;
        if PageRepo::lock(&mut tx, page_id).await?.is_none() {
            return Ok(None);
        }
        let version = Self::snapshot_inner(&mut tx, page_id, action, change_summary, user_id).await?;
        tx.commit().await?;
        Ok(Some(version))
    }

    /// List a page's versions, newest first.
    pub async fn list_by_page(
        pool: &PgPool,
        page_id: DbId,
    ) -> Result<Vec<PageVersionSummary>, sqlx::Error> {
        sqlx::query_as::<_, PageVersionSummary>(
            "SELECT id, version, title, action, change_summary,
                    jsonb_array_length(blocks) AS block_count, created_by, created_at
             FROM page_versions
             WHERE page_id = $1
             ORDER BY version DESC",
        )
        .bind(page_id)
        .fetch_all(pool)
        .await
    }

    /// Find a specific version of a page.
    pub async fn find(
        pool: &PgPool,
        page_id: DbId,
        version: i32,
    ) -> Result<Option<PageVersion>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM page_versions WHERE page_id = $1 AND version = $2");
        sqlx::query_as::<_, PageVersion>(&query)
            .bind(page_id)
            .bind(version)
            .fetch_optional(pool)
            .await
    }

    /// Highest version number for a page, or 0 if none exist.
    pub async fn latest_version_number(pool: &PgPool, page_id: DbId) -> Result<i32, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT COALESCE(MAX(version), 0) FROM page_versions WHERE page_id = $1",
        )
        .bind(page_id)
        .fetch_one(pool)
        .await
    }

    /// Delete one version. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, page_id: DbId, version: i32) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM page_versions WHERE page_id = $1 AND version = $2")
            .bind(page_id)
            .bind(version)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // -----------------------------------------------------------------------
    // Internal helpers
    // -----------------------------------------------------------------------

    /// Copy the page row into a new version. The caller holds the page lock.
    pub(crate) async fn snapshot_inner(
        tx: &mut Transaction<'_, Postgres>,
        page_id: DbId,
        action: VersionAction,
        change_summary: Option<&str>,
        user_id: Option<DbId>,
    ) -> Result<PageVersion, sqlx::Error> {
        let next: i32 = sqlx::query_scalar(
            "INSERT INTO page_version_counters (page_id, last_version)
             VALUES ($1, 1)
             ON CONFLICT (page_id)
             DO UPDATE SET last_version = page_version_counters.last_version + 1
             RETURNING last_version",
        )
        .bind(page_id)
        .fetch_one(&mut **tx)
        .await?;

        let query = format!(
            "INSERT INTO page_versions
                (page_id, version, title, description, blocks, action, change_summary, created_by)
             SELECT p.id, $5, p.title, p.description, p.blocks, $2, $3, $4
             FROM pages p
             WHERE p.id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, PageVersion>(&query)
            .bind(page_id)
            .bind(action.as_str())
            .bind(change_summary)
            .bind(user_id)
            .bind(next)
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn find_inner(
        tx: &mut Transaction<'_, Postgres>,
        page_id: DbId,
        version: i32,
    ) -> Result<Option<PageVersion>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM page_versions WHERE page_id = $1 AND version = $2");
        sqlx::query_as::<_, PageVersion>(&query)
            .bind(page_id)
            .bind(version)
            .fetch_optional(&mut **tx)
            .await
    }
}
