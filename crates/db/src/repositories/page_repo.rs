//! Repository for the `pages` table.
//!
//! Every write that checks the page's current state first locks the page row
//! with `SELECT ... FOR UPDATE` so that concurrent writers serialize.

use chrono::Utc;
use serde::Serialize;
use sqlx::types::Json;
use sqlx::{PgPool, Postgres, Transaction};
use pagecraft_core::block::{referenced_instance_ids, Block};
use pagecraft_core::error::CoreError;
use pagecraft_core::page::{plan_transition, PageStatus, PublishedAtChange};
use pagecraft_core::types::DbId;
use pagecraft_core::version::VersionAction;

use crate::error::WorkflowError;
use crate::models::page::{CreatePage, Page, PageSummary, UpdatePage};
use crate::models::page_version::PageVersion;
use crate::repositories::page_version_repo::PageVersionRepo;

/// Column list for full page rows.
const COLUMNS: &str = "id, slug, title, description, status, published, published_at, \
    blocks, organization_id, created_by, updated_by, created_at, updated_at";

/// Column list for list views.
const SUMMARY_COLUMNS: &str = "id, slug, title, description, status, published, published_at, \
    jsonb_array_length(blocks) AS block_count, organization_id, created_by, updated_at";

/// Result of a status transition.
#[derive(Debug, Clone, Serialize)]
pub struct StatusChange {
    pub page: Page,
    /// The `PUBLISH` snapshot, when the transition entered `PUBLISHED`.
    pub version: Option<PageVersion>,
}

/// Provides CRUD and workflow operations for pages.
pub struct PageRepo;

impl PageRepo {
    /// Insert a new `DRAFT` page with an already-resolved slug.
    pub async fn create(
        pool: &PgPool,
        input: &CreatePage,
        slug: &str,
        user_id: Option<DbId>,
    ) -> Result<Page, sqlx::Error> {
        let query = format!(
            "INSERT INTO pages
                (slug, title, description, blocks, organization_id, created_by, updated_by)
             VALUES ($1, $2, $3, $4, $5, $6, $6)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Page>(&query)
            .bind(slug)
            .bind(&input.title)
            .bind(&input.description)
            .bind(Json(&input.blocks))
            .bind(input.organization_id)
            .bind(user_id)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Page>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM pages WHERE id = $1");
        sqlx::query_as::<_, Page>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_by_slug(pool: &PgPool, slug: &str) -> Result<Option<Page>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM pages WHERE slug = $1");
        sqlx::query_as::<_, Page>(&query)
            .bind(slug)
            .fetch_optional(pool)
            .await
    }

    /// List pages with optional status, organization, and title/slug filters.
    pub async fn list(
        pool: &PgPool,
        status: Option<PageStatus>,
        organization_id: Option<DbId>,
        search: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<PageSummary>, sqlx::Error> {
        let pattern = search.map(|s| format!("%{s}%"));
        let query = format!(
            "SELECT {SUMMARY_COLUMNS} FROM pages
             WHERE ($1::TEXT IS NULL OR status = $1)
               AND ($2::BIGINT IS NULL OR organization_id = $2)
               AND ($3::TEXT IS NULL OR title ILIKE $3 OR slug ILIKE $3)
             ORDER BY updated_at DESC
             LIMIT $4 OFFSET $5"
        );
        sqlx::query_as::<_, PageSummary>(&query)
            .bind(status.map(PageStatus::as_str))
            .bind(organization_id)
            .bind(pattern)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Update page content. Only non-`None` fields are applied; `slug` is the
    /// resolved slug when the caller asked to change it.
    ///
    /// The page row is locked while new blocks are checked: a `PUBLISHED`
    /// page cannot be emptied, and every `component` block must point at an
    /// instance on this page. Returns `Ok(None)` if the page does not exist.
    ///
    /// Status is never touched here: use [`PageRepo::transition_status`].
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdatePage,
        slug: Option<&str>,
        user_id: Option<DbId>,
    ) -> Result<Option<Page>, WorkflowError> {
        let mut tx = pool.begin().await?;

        let Some(current) = Self::lock(&mut tx, id).await? else {
            return Ok(None);
        };
        if let Some(blocks) = &input.blocks {
            if current.status == PageStatus::Published && blocks.is_empty() {
                return Err(CoreError::Validation(
                    "A published page must keep at least one block".into(),
                )
                .into());
            }
            if let Some(missing) = Self::missing_instance(&mut tx, id, blocks).await? {
                return Err(CoreError::Validation(format!(
                    "Component block references instance {missing}, which is not on this page"
                ))
                .into());
            }
        }

        let query = format!(
            "UPDATE pages SET
                title = COALESCE($2, title),
                slug = COALESCE($3, slug),
                description = COALESCE($4, description),
                blocks = COALESCE($5, blocks),
                updated_by = $6
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        let page = sqlx::query_as::<_, Page>(&query)
            .bind(id)
            .bind(&input.title)
            .bind(slug)
            .bind(&input.description)
            .bind(input.blocks.as_ref().map(Json))
            .bind(user_id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(Some(page))
    }

    /// Delete a page. Versions, access rules, and component instances cascade.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM pages WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Move a page to `to`, applying the publish rules.
    ///
    /// Entering `PUBLISHED` writes a `PUBLISH` snapshot in the same
    /// transaction. Returns `Ok(None)` if the page does not exist.
    pub async fn transition_status(
        pool: &PgPool,
        id: DbId,
        to: PageStatus,
        user_id: Option<DbId>,
    ) -> Result<Option<StatusChange>, WorkflowError> {
        let mut tx = pool.begin().await?;

        let Some(current) = Self::lock(&mut tx, id).await? else {
            return Ok(None);
        };

        let plan = plan_transition(current.status, to, current.blocks.len())?;
        let published_at = match plan.published_at {
            PublishedAtChange::Keep => current.published_at,
            PublishedAtChange::SetNow => Some(Utc::now()),
            PublishedAtChange::Clear => None,
        };

        let query = format!(
            "UPDATE pages SET
                status = $2,
                published = $3,
                published_at = $4,
                updated_by = $5
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        let page = sqlx::query_as::<_, Page>(&query)
            .bind(id)
            .bind(plan.to.as_str())
            .bind(plan.published)
            .bind(published_at)
            .bind(user_id)
            .fetch_one(&mut *tx)
            .await?;

        let version = if plan.create_version {
            Some(
                PageVersionRepo::snapshot_inner(&mut tx, id, VersionAction::Publish, None, user_id)
                    .await?,
            )
        } else {
            None
        };

        tx.commit().await?;

        tracing::debug!(
            page_id = id,
            from = %plan.from,
            to = %plan.to,
            version = version.as_ref().map(|v| v.version),
            "Page status changed",
        );

        Ok(Some(StatusChange { page, version }))
    }

    /// Overwrite a page's title, description, and blocks from one of its
    /// snapshots. Status is unchanged and no new version is written.
    ///
    /// Returns `Ok(None)` if either the page or the version is missing.
    pub async fn restore_version(
        pool: &PgPool,
        id: DbId,
        version: i32,
        user_id: Option<DbId>,
    ) -> Result<Option<Page>, WorkflowError> {
        let mut tx = pool.begin().await?;

        let Some(current) = Self::lock(&mut tx, id).await? else {
            return Ok(None);
        };
        let Some(snapshot) = PageVersionRepo::find_inner(&mut tx, id, version).await? else {
            return Ok(None);
        };

        if current.status == PageStatus::Published && snapshot.blocks.is_empty() {
            return Err(CoreError::Validation(
                "Cannot restore an empty version onto a published page".into(),
            )
            .into());
        }
        if let Some(missing) = Self::missing_instance(&mut tx, id, &snapshot.blocks).await? {
            return Err(CoreError::Validation(format!(
                "Version {version} references component instance {missing}, \
                 which is no longer on this page"
            ))
            .into());
        }

        let query = format!(
            "UPDATE pages SET
                title = $2,
                description = $3,
                blocks = $4,
                updated_by = $5
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        let page = sqlx::query_as::<_, Page>(&query)
            .bind(id)
            .bind(&snapshot.title)
            .bind(&snapshot.description)
            .bind(Json(&snapshot.blocks))
            .bind(user_id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(Some(page))
    }

    // -----------------------------------------------------------------------
    // Internal helpers
    // -----------------------------------------------------------------------

    /// Load and row-lock a page inside an open transaction.
    pub(crate) async fn lock(
        tx: &mut Transaction<'_, Postgres>,
        id: DbId,
    ) -> Result<Option<Page>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM pages WHERE id = $1 FOR UPDATE");
        sqlx::query_as::<_, Page>(&query)
            .bind(id)
            .fetch_optional(&mut **tx)
            .await
    }

    /// First instance id referenced by a `component` block that is not an
    /// instance of this page.
    async fn missing_instance(
        tx: &mut Transaction<'_, Postgres>,
        page_id: DbId,
        blocks: &[Block],
    ) -> Result<Option<DbId>, sqlx::Error> {
        let referenced = referenced_instance_ids(blocks);
        if referenced.is_empty() {
            return Ok(None);
        }
        let existing: Vec<DbId> =
            sqlx::query_scalar("SELECT id FROM component_instances WHERE page_id = $1")
                .bind(page_id)
                .fetch_all(&mut **tx)
                .await?;
        Ok(referenced.into_iter().find(|id| !existing.contains(id)))
    }
}
