//! Repository for the `component_instances` table.

use sqlx::PgPool;
use pagecraft_core::block::referenced_instance_ids;
use pagecraft_core::error::CoreError;
use pagecraft_core::types::DbId;

use crate::error::WorkflowError;
use crate::models::component::ComponentInstance;
use crate::repositories::page_repo::PageRepo;

const COLUMNS: &str = "id, page_id, component_id, parent_id, data, sort_order, \
    created_at, updated_at";

/// Provides CRUD operations for components placed on pages.
pub struct ComponentInstanceRepo;

impl ComponentInstanceRepo {
    /// All instances on a page, roots and children, in display order.
    pub async fn list_by_page(
        pool: &PgPool,
        page_id: DbId,
    ) -> Result<Vec<ComponentInstance>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM component_instances
             WHERE page_id = $1
             ORDER BY sort_order ASC, id ASC"
        );
        sqlx::query_as::<_, ComponentInstance>(&query)
            .bind(page_id)
            .fetch_all(pool)
            .await
    }

    /// Find an instance by id. Pass `page_id` to scope the lookup to a page.
    pub async fn find(
        pool: &PgPool,
        page_id: DbId,
        id: DbId,
    ) -> Result<Option<ComponentInstance>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM component_instances WHERE id = $1 AND page_id = $2");
        sqlx::query_as::<_, ComponentInstance>(&query)
            .bind(id)
            .bind(page_id)
            .fetch_optional(pool)
            .await
    }

    /// Find an instance by id on any page.
    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<ComponentInstance>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM component_instances WHERE id = $1");
        sqlx::query_as::<_, ComponentInstance>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Insert an instance with already-validated data. A missing
    /// `sort_order` appends after the page's existing siblings.
    pub async fn create(
        pool: &PgPool,
        page_id: DbId,
        component_id: DbId,
        parent_id: Option<DbId>,
        data: &serde_json::Value,
        sort_order: Option<i32>,
    ) -> Result<ComponentInstance, sqlx::Error> {
        let query = format!(
            "INSERT INTO component_instances (page_id, component_id, parent_id, data, sort_order)
             VALUES (
                $1, $2, $3, $4,
                COALESCE($5, (
                    SELECT COALESCE(MAX(sort_order), -1) + 1 FROM component_instances
                    WHERE page_id = $1 AND parent_id IS NOT DISTINCT FROM $3
                ))
             )
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ComponentInstance>(&query)
            .bind(page_id)
            .bind(component_id)
            .bind(parent_id)
            .bind(data)
            .bind(sort_order)
            .fetch_one(pool)
            .await
    }

    /// Update an instance's data and/or sort order.
    pub async fn update(
        pool: &PgPool,
        page_id: DbId,
        id: DbId,
        data: Option<&serde_json::Value>,
        sort_order: Option<i32>,
    ) -> Result<Option<ComponentInstance>, sqlx::Error> {
        let query = format!(
            "UPDATE component_instances SET
                data = COALESCE($3, data),
                sort_order = COALESCE($4, sort_order)
             WHERE id = $1 AND page_id = $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ComponentInstance>(&query)
            .bind(id)
            .bind(page_id)
            .bind(data)
            .bind(sort_order)
            .fetch_optional(pool)
            .await
    }

    /// Delete an instance. Children cascade.
    ///
    /// Runs under the page lock and is rejected with a conflict while a
    /// block on the page still references the instance or one of its
    /// children. Returns `false` if the page or instance does not exist.
    pub async fn delete(pool: &PgPool, page_id: DbId, id: DbId) -> Result<bool, WorkflowError> {
        let mut tx = pool.begin().await?;

        let Some(page) = PageRepo::lock(&mut tx, page_id).await? else {
            return Ok(false);
        };
        let doomed: Vec<DbId> = sqlx::query_scalar(
            "SELECT id FROM component_instances
             WHERE page_id = $1 AND (id = $2 OR parent_id = $2)",
        )
        .bind(page_id)
        .bind(id)
        .fetch_all(&mut *tx)
        .await?;
        if referenced_instance_ids(&page.blocks)
            .iter()
            .any(|referenced| doomed.contains(referenced))
        {
            return Err(CoreError::Conflict(format!(
                "Component instance {id} is still referenced by a block on this page"
            ))
            .into());
        }

        let result = sqlx::query("DELETE FROM component_instances WHERE id = $1 AND page_id = $2")
            .bind(id)
            .bind(page_id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(result.rows_affected() > 0)
    }
}
