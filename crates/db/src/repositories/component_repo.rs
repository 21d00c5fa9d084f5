//! Repository for the `components` and `component_properties` tables.
//!
//! A component and its property list are written together in one
//! transaction; an update that carries properties replaces the whole list.

use sqlx::{PgPool, Postgres, Transaction};
use pagecraft_core::component::PropertyDef;
use pagecraft_core::types::DbId;

use crate::models::component::{
    Component, ComponentListParams, ComponentProperty, ComponentWithProperties, CreateComponent,
    UpdateComponent,
};

/// Column list for component queries.
const COLUMNS: &str = "id, name, display_name, description, category, organization_id, \
    is_active, created_by, created_at, updated_at";

/// Column list for property queries.
const PROPERTY_COLUMNS: &str = "id, component_id, name, property_type, required, \
    default_value, options, sort_order, created_at";

/// Provides CRUD operations for components and their properties.
pub struct ComponentRepo;

impl ComponentRepo {
    /// Create a component and its properties. Property order is list order.
    pub async fn create(
        pool: &PgPool,
        input: &CreateComponent,
        user_id: Option<DbId>,
    ) -> Result<ComponentWithProperties, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "INSERT INTO components
                (name, display_name, description, category, organization_id, created_by)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {COLUMNS}"
        );
        let component = sqlx::query_as::<_, Component>(&query)
            .bind(&input.name)
            .bind(&input.display_name)
            .bind(&input.description)
            .bind(&input.category)
            .bind(input.organization_id)
            .bind(user_id)
            .fetch_one(&mut *tx)
            .await?;

        let properties = Self::set_properties_inner(&mut tx, component.id, &input.properties).await?;

        tx.commit().await?;
        Ok(ComponentWithProperties {
            component,
            properties,
        })
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Component>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM components WHERE id = $1");
        sqlx::query_as::<_, Component>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a component together with its ordered properties.
    pub async fn find_with_properties(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<ComponentWithProperties>, sqlx::Error> {
        let Some(component) = Self::find_by_id(pool, id).await? else {
            return Ok(None);
        };
        let properties = Self::list_properties(pool, id).await?;
        Ok(Some(ComponentWithProperties {
            component,
            properties,
        }))
    }

    pub async fn list(
        pool: &PgPool,
        params: &ComponentListParams,
    ) -> Result<Vec<Component>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM components
             WHERE ($1::TEXT IS NULL OR category = $1)
               AND ($2::BIGINT IS NULL OR organization_id = $2)
               AND ($3 OR is_active)
             ORDER BY display_name ASC"
        );
        sqlx::query_as::<_, Component>(&query)
            .bind(&params.category)
            .bind(params.organization_id)
            .bind(params.include_inactive.unwrap_or(false))
            .fetch_all(pool)
            .await
    }

    pub async fn list_properties(
        pool: &PgPool,
        component_id: DbId,
    ) -> Result<Vec<ComponentProperty>, sqlx::Error> {
        let query = format!(
            "SELECT {PROPERTY_COLUMNS} FROM component_properties
             WHERE component_id = $1
             ORDER BY sort_order ASC, id ASC"
        );
        sqlx::query_as::<_, ComponentProperty>(&query)
            .bind(component_id)
            .fetch_all(pool)
            .await
    }

    /// Update a component. Returns `None` if it does not exist.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateComponent,
    ) -> Result<Option<ComponentWithProperties>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "UPDATE components SET
                display_name = COALESCE($2, display_name),
                description = COALESCE($3, description),
                category = COALESCE($4, category),
                is_active = COALESCE($5, is_active)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        let Some(component) = sqlx::query_as::<_, Component>(&query)
            .bind(id)
            .bind(&input.display_name)
            .bind(&input.description)
            .bind(&input.category)
            .bind(input.is_active)
            .fetch_optional(&mut *tx)
            .await?
        else {
            return Ok(None);
        };

        if let Some(defs) = &input.properties {
            Self::set_properties_inner(&mut tx, id, defs).await?;
        }

        tx.commit().await?;

        let properties = Self::list_properties(pool, id).await?;
        Ok(Some(ComponentWithProperties {
            component,
            properties,
        }))
    }

    /// Delete a component. Fails with a foreign-key violation while any page
    /// still places it.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM components WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // -----------------------------------------------------------------------
    // Internal helpers
    // -----------------------------------------------------------------------

    /// Replace a component's properties within an existing transaction.
    async fn set_properties_inner(
        tx: &mut Transaction<'_, Postgres>,
        component_id: DbId,
        defs: &[PropertyDef],
    ) -> Result<Vec<ComponentProperty>, sqlx::Error> {
        sqlx::query("DELETE FROM component_properties WHERE component_id = $1")
            .bind(component_id)
            .execute(&mut **tx)
            .await?;

        let query = format!(
            "INSERT INTO component_properties
                (component_id, name, property_type, required, default_value, options, sort_order)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {PROPERTY_COLUMNS}"
        );
        let mut properties = Vec::with_capacity(defs.len());
        for (index, def) in defs.iter().enumerate() {
            let property = sqlx::query_as::<_, ComponentProperty>(&query)
                .bind(component_id)
                .bind(&def.name)
                .bind(def.property_type.as_str())
                .bind(def.required)
                .bind(&def.default_value)
                .bind(&def.options)
                .bind(index as i32)
                .fetch_one(&mut **tx)
                .await?;
            properties.push(property);
        }
        Ok(properties)
    }
}
