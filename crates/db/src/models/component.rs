//! Component, component property, and component instance models.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use pagecraft_core::component::{ParentPlacement, PropertyDef, PropertyType};
use pagecraft_core::types::{DbId, Timestamp};

/// A row from the `components` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Component {
    pub id: DbId,
    pub name: String,
    pub display_name: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub organization_id: Option<DbId>,
    pub is_active: bool,
    pub created_by: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A row from the `component_properties` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ComponentProperty {
    pub id: DbId,
    pub component_id: DbId,
    pub name: String,
    #[sqlx(try_from = "String")]
    pub property_type: PropertyType,
    pub required: bool,
    pub default_value: Option<serde_json::Value>,
    pub options: Option<Vec<String>>,
    pub sort_order: i32,
    pub created_at: Timestamp,
}

impl ComponentProperty {
    pub fn to_def(&self) -> PropertyDef {
        PropertyDef {
            name: self.name.clone(),
            property_type: self.property_type,
            required: self.required,
            default_value: self.default_value.clone(),
            options: self.options.clone(),
        }
    }
}

/// A component together with its ordered properties.
#[derive(Debug, Clone, Serialize)]
pub struct ComponentWithProperties {
    #[serde(flatten)]
    pub component: Component,
    pub properties: Vec<ComponentProperty>,
}

impl ComponentWithProperties {
    pub fn property_defs(&self) -> Vec<PropertyDef> {
        self.properties.iter().map(ComponentProperty::to_def).collect()
    }
}

/// DTO for creating a component with its property list.
#[derive(Debug, Deserialize)]
pub struct CreateComponent {
    pub name: String,
    pub display_name: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub organization_id: Option<DbId>,
    #[serde(default)]
    pub properties: Vec<PropertyDef>,
}

/// DTO for updating a component. When `properties` is given the list is
/// replaced wholesale.
#[derive(Debug, Deserialize)]
pub struct UpdateComponent {
    pub display_name: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub is_active: Option<bool>,
    pub properties: Option<Vec<PropertyDef>>,
}

/// Filters for the component list endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct ComponentListParams {
    pub category: Option<String>,
    pub organization_id: Option<DbId>,
    pub include_inactive: Option<bool>,
}

// ---------------------------------------------------------------------------
// Instances
// ---------------------------------------------------------------------------

/// A row from the `component_instances` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ComponentInstance {
    pub id: DbId,
    pub page_id: DbId,
    pub component_id: DbId,
    pub parent_id: Option<DbId>,
    pub data: serde_json::Value,
    pub sort_order: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl ComponentInstance {
    pub fn placement(&self) -> ParentPlacement {
        ParentPlacement {
            id: self.id,
            page_id: self.page_id,
            parent_id: self.parent_id,
        }
    }
}

/// A root instance with its direct children, for tree responses.
#[derive(Debug, Clone, Serialize)]
pub struct ComponentInstanceNode {
    #[serde(flatten)]
    pub instance: ComponentInstance,
    pub children: Vec<ComponentInstance>,
}

/// Group a flat, sort-ordered instance list into root nodes with children.
///
/// Children whose parent is missing from `instances` are dropped.
pub fn build_instance_tree(instances: Vec<ComponentInstance>) -> Vec<ComponentInstanceNode> {
    let (roots, children): (Vec<_>, Vec<_>) =
        instances.into_iter().partition(|i| i.parent_id.is_none());

    let mut nodes: Vec<ComponentInstanceNode> = roots
        .into_iter()
        .map(|instance| ComponentInstanceNode {
            instance,
            children: Vec::new(),
        })
        .collect();

    for child in children {
        if let Some(node) = nodes
            .iter_mut()
            .find(|n| Some(n.instance.id) == child.parent_id)
        {
            node.children.push(child);
        }
    }
    nodes
}

/// Request body for placing a component on a page.
#[derive(Debug, Deserialize)]
pub struct CreateComponentInstance {
    pub component_id: DbId,
    pub parent_id: Option<DbId>,
    #[serde(default)]
    pub data: serde_json::Value,
    pub sort_order: Option<i32>,
}

/// Request body for updating an instance.
#[derive(Debug, Deserialize)]
pub struct UpdateComponentInstance {
    pub data: Option<serde_json::Value>,
    pub sort_order: Option<i32>,
}
