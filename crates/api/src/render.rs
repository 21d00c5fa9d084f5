//! Assembly of the public page view.
//!
//! The public renderer serves blocks in stored order. `component` blocks are
//! expanded with their instance data and one level of child instances so a
//! client can draw the page without further lookups.

use std::collections::HashMap;

use serde::Serialize;
use pagecraft_core::block::{Block, BLOCK_COMPONENT};
use pagecraft_core::types::{DbId, Timestamp};
use pagecraft_db::models::component::ComponentInstance;
use pagecraft_db::models::page::Page;

/// A page as served by `GET /public/pages/{slug}`.
#[derive(Debug, Serialize)]
pub struct RenderedPage {
    pub id: DbId,
    pub slug: String,
    pub title: String,
    pub description: Option<String>,
    pub published_at: Option<Timestamp>,
    pub blocks: Vec<RenderedBlock>,
}

#[derive(Debug, Serialize)]
pub struct RenderedBlock {
    pub id: String,
    #[serde(rename = "type")]
    pub block_type: String,
    pub content: serde_json::Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub settings: Option<serde_json::Value>,
    /// Resolved instance for `component` blocks.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub component: Option<RenderedComponent>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RenderedComponent {
    pub instance_id: DbId,
    /// Machine name of the component definition.
    pub name: String,
    pub data: serde_json::Value,
    pub children: Vec<RenderedComponent>,
}

/// Build the public view of `page`.
///
/// `component_names` maps component id to machine name. A `component` block
/// whose instance no longer exists is dropped rather than served empty.
pub fn render_page(
    page: &Page,
    instances: &[ComponentInstance],
    component_names: &HashMap<DbId, String>,
) -> RenderedPage {
    RenderedPage {
        id: page.id,
        slug: page.slug.clone(),
        title: page.title.clone(),
        description: page.description.clone(),
        published_at: page.published_at,
        blocks: render_blocks(&page.blocks, instances, component_names),
    }
}

/// Render blocks in order, expanding component references.
pub fn render_blocks(
    blocks: &[Block],
    instances: &[ComponentInstance],
    component_names: &HashMap<DbId, String>,
) -> Vec<RenderedBlock> {
    let by_id: HashMap<DbId, &ComponentInstance> = instances.iter().map(|i| (i.id, i)).collect();

    blocks
        .iter()
        .filter_map(|block| {
            let component = if block.block_type == BLOCK_COMPONENT {
                let instance_id = block.content.get("instance_id").and_then(|v| v.as_i64())?;
                let instance = by_id.get(&instance_id)?;
                let children = instances
                    .iter()
                    .filter(|c| c.parent_id == Some(instance.id))
                    .map(|c| render_instance(c, Vec::new(), component_names))
                    .collect();
                Some(render_instance(instance, children, component_names))
            } else {
                None
            };

            Some(RenderedBlock {
                id: block.id.clone(),
                block_type: block.block_type.clone(),
                content: block.content.clone(),
                settings: block.settings.clone(),
                component,
            })
        })
        .collect()
}

fn render_instance(
    instance: &ComponentInstance,
    children: Vec<RenderedComponent>,
    component_names: &HashMap<DbId, String>,
) -> RenderedComponent {
    RenderedComponent {
        instance_id: instance.id,
        name: component_names
            .get(&instance.component_id)
            .cloned()
            .unwrap_or_default(),
        data: instance.data.clone(),
        children,
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use serde_json::json;

    use super::*;

    fn block(id: &str, block_type: &str, content: serde_json::Value) -> Block {
        Block {
            id: id.to_string(),
            block_type: block_type.to_string(),
            content,
            settings: None,
        }
    }

    fn instance(id: DbId, component_id: DbId, parent_id: Option<DbId>) -> ComponentInstance {
        ComponentInstance {
            id,
            page_id: 1,
            component_id,
            parent_id,
            data: json!({ "title": format!("instance {id}") }),
            sort_order: 0,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn keeps_block_order() {
        let blocks = vec![
            block("b", "text", json!({ "text": "second" })),
            block("a", "hero", json!({ "title": "first" })),
        ];
        let rendered = render_blocks(&blocks, &[], &HashMap::new());
        let ids: Vec<&str> = rendered.iter().map(|b| b.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a"]);
        assert!(rendered.iter().all(|b| b.component.is_none()));
    }

    #[test]
    fn expands_component_with_children() {
        let blocks = vec![block("c", BLOCK_COMPONENT, json!({ "instance_id": 10 }))];
        let instances = vec![instance(10, 1, None), instance(11, 2, Some(10))];
        let names = HashMap::from([(1, "card".to_string()), (2, "button".to_string())]);

        let rendered = render_blocks(&blocks, &instances, &names);
        let component = rendered[0].component.as_ref().unwrap();
        assert_eq!(component.instance_id, 10);
        assert_eq!(component.name, "card");
        assert_eq!(component.children.len(), 1);
        assert_eq!(component.children[0].name, "button");
    }

    #[test]
    fn drops_dangling_component_blocks() {
        let blocks = vec![
            block("t", "text", json!({})),
            block("c", BLOCK_COMPONENT, json!({ "instance_id": 99 })),
        ];
        let rendered = render_blocks(&blocks, &[], &HashMap::new());
        assert_eq!(rendered.len(), 1);
        assert_eq!(rendered[0].id, "t");
    }
}
