//! Content blocks: the ordered units a page is composed of.
//!
//! A block is stored as JSON inside the page row (and inside every version
//! snapshot), so the shape here is the wire and storage shape at once.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Block type constants
// ---------------------------------------------------------------------------

pub const BLOCK_HERO: &str = "hero";
pub const BLOCK_TEXT: &str = "text";
pub const BLOCK_HEADING: &str = "heading";
pub const BLOCK_IMAGE: &str = "image";
pub const BLOCK_GALLERY: &str = "gallery";
pub const BLOCK_VIDEO: &str = "video";
pub const BLOCK_BUTTON: &str = "button";
pub const BLOCK_COLUMNS: &str = "columns";
pub const BLOCK_SPACER: &str = "spacer";
pub const BLOCK_DIVIDER: &str = "divider";
pub const BLOCK_HTML: &str = "html";
pub const BLOCK_COMPONENT: &str = "component";

/// All block types the renderer knows how to draw.
pub const VALID_BLOCK_TYPES: &[&str] = &[
    BLOCK_HERO,
    BLOCK_TEXT,
    BLOCK_HEADING,
    BLOCK_IMAGE,
    BLOCK_GALLERY,
    BLOCK_VIDEO,
    BLOCK_BUTTON,
    BLOCK_COLUMNS,
    BLOCK_SPACER,
    BLOCK_DIVIDER,
    BLOCK_HTML,
    BLOCK_COMPONENT,
];

/// Upper bound on blocks per page.
pub const MAX_BLOCKS_PER_PAGE: usize = 500;

/// A typed content unit. `content` is interpreted according to `block_type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub id: String,
    #[serde(rename = "type")]
    pub block_type: String,
    #[serde(default)]
    pub content: serde_json::Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settings: Option<serde_json::Value>,
}

/// Validate an ordered block list.
///
/// Ids must be non-empty and unique within the list, types must be known,
/// and `component` blocks must reference a component instance through
/// `content.instance_id`.
pub fn validate_blocks(blocks: &[Block]) -> Result<(), CoreError> {
    if blocks.len() > MAX_BLOCKS_PER_PAGE {
        return Err(CoreError::Validation(format!(
            "A page may contain at most {MAX_BLOCKS_PER_PAGE} blocks"
        )));
    }

    let mut seen = HashSet::with_capacity(blocks.len());
    for (index, block) in blocks.iter().enumerate() {
        if block.id.trim().is_empty() {
            return Err(CoreError::Validation(format!(
                "Block at position {index} has an empty id"
            )));
        }
        if !seen.insert(block.id.as_str()) {
            return Err(CoreError::Validation(format!(
                "Duplicate block id '{}'",
                block.id
            )));
        }
        if !VALID_BLOCK_TYPES.contains(&block.block_type.as_str()) {
            return Err(CoreError::Validation(format!(
                "Invalid block type '{}'. Valid types: {}",
                block.block_type,
                VALID_BLOCK_TYPES.join(", ")
            )));
        }
        if block.block_type == BLOCK_COMPONENT
            && block.content.get("instance_id").and_then(|v| v.as_i64()).is_none()
        {
            return Err(CoreError::Validation(format!(
                "Component block '{}' must set content.instance_id",
                block.id
            )));
        }
    }
    Ok(())
}

/// Component instance ids referenced by `component` blocks, in block order.
pub fn referenced_instance_ids(blocks: &[Block]) -> Vec<i64> {
    blocks
        .iter()
        .filter(|b| b.block_type == BLOCK_COMPONENT)
        .filter_map(|b| b.content.get("instance_id").and_then(|v| v.as_i64()))
        .collect()
}
