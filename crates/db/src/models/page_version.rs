//! Page version snapshot model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use pagecraft_core::block::Block;
use pagecraft_core::types::{DbId, Timestamp};
use pagecraft_core::version::{SnapshotView, VersionAction};

/// An immutable row from the `page_versions` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PageVersion {
    pub id: DbId,
    pub page_id: DbId,
    pub version: i32,
    pub title: String,
    pub description: Option<String>,
    #[sqlx(json)]
    pub blocks: Vec<Block>,
    #[sqlx(try_from = "String")]
    pub action: VersionAction,
    pub change_summary: Option<String>,
    pub created_by: Option<DbId>,
    pub created_at: Timestamp,
}

impl PageVersion {
    pub fn view(&self) -> SnapshotView<'_> {
        SnapshotView {
            title: &self.title,
            description: self.description.as_deref(),
            blocks: &self.blocks,
        }
    }
}

/// Version list entry without the block payload.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PageVersionSummary {
    pub id: DbId,
    pub version: i32,
    pub title: String,
    #[sqlx(try_from = "String")]
    pub action: VersionAction,
    pub change_summary: Option<String>,
    pub block_count: i32,
    pub created_by: Option<DbId>,
    pub created_at: Timestamp,
}

/// Request body for an explicit snapshot. `action` defaults to `MANUAL`.
#[derive(Debug, Default, Deserialize)]
pub struct CreatePageVersion {
    pub action: Option<VersionAction>,
    pub change_summary: Option<String>,
}
