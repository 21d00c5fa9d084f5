//! Page entity model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use pagecraft_core::access::PageContext;
use pagecraft_core::block::Block;
use pagecraft_core::page::PageStatus;
use pagecraft_core::types::{DbId, Timestamp};

/// A row from the `pages` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Page {
    pub id: DbId,
    pub slug: String,
    pub title: String,
    pub description: Option<String>,
    #[sqlx(try_from = "String")]
    pub status: PageStatus,
    pub published: bool,
    pub published_at: Option<Timestamp>,
    #[sqlx(json)]
    pub blocks: Vec<Block>,
    pub organization_id: Option<DbId>,
    pub created_by: Option<DbId>,
    pub updated_by: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Page {
    /// The attributes access-rule evaluation looks at.
    pub fn context(&self) -> PageContext {
        PageContext {
            created_by: self.created_by,
            organization_id: self.organization_id,
        }
    }
}

/// Lightweight page row for list endpoints (no block payload).
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PageSummary {
    pub id: DbId,
    pub slug: String,
    pub title: String,
    pub description: Option<String>,
    #[sqlx(try_from = "String")]
    pub status: PageStatus,
    pub published: bool,
    pub published_at: Option<Timestamp>,
    pub block_count: i32,
    pub organization_id: Option<DbId>,
    pub created_by: Option<DbId>,
    pub updated_at: Timestamp,
}

/// DTO for creating a page. New pages always start as `DRAFT`.
#[derive(Debug, Deserialize)]
pub struct CreatePage {
    pub title: String,
    pub slug: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub blocks: Vec<Block>,
    pub organization_id: Option<DbId>,
}

/// DTO for updating a page. All fields are optional.
#[derive(Debug, Deserialize)]
pub struct UpdatePage {
    pub title: Option<String>,
    pub slug: Option<String>,
    pub description: Option<String>,
    pub blocks: Option<Vec<Block>>,
}

/// Filters for the page list endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct PageListParams {
    pub status: Option<String>,
    pub organization_id: Option<DbId>,
    pub search: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}
