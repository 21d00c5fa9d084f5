//! Organization entity model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use pagecraft_core::types::{DbId, Timestamp};

/// A row from the `organizations` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Organization {
    pub id: DbId,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating an organization. The slug is derived from the name when absent.
#[derive(Debug, Deserialize)]
pub struct CreateOrganization {
    pub name: String,
    pub slug: Option<String>,
    pub description: Option<String>,
}

/// DTO for updating an organization. All fields are optional.
#[derive(Debug, Deserialize)]
pub struct UpdateOrganization {
    pub name: Option<String>,
    pub slug: Option<String>,
    pub description: Option<String>,
}
