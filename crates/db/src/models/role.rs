//! Role, permission, and role-assignment models.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use pagecraft_core::types::{DbId, Timestamp};

/// A role row from the `roles` table. `organization_id` is `None` for global roles.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Role {
    pub id: DbId,
    pub name: String,
    pub description: Option<String>,
    pub organization_id: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a role.
#[derive(Debug, Deserialize)]
pub struct CreateRole {
    pub name: String,
    pub description: Option<String>,
    pub organization_id: Option<DbId>,
}

/// A row from the `permissions` catalogue.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Permission {
    pub id: DbId,
    pub name: String,
    pub description: Option<String>,
    pub created_at: Timestamp,
}

/// A row from `user_roles`: an extra role held by a user, optionally
/// limited to one organization.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct RoleAssignment {
    pub id: DbId,
    pub user_id: DbId,
    pub role_id: DbId,
    pub organization_id: Option<DbId>,
    pub created_at: Timestamp,
}

/// DTO for assigning a role to a user.
#[derive(Debug, Deserialize)]
pub struct CreateRoleAssignment {
    pub role_id: DbId,
    pub organization_id: Option<DbId>,
}
