//! Page access rule model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use pagecraft_core::access::{AccessRule, AccessType, PermissionSet};
use pagecraft_core::types::{DbId, Timestamp};

/// A row from the `page_access_rules` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PageAccessRule {
    pub id: DbId,
    pub page_id: DbId,
    #[sqlx(try_from = "String")]
    pub access_type: AccessType,
    pub role_id: Option<DbId>,
    pub user_id: Option<DbId>,
    pub organization_id: Option<DbId>,
    #[sqlx(try_from = "Vec<String>")]
    pub permissions: PermissionSet,
    pub created_by: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl PageAccessRule {
    /// The evaluable part of the row.
    pub fn to_rule(&self) -> AccessRule {
        AccessRule {
            access_type: self.access_type,
            role_id: self.role_id,
            user_id: self.user_id,
            organization_id: self.organization_id,
            permissions: self.permissions.clone(),
        }
    }
}

/// DTO for creating or replacing an access rule.
#[derive(Debug, Clone, Deserialize)]
pub struct UpsertPageAccessRule {
    pub access_type: AccessType,
    pub role_id: Option<DbId>,
    pub user_id: Option<DbId>,
    pub organization_id: Option<DbId>,
    pub permissions: PermissionSet,
}

impl UpsertPageAccessRule {
    pub fn to_rule(&self) -> AccessRule {
        AccessRule {
            access_type: self.access_type,
            role_id: self.role_id,
            user_id: self.user_id,
            organization_id: self.organization_id,
            permissions: self.permissions.clone(),
        }
    }
}
