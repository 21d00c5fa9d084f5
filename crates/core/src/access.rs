//! Page access rules and their evaluation.
//!
//! Each [`AccessRule`] grants a [`PermissionSet`] to everyone matching one
//! discriminator (public, private, role, user, organization). Evaluation is
//! additive: a principal's effective permissions on a page are the union of
//! every matching rule. A page without rules falls back to the permissions
//! the principal's roles carry. Admins always hold every permission.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::roles::ROLE_ADMIN;
use crate::types::DbId;

// ---------------------------------------------------------------------------
// Access type
// ---------------------------------------------------------------------------

/// Discriminator of an access rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccessType {
    /// Everyone, including anonymous visitors.
    Public,
    /// The page creator only.
    Private,
    /// Holders of `role_id`.
    RoleBased,
    /// The single user `user_id`.
    UserSpecific,
    /// Members of `organization_id`.
    Organization,
}

impl AccessType {
    pub fn as_str(self) -> &'static str {
        match self {
            AccessType::Public => "PUBLIC",
            AccessType::Private => "PRIVATE",
            AccessType::RoleBased => "ROLE_BASED",
            AccessType::UserSpecific => "USER_SPECIFIC",
            AccessType::Organization => "ORGANIZATION",
        }
    }
}

impl fmt::Display for AccessType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AccessType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PUBLIC" => Ok(AccessType::Public),
            "PRIVATE" => Ok(AccessType::Private),
            "ROLE_BASED" => Ok(AccessType::RoleBased),
            "USER_SPECIFIC" => Ok(AccessType::UserSpecific),
            "ORGANIZATION" => Ok(AccessType::Organization),
            other => Err(CoreError::Validation(format!(
                "Invalid access type '{other}'. Valid types: PUBLIC, PRIVATE, ROLE_BASED, \
                 USER_SPECIFIC, ORGANIZATION"
            ))),
        }
    }
}

impl TryFrom<String> for AccessType {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

// ---------------------------------------------------------------------------
// Permissions
// ---------------------------------------------------------------------------

/// A single page-level permission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PagePermission {
    View,
    Edit,
    Publish,
    Delete,
}

impl PagePermission {
    pub const ALL: [PagePermission; 4] = [
        PagePermission::View,
        PagePermission::Edit,
        PagePermission::Publish,
        PagePermission::Delete,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            PagePermission::View => "VIEW",
            PagePermission::Edit => "EDIT",
            PagePermission::Publish => "PUBLISH",
            PagePermission::Delete => "DELETE",
        }
    }
}

impl fmt::Display for PagePermission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PagePermission {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PagePermission::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| {
                CoreError::Validation(format!(
                    "Invalid permission '{s}'. Valid permissions: VIEW, EDIT, PUBLISH, DELETE"
                ))
            })
    }
}

/// An ordered, de-duplicated set of page permissions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PermissionSet(BTreeSet<PagePermission>);

impl PermissionSet {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn all() -> Self {
        PagePermission::ALL.into_iter().collect()
    }

    pub fn contains(&self, permission: PagePermission) -> bool {
        self.0.contains(&permission)
    }

    pub fn insert(&mut self, permission: PagePermission) {
        self.0.insert(permission);
    }

    pub fn union_with(&mut self, other: &PermissionSet) {
        self.0.extend(other.0.iter().copied());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = PagePermission> + '_ {
        self.0.iter().copied()
    }

    /// Stored representation (`TEXT[]`).
    pub fn to_strings(&self) -> Vec<String> {
        self.iter().map(|p| p.as_str().to_string()).collect()
    }
}

impl FromIterator<PagePermission> for PermissionSet {
    fn from_iter<I: IntoIterator<Item = PagePermission>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl TryFrom<Vec<String>> for PermissionSet {
    type Error = CoreError;

    fn try_from(values: Vec<String>) -> Result<Self, Self::Error> {
        values
            .iter()
            .map(|v| v.parse::<PagePermission>())
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Rules
// ---------------------------------------------------------------------------

/// The evaluable part of a stored page access rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessRule {
    pub access_type: AccessType,
    pub role_id: Option<DbId>,
    pub user_id: Option<DbId>,
    pub organization_id: Option<DbId>,
    pub permissions: PermissionSet,
}

impl AccessRule {
    /// Check that the target ids agree with the access type and that at
    /// least one permission is granted.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.permissions.is_empty() {
            return Err(CoreError::Validation(
                "An access rule must grant at least one permission".into(),
            ));
        }

        let (needs_role, needs_user, needs_org) = match self.access_type {
            AccessType::Public | AccessType::Private => (false, false, false),
            AccessType::RoleBased => (true, false, false),
            AccessType::UserSpecific => (false, true, false),
            AccessType::Organization => (false, false, true),
        };

        check_target(self.access_type, "role_id", self.role_id, needs_role)?;
        check_target(self.access_type, "user_id", self.user_id, needs_user)?;
        check_target(
            self.access_type,
            "organization_id",
            self.organization_id,
            needs_org,
        )?;
        Ok(())
    }

    /// Whether this rule applies to `principal` on a page described by `page`.
    pub fn matches(&self, principal: &Principal, page: &PageContext) -> bool {
        match self.access_type {
            AccessType::Public => true,
            AccessType::Private => match principal {
                Principal::User(user) => page.created_by == Some(user.user_id),
                Principal::Anonymous => false,
            },
            AccessType::RoleBased => match (principal, self.role_id) {
                (Principal::User(user), Some(role_id)) => user.role_ids.contains(&role_id),
                _ => false,
            },
            AccessType::UserSpecific => match principal {
                Principal::User(user) => self.user_id == Some(user.user_id),
                Principal::Anonymous => false,
            },
            AccessType::Organization => match (principal, self.organization_id) {
                (Principal::User(user), Some(org_id)) => user.organization_ids.contains(&org_id),
                _ => false,
            },
        }
    }
}

fn check_target(
    access_type: AccessType,
    field: &str,
    value: Option<DbId>,
    required: bool,
) -> Result<(), CoreError> {
    match (required, value.is_some()) {
        (true, false) => Err(CoreError::Validation(format!(
            "{access_type} rules require {field}"
        ))),
        (false, true) => Err(CoreError::Validation(format!(
            "{access_type} rules must not set {field}"
        ))),
        _ => Ok(()),
    }
}

// ---------------------------------------------------------------------------
// Evaluation
// ---------------------------------------------------------------------------

/// An authenticated caller, resolved for one page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserPrincipal {
    pub user_id: DbId,
    /// Name of the primary role carried in the session token.
    pub primary_role: String,
    /// Primary role id plus every assignment applicable to the page.
    pub role_ids: Vec<DbId>,
    /// Organizations the user belongs to.
    pub organization_ids: Vec<DbId>,
    /// Permissions granted by the user's roles.
    pub role_permissions: PermissionSet,
}

/// Whoever is asking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Principal {
    Anonymous,
    User(UserPrincipal),
}

/// The page attributes rule evaluation depends on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageContext {
    pub created_by: Option<DbId>,
    pub organization_id: Option<DbId>,
}

/// Compute the permissions `principal` holds on a page.
pub fn effective_permissions(
    principal: &Principal,
    page: &PageContext,
    rules: &[AccessRule],
) -> PermissionSet {
    if let Principal::User(user) = principal {
        if user.primary_role == ROLE_ADMIN {
            return PermissionSet::all();
        }
    }

    if rules.is_empty() {
        return match principal {
            Principal::User(user) => user.role_permissions.clone(),
            Principal::Anonymous => [PagePermission::View].into_iter().collect(),
        };
    }

    let mut granted = PermissionSet::empty();
    for rule in rules.iter().filter(|r| r.matches(principal, page)) {
        granted.union_with(&rule.permissions);
    }
    granted
}

/// Fail with `Forbidden` unless `permission` is in `granted`.
pub fn require_permission(
    granted: &PermissionSet,
    permission: PagePermission,
) -> Result<(), CoreError> {
    if granted.contains(permission) {
        Ok(())
    } else {
        Err(CoreError::Forbidden(format!(
            "{permission} permission required on this page"
        )))
    }
}
