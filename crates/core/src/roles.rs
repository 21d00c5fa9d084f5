//! Well-known role name constants.
//!
//! These must match the seed data in `20260301000002_create_rbac_tables.sql`.

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_EDITOR: &str = "editor";
pub const ROLE_AUTHOR: &str = "author";
pub const ROLE_VIEWER: &str = "viewer";

/// Seeded global roles. These cannot be deleted through the API.
pub const BUILTIN_ROLES: &[&str] = &[ROLE_ADMIN, ROLE_EDITOR, ROLE_AUTHOR, ROLE_VIEWER];

/// Privilege rank of a role name for route gating.
///
/// Higher ranks include everything lower ranks may do. Custom
/// (organization-scoped) roles rank with viewers; what they may do on a
/// given page comes from their permission grants and page access rules.
pub fn rank(role: &str) -> u8 {
    match role {
        ROLE_ADMIN => 3,
        ROLE_EDITOR => 2,
        ROLE_AUTHOR => 1,
        _ => 0,
    }
}

/// Whether `role` is at least as privileged as `required`.
pub fn satisfies(role: &str, required: &str) -> bool {
    rank(role) >= rank(required)
}

/// Whether a role name is one of the seeded built-ins.
pub fn is_builtin(role: &str) -> bool {
    BUILTIN_ROLES.contains(&role)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_satisfies_every_gate() {
        for role in BUILTIN_ROLES {
            assert!(satisfies(ROLE_ADMIN, role));
        }
    }

    #[test]
    fn author_does_not_satisfy_editor() {
        assert!(satisfies(ROLE_AUTHOR, ROLE_AUTHOR));
        assert!(!satisfies(ROLE_AUTHOR, ROLE_EDITOR));
    }

    #[test]
    fn custom_role_ranks_as_viewer() {
        assert!(satisfies("marketing", ROLE_VIEWER));
        assert!(!satisfies("marketing", ROLE_AUTHOR));
    }

    #[test]
    fn builtin_detection() {
        assert!(is_builtin("editor"));
        assert!(!is_builtin("marketing"));
    }
}
