//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument.

pub mod component_instance_repo;
pub mod component_repo;
pub mod organization_repo;
pub mod page_access_rule_repo;
pub mod page_repo;
pub mod page_version_repo;
pub mod permission_repo;
pub mod role_repo;
pub mod session_repo;
pub mod user_repo;
pub mod user_role_repo;

pub use component_instance_repo::ComponentInstanceRepo;
pub use component_repo::ComponentRepo;
pub use organization_repo::OrganizationRepo;
pub use page_access_rule_repo::PageAccessRuleRepo;
pub use page_repo::{PageRepo, StatusChange};
pub use page_version_repo::PageVersionRepo;
pub use permission_repo::PermissionRepo;
pub use role_repo::RoleRepo;
pub use session_repo::SessionRepo;
pub use user_repo::UserRepo;
pub use user_role_repo::UserRoleRepo;
