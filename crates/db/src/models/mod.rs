//! Row models and DTOs, one module per table family.

pub mod component;
pub mod organization;
pub mod page;
pub mod page_access_rule;
pub mod page_version;
pub mod role;
pub mod session;
pub mod user;
