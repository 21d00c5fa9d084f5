//! Domain types and pure rules for the Pagecraft CMS.
//!
//! Nothing in this crate touches the database or HTTP. The `db` and `api`
//! crates build on these types and call the validation and evaluation
//! functions defined here.

pub mod access;
pub mod block;
pub mod component;
pub mod error;
pub mod organization;
pub mod page;
pub mod pagination;
pub mod roles;
pub mod slug;
pub mod types;
pub mod user;
pub mod version;
