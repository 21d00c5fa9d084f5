//! Authentication and authorization extractors.
//!
//! - [`auth::AuthUser`] -- the caller, from a Bearer token or the `access_token` cookie.
//! - [`auth::OptionalAuthUser`] -- the caller if any, for anonymous-friendly routes.
//! - [`rbac::RequireAdmin`], [`rbac::RequireEditor`], [`rbac::RequireAuthor`],
//!   [`rbac::RequireAuth`] -- minimum primary-role gates.

pub mod auth;
pub mod rbac;
