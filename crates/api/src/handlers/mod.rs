//! Request handlers.
//!
//! Each submodule provides async handler functions for one resource.
//! Handlers delegate to the corresponding repository in `pagecraft_db`,
//! apply the domain rules from `pagecraft_core`, and map errors via
//! [`AppError`](crate::error::AppError).

pub mod access_control;
pub mod admin;
pub mod auth;
pub mod components;
pub mod organizations;
pub mod pages;
pub mod public;
pub mod roles;
pub mod versions;
