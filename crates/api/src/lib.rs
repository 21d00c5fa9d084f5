//! Pagecraft API server library.
//!
//! Exposes the building blocks (config, state, error handling, auth,
//! routes) so integration tests and the binary entrypoint can both use them.

pub mod access;
pub mod app;
pub mod auth;
pub mod bootstrap;
pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod query;
pub mod render;
pub mod response;
pub mod routes;
pub mod state;
