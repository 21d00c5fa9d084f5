//! Authentication primitives.
//!
//! - [`password`] -- Argon2id password hashing and verification.
//! - [`jwt`] -- access-token signing/validation and refresh-token helpers.
//! - [`cookie`] -- the `access_token` cookie set on login and cleared on logout.

pub mod cookie;
pub mod jwt;
pub mod password;
