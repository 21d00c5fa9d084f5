//! List pagination defaults shared by every paginated endpoint.

/// Default number of rows per page.
pub const DEFAULT_LIMIT: i64 = 50;

/// Maximum number of rows per page.
pub const MAX_LIMIT: i64 = 200;

/// Clamp a user-provided limit to `[1, max]`, using `default` when absent.
pub fn clamp_limit(limit: Option<i64>, default: i64, max: i64) -> i64 {
    limit.unwrap_or(default).max(1).min(max)
}

/// Clamp a user-provided offset to non-negative.
pub fn clamp_offset(offset: Option<i64>) -> i64 {
    offset.unwrap_or(0).max(0)
}
