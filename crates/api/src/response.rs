//! Shared response envelope types for API handlers.
//!
//! CMS and admin responses use a `{ "data": ... }` envelope. Auth endpoints
//! return their payload bare.

use serde::Serialize;

/// Standard `{ "data": T }` response envelope.
///
/// ```ignore
/// Ok(Json(DataResponse { data: pages }))
/// ```
#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub data: T,
}
