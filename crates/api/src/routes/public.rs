//! Route definitions for the public renderer.

use axum::routing::get;
use axum::Router;

use crate::handlers::public;
use crate::state::AppState;

/// Routes mounted at `/public`.
///
/// ```text
/// GET /pages/{slug}  -> get_page_by_slug
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/pages/{slug}", get(public::get_page_by_slug))
}
