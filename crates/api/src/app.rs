//! Router assembly shared by the server binary and the integration tests.

use std::time::Duration;

use axum::http::header::{InvalidHeaderValue, AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderName, HeaderValue, Method, StatusCode};
use axum::Router;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::routes;
use crate::state::AppState;

/// Header carrying the per-request id, generated when the client sends none.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// CORS for the editor front end. Credentials are allowed because the CMS
/// authenticates browsers with the `access_token` cookie.
pub fn cors_layer(origins: &[String]) -> Result<CorsLayer, InvalidHeaderValue> {
    let origins = origins
        .iter()
        .map(|o| o.parse::<HeaderValue>())
        .collect::<Result<Vec<_>, _>>()?;

    Ok(CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .allow_credentials(true)
        .max_age(Duration::from_secs(3600)))
}

/// Build the Pagecraft application.
///
/// `/health` sits at the root and every other route under `/api/v1`.
/// Layers run outermost first: CORS, request id, request span, request id
/// echoed on the response, timeout, then the panic guard closest to the
/// handlers.
pub fn build_app(state: AppState) -> Result<Router, InvalidHeaderValue> {
    let cors = cors_layer(&state.config.cors_origins)?;
    let timeout = Duration::from_secs(state.config.request_timeout_secs);
    let request_id = HeaderName::from_static(REQUEST_ID_HEADER);

    Ok(Router::new()
        .merge(routes::health::router())
        .nest("/api/v1", routes::api_routes())
        .layer(CatchPanicLayer::new())
        .layer(TimeoutLayer::with_status_code(StatusCode::REQUEST_TIMEOUT, timeout))
        .layer(PropagateRequestIdLayer::new(request_id.clone()))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(SetRequestIdLayer::new(request_id, MakeRequestUuid))
        .layer(cors)
        .with_state(state))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cors_accepts_configured_origins() {
        let origins = vec![
            "http://localhost:5173".to_string(),
            "https://cms.example.com".to_string(),
        ];
        assert!(cors_layer(&origins).is_ok());
    }

    #[test]
    fn cors_rejects_malformed_origin() {
        let origins = vec!["http://bad\norigin".to_string()];
        assert!(cors_layer(&origins).is_err());
    }
}
