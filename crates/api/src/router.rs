//! Router assembly for the tour service.
//!
//! [`build_app_router`] mounts `/health` and the `/api` tree over one layer
//! stack. `main.rs` and the integration tests both call it, so the tests
//! exercise the same timeouts, request ids and CORS policy as production.

use std::time::Duration;

use axum::http::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, LOCATION};
use axum::http::{HeaderName, Method, StatusCode};
use axum::Router;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::config::ServerConfig;
use crate::routes;
use crate::state::AppState;

/// Header carrying the per-request correlation id.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Methods the tour routes answer to. Tours are never replaced or deleted.
const TOUR_METHODS: [Method; 3] = [Method::GET, Method::POST, Method::PATCH];

/// Build the service [`Router`].
///
/// Layers, outermost first: CORS, request-id assignment, tracing (the span
/// sees the id), request-id echo on the response, timeout (408), panic
/// recovery (500).
pub fn build_app_router(state: AppState, config: &ServerConfig) -> Router {
    let request_id = HeaderName::from_static(REQUEST_ID_HEADER);

    Router::new()
        .merge(routes::health::router())
        .nest("/api", routes::api_routes())
        .layer(CatchPanicLayer::new())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(config.request_timeout_secs),
        ))
        .layer(PropagateRequestIdLayer::new(request_id.clone()))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(SetRequestIdLayer::new(request_id, MakeRequestUuid))
        .layer(build_cors_layer(config))
        .with_state(state)
}

/// CORS policy for browser clients of the tour API.
///
/// - Only `GET`, `POST` and `PATCH` are allowed.
/// - `Accept` and `Content-Type` are allowed request headers because they
///   select the representation variant.
/// - `Location` is exposed so a browser can follow a 201 to the new tour.
///
/// An unparseable origin in `CORS_ORIGINS` aborts startup.
pub fn build_cors_layer(config: &ServerConfig) -> CorsLayer {
    let origins: Vec<_> = config
        .cors_origins
        .iter()
        .map(|origin| {
            origin
                .parse()
                .unwrap_or_else(|e| panic!("Invalid CORS origin '{origin}': {e}"))
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(TOUR_METHODS)
        .allow_headers([ACCEPT, CONTENT_TYPE, AUTHORIZATION])
        .expose_headers([LOCATION])
        .allow_credentials(true)
        .max_age(Duration::from_secs(3600))
}
