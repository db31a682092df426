//! Cartwise shopping-assistant server library.
//!
//! Exposes the router builder and its parts so the binary and the
//! integration tests assemble the same application.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod gateway;
pub mod gemini;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;

use axum::{Router, ServiceExt, extract::Request, routing::IntoMakeService};
use tower::Layer;
use tower_http::normalize_path::{NormalizePath, NormalizePathLayer};
use tower_http::trace::TraceLayer;
use tower_sessions::{SessionManagerLayer, SessionStore};

use crate::middleware::request_id_middleware;
use crate::state::AppState;

/// Assemble the application with its middleware stack.
///
/// The session store is chosen by the caller: `PostgresStore` in production,
/// `MemoryStore` in tests.
pub fn app<S>(state: AppState, session_layer: SessionManagerLayer<S>) -> NormalizePath<Router>
where
    S: SessionStore + Clone,
{
    let router = routes::routes()
        .layer(session_layer)
        .layer(axum::middleware::from_fn(request_id_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request| {
                tracing::info_span!(
                    "http_request",
                    method = %request.method(),
                    uri = %request.uri(),
                    request_id = tracing::field::Empty,
                )
            }),
        )
        .with_state(state)
        // Sentry layers (outermost for full request coverage)
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction());

    NormalizePathLayer::trim_trailing_slash().layer(router)
}

/// Turn the assembled application into the service `axum::serve` expects.
///
/// Path normalization wraps the router, so the conversion has to go through
/// axum's `ServiceExt` rather than `Router::into_make_service`.
pub fn make_service(app: NormalizePath<Router>) -> IntoMakeService<NormalizePath<Router>> {
    ServiceExt::<Request>::into_make_service(app)
}
