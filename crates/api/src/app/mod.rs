//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services.rs`: product operations and store/telemetry selection
//! - `routes/`: HTTP routes + handlers
//! - `dto.rs`: request extraction helpers
//! - `response.rs`: success envelope
//! - `errors.rs`: domain error to HTTP translation

use std::sync::Arc;

use axum::{routing::get, Extension, Router};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

pub mod dto;
pub mod errors;
pub mod response;
pub mod routes;
pub mod services;

/// Build the full HTTP router (public entrypoint used by `main.rs` and tests).
pub fn build_app(services: Arc<services::ProductServices>) -> Router {
    Router::new()
        .route("/health", get(routes::system::health))
        .merge(routes::router())
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(Extension(services)),
        )
}
