//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services.rs`: store and service wiring
//! - `routes/`: HTTP routes + handlers (one file per area)
//! - `dto.rs`: request/response DTOs and JSON mapping helpers
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{routing::get, Extension, Router};
use tower::ServiceBuilder;

use billbook_infra::AppConfig;

use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

/// Build the full HTTP router (public entrypoint used by `main.rs`).
pub fn build_app(config: &AppConfig) -> Router {
    let services = Arc::new(services::build_services(config));
    build_app_with(services)
}

/// Router over already-wired services.
pub fn build_app_with(services: Arc<services::AppServices>) -> Router {
    // Tenant-scoped routes: every request names its tenant.
    let scoped = routes::router()
        .layer(Extension(services))
        .layer(axum::middleware::from_fn(middleware::tenant_middleware));

    Router::new()
        .route("/health", get(routes::system::health))
        .merge(scoped)
        .layer(ServiceBuilder::new())
}
