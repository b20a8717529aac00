//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services.rs`: stores, token table and policy dispatcher
//! - `routes/`: HTTP routes + handlers (one file per resource area), each
//!   handler declaring the policy checks it runs before touching a store
//! - `dto.rs`: request DTOs, validation and JSON mapping helpers
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{routing::get, Extension, Router};
use tower::ServiceBuilder;

use crate::config::ApiConfig;
use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

use services::AppServices;

/// Build the services for `config`, seeding demo data when asked to.
pub fn build_services(
    config: &ApiConfig,
) -> Result<Arc<AppServices>, clubroster_infra::StoreError> {
    let services = AppServices::new(config.resolve_timeout);
    if config.seed_demo {
        services.seed_demo()?;
    }
    Ok(Arc::new(services))
}

/// Build the full HTTP router (public entrypoint used by `main.rs`).
pub fn build_app(services: Arc<AppServices>) -> Router {
    let auth_state = services.auth_state();

    // Every route except /health gets a principal context (possibly anonymous).
    let protected = routes::router()
        .layer(Extension(services))
        .layer(axum::middleware::from_fn_with_state(
            auth_state,
            middleware::auth_middleware,
        ));

    Router::new()
        .route("/health", get(routes::system::health))
        .merge(protected)
        .layer(ServiceBuilder::new())
}
