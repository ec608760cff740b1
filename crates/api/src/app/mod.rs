//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services.rs`: auth backend, resolvers and the shared collections
//! - `routes/`: HTTP routes + handlers (one file per area)
//! - `dto.rs`: request/response DTOs
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{Extension, Router, routing::get};

use devhub_infra::SupabaseConfigError;

use crate::config::AppConfig;
use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

pub use services::AppServices;

/// Build the full HTTP router from configuration (public entrypoint used by `main.rs`).
///
/// Also starts the auth audit task, so this must run inside a tokio runtime.
pub async fn build_app(config: &AppConfig) -> Result<Router, SupabaseConfigError> {
    let services = Arc::new(AppServices::from_config(config)?);
    services::spawn_auth_audit(services.provider.as_ref());
    Ok(router(services))
}

/// Router over already-built services.
pub fn router(services: Arc<AppServices>) -> Router {
    let viewer_routes = routes::router()
        .layer(Extension(services.clone()))
        .layer(axum::middleware::from_fn_with_state(
            services,
            middleware::viewer_middleware,
        ));

    Router::new()
        .route("/health", get(routes::system::health))
        .merge(viewer_routes)
}
