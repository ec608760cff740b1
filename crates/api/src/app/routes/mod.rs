use axum::{Router, routing::get};

pub mod auth;
pub mod common;
pub mod editors;
pub mod events;
pub mod resources;
pub mod system;

/// Router for every endpoint that sees a [`ViewerContext`](crate::context::ViewerContext).
pub fn router() -> Router {
    Router::new()
        .route("/session", get(system::session))
        .nest("/auth", auth::router())
        .nest("/events", events::router())
        .nest("/resources", resources::router())
        .nest("/admin", editors::router())
}
