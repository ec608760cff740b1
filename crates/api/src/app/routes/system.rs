use axum::{Json, extract::Extension, http::StatusCode};

use crate::app::dto::SessionResponse;
use crate::context::ViewerContext;

pub async fn health() -> StatusCode {
    StatusCode::OK
}

/// Current session and the capabilities it grants, for the UI to gate controls.
pub async fn session(Extension(viewer): Extension<ViewerContext>) -> Json<SessionResponse> {
    Json(SessionResponse::from(&viewer))
}
