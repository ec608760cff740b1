use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get},
};
use chrono::Utc;

use devhub_auth::{Capability, authorize};
use devhub_core::DomainError;

use crate::app::{dto, errors};
use crate::app::services::AppServices;
use crate::context::ViewerContext;

pub fn router() -> Router {
    Router::new()
        .route("/editors", get(list_editors).post(add_editor))
        .route("/editors/:email", delete(remove_editor))
}

fn require_admin(viewer: &ViewerContext) -> Result<(), axum::response::Response> {
    authorize(viewer.role(), Capability::ManageAccess)
        .map_err(|e| errors::domain_error_to_response(DomainError::from(e)))
}

pub async fn list_editors(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(viewer): Extension<ViewerContext>,
) -> axum::response::Response {
    if let Err(res) = require_admin(&viewer) {
        return res;
    }

    let editors: Vec<dto::EditorResponse> = services
        .editors
        .read()
        .list()
        .iter()
        .map(dto::EditorResponse::from)
        .collect();
    Json(editors).into_response()
}

pub async fn add_editor(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(viewer): Extension<ViewerContext>,
    Json(body): Json<dto::AddEditorRequest>,
) -> axum::response::Response {
    let mut list = services.editors.write();
    match list.add(viewer.role(), &body.email, Utc::now()) {
        Ok(entry) => (StatusCode::CREATED, Json(dto::EditorResponse::from(entry))).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

/// Remove an allow-list entry and any role stored for that email.
pub async fn remove_editor(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(viewer): Extension<ViewerContext>,
    Path(email): Path<String>,
) -> axum::response::Response {
    let removed = services.editors.write().remove(viewer.role(), &email);
    let changed = match removed {
        Ok(changed) => changed,
        Err(e) => return errors::domain_error_to_response(e),
    };

    let revoked_assignments = match services.roles.revoke_by_email(&email).await {
        Ok(n) => n,
        Err(e) => return errors::role_store_error_to_response(e),
    };

    Json(dto::EditorRemovedResponse {
        email: email.trim().to_lowercase(),
        changed,
        revoked_assignments,
    })
    .into_response()
}
