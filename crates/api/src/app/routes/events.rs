use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path},
    routing::{get, put},
};

use devhub_content::Event;

use crate::app::routes::common;
use crate::app::services::AppServices;
use crate::context::ViewerContext;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_events).post(create_event))
        .route("/:id", put(update_event).delete(delete_event))
}

pub async fn list_events(Extension(services): Extension<Arc<AppServices>>) -> axum::response::Response {
    common::list_records(&services.events)
}

pub async fn create_event(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(viewer): Extension<ViewerContext>,
    Json(body): Json<Event>,
) -> axum::response::Response {
    common::create_record(&services.events, &viewer, body)
}

pub async fn update_event(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(viewer): Extension<ViewerContext>,
    Path(id): Path<String>,
    Json(body): Json<Event>,
) -> axum::response::Response {
    common::update_record(&services.events, &viewer, &id, body)
}

pub async fn delete_event(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(viewer): Extension<ViewerContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    common::delete_record(&services.events, &viewer, &id)
}
