use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path},
    routing::{get, put},
};

use devhub_content::Resource;

use crate::app::routes::common;
use crate::app::services::AppServices;
use crate::context::ViewerContext;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_resources).post(create_resource))
        .route("/:id", put(update_resource).delete(delete_resource))
}

pub async fn list_resources(Extension(services): Extension<Arc<AppServices>>) -> axum::response::Response {
    common::list_records(&services.resources)
}

pub async fn create_resource(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(viewer): Extension<ViewerContext>,
    Json(body): Json<Resource>,
) -> axum::response::Response {
    common::create_record(&services.resources, &viewer, body)
}

pub async fn update_resource(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(viewer): Extension<ViewerContext>,
    Path(id): Path<String>,
    Json(body): Json<Resource>,
) -> axum::response::Response {
    common::update_record(&services.resources, &viewer, &id, body)
}

pub async fn delete_resource(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(viewer): Extension<ViewerContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    common::delete_record(&services.resources, &viewer, &id)
}
