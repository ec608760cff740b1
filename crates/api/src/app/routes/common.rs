//! Handlers shared by the event and resource collections.

use std::sync::RwLock;

use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::Serialize;

use devhub_content::{ContentStore, Record};
use devhub_core::{DomainError, RecordId};

use crate::app::services::{read, write};
use crate::app::{dto, errors};
use crate::context::ViewerContext;

pub fn parse_record_id(raw: &str) -> Result<RecordId, axum::response::Response> {
    raw.parse::<RecordId>()
        .ok()
        .filter(|id| id.is_assigned())
        .ok_or_else(|| {
            errors::domain_error_to_response(DomainError::invalid_id(format!(
                "`{raw}` is not a record id"
            )))
        })
}

pub fn list_records<T: Record + Serialize>(store: &RwLock<ContentStore<T>>) -> axum::response::Response {
    Json(read(store).list().to_vec()).into_response()
}

pub fn create_record<T: Record + Serialize>(
    store: &RwLock<ContentStore<T>>,
    viewer: &ViewerContext,
    record: T,
) -> axum::response::Response {
    let mut store = write(store);
    match store.add(viewer.role(), record) {
        Ok(id) => match store.get(id) {
            Some(created) => (StatusCode::CREATED, Json(created.clone())).into_response(),
            None => errors::domain_error_to_response(DomainError::not_found()),
        },
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub fn update_record<T: Record>(
    store: &RwLock<ContentStore<T>>,
    viewer: &ViewerContext,
    raw_id: &str,
    record: T,
) -> axum::response::Response {
    let id = match parse_record_id(raw_id) {
        Ok(id) => id,
        Err(res) => return res,
    };
    match write(store).update(viewer.role(), id, record) {
        Ok(changed) => Json(dto::ChangeResponse { id, changed }).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub fn delete_record<T: Record>(
    store: &RwLock<ContentStore<T>>,
    viewer: &ViewerContext,
    raw_id: &str,
) -> axum::response::Response {
    let id = match parse_record_id(raw_id) {
        Ok(id) => id,
        Err(res) => return res,
    };
    match write(store).remove(viewer.role(), id) {
        Ok(changed) => Json(dto::ChangeResponse { id, changed }).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}
