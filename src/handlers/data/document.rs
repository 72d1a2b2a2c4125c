use axum::{
    extract::{rejection::JsonRejection, Extension, Path},
    Json,
};
use serde_json::{json, Value};

use crate::api::format::document_to_api_value;
use crate::collections::Collection;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::cascade::delete_with_children;
use crate::state::AppState;

use super::utils::body_object;

/// GET /api/{route}/:id - Fetch one document
pub async fn get(
    Extension(state): Extension<AppState>,
    Extension(collection): Extension<Collection>,
    Path(id): Path<String>,
) -> ApiResult<Value> {
    fetch(&state, collection, &id).await
}

/// PUT /api/{route}/:id - Partial update of one document
pub async fn put(
    Extension(state): Extension<AppState>,
    Extension(collection): Extension<Collection>,
    Path(id): Path<String>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Value> {
    let changes = body_object(payload)?;
    let document = state.repository(collection).update(&id, changes).await?;

    Ok(ApiResponse::success(document_to_api_value(&document, collection))
        .message(format!("{} updated successfully", collection.label())))
}

/// DELETE /api/{route}/:id - Delete one document (and its children for parents)
pub async fn delete(
    Extension(state): Extension<AppState>,
    Extension(collection): Extension<Collection>,
    Path(id): Path<String>,
) -> ApiResult<Value> {
    remove(&state, collection, &id).await
}

pub(super) async fn fetch(state: &AppState, collection: Collection, id: &str) -> ApiResult<Value> {
    let document = state.repository(collection).select_404(id).await?;
    Ok(ApiResponse::success(document_to_api_value(&document, collection)))
}

pub(super) async fn remove(state: &AppState, collection: Collection, id: &str) -> ApiResult<Value> {
    if collection.children().is_empty() {
        let deleted = state.repository(collection).delete(id).await?;
        return Ok(ApiResponse::success(json!({ "$id": deleted.id }))
            .message(format!("{} deleted successfully", collection.label())));
    }

    let (deleted, report) = delete_with_children(state, collection, id).await?;
    if !report.failed.is_empty() {
        tracing::warn!(
            "{} {} deleted with {} children left behind",
            collection,
            deleted.id,
            report.failed.len()
        );
    }

    Ok(ApiResponse::success(json!({
        "$id": deleted.id,
        "children_deleted": report.deleted.len(),
        "children_failed": report.failed.len(),
    }))
    .message(format!("{} deleted successfully", collection.label())))
}
