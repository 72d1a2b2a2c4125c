use axum::{
    extract::{rejection::JsonRejection, Extension, Query},
    Json,
};
use serde_json::Value;
use std::collections::HashMap;

use crate::api::format::{document_to_api_value, documents_to_api_values};
use crate::collections::Collection;
use crate::database::document::body_id;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

use super::document::{fetch, remove};
use super::utils::{body_object, filter_from_query, query_param};

/// GET /api/{route} - List documents, or fetch one with `?id=`
pub async fn list(
    Extension(state): Extension<AppState>,
    Extension(collection): Extension<Collection>,
    Query(params): Query<HashMap<String, String>>,
) -> ApiResult<Value> {
    if let Some(id) = query_param(&params, "id") {
        return fetch(&state, collection, &id).await;
    }

    let filter_data = filter_from_query(&params)?;
    let documents = state.repository(collection).select_any(filter_data).await?;

    Ok(ApiResponse::success(Value::Array(documents_to_api_values(&documents, collection))))
}

/// POST /api/{route} - Create a document
pub async fn create(
    Extension(state): Extension<AppState>,
    Extension(collection): Extension<Collection>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Value> {
    let data = body_object(payload)?;
    let document = state.repository(collection).create(data).await?;

    Ok(ApiResponse::created(document_to_api_value(&document, collection))
        .message(format!("{} created successfully", collection.label())))
}

/// PUT /api/{route} - Update the document named by `?id=` or by `$id`/`id` in the body
pub async fn update(
    Extension(state): Extension<AppState>,
    Extension(collection): Extension<Collection>,
    Query(params): Query<HashMap<String, String>>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Value> {
    let changes = body_object(payload)?;
    let id = query_param(&params, "id")
        .or_else(|| body_id(&changes))
        .ok_or_else(|| ApiError::bad_request("Document ID is required"))?;

    let document = state.repository(collection).update(&id, changes).await?;

    Ok(ApiResponse::success(document_to_api_value(&document, collection))
        .message(format!("{} updated successfully", collection.label())))
}

/// DELETE /api/{route}?id= - Delete a document
pub async fn delete(
    Extension(state): Extension<AppState>,
    Extension(collection): Extension<Collection>,
    Query(params): Query<HashMap<String, String>>,
) -> ApiResult<Value> {
    let id = query_param(&params, "id").ok_or_else(|| ApiError::bad_request("Document ID is required"))?;
    remove(&state, collection, &id).await
}
