use axum::{
    extract::{rejection::JsonRejection, Extension, Query},
    Json,
};
use serde_json::Value;
use std::collections::HashMap;

use crate::error::ApiError;
use crate::handlers::data::utils::{body_object, query_param};
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::aggregate::PROJECT;
use crate::state::AppState;

/// GET /api/project-complete?projectId= (one) | ?companyId= (all of a company)
pub async fn get(
    Extension(state): Extension<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> ApiResult<Value> {
    if let Some(project_id) = query_param(&params, "projectId") {
        let project = PROJECT.parent_404(&state, &project_id).await?;
        return Ok(ApiResponse::success(Value::Object(PROJECT.read(&state, &project).await)));
    }

    let company_id = query_param(&params, "companyId")
        .ok_or_else(|| ApiError::bad_request("projectId or companyId is required"))?;
    let projects = PROJECT.parents_by(&state, "companyId", &company_id).await?;

    Ok(ApiResponse::success(Value::Array(PROJECT.read_all(&state, &projects).await)))
}

/// POST /api/project-complete - project plus optional child sections
pub async fn post(
    Extension(state): Extension<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Value> {
    let body = body_object(payload)?;
    let write = PROJECT.create(&state, body).await?;
    let message = if write.errors.is_empty() {
        "Project created successfully"
    } else {
        "Project created with errors"
    };

    Ok(ApiResponse::created(write.into_value()).message(message))
}

/// PUT /api/project-complete?projectId= - update or create each supplied section
pub async fn put(
    Extension(state): Extension<AppState>,
    Query(params): Query<HashMap<String, String>>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Value> {
    let project_id = query_param(&params, "projectId").ok_or_else(|| ApiError::bad_request("projectId is required"))?;
    let body = body_object(payload)?;
    let write = PROJECT.update(&state, &project_id, body).await?;
    let message = if write.errors.is_empty() {
        "Project updated successfully"
    } else {
        "Project updated with errors"
    };

    Ok(ApiResponse::success(write.into_value()).message(message))
}
