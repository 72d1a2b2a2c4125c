use axum::{
    extract::{rejection::JsonRejection, Extension, Query},
    Json,
};
use serde_json::Value;
use std::collections::HashMap;

use crate::error::ApiError;
use crate::handlers::data::utils::{body_object, query_param};
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::aggregate::COMPANY;
use crate::state::AppState;

/// GET /api/company-complete?companyId= | ?userId=
pub async fn get(
    Extension(state): Extension<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> ApiResult<Value> {
    let profile = if let Some(company_id) = query_param(&params, "companyId") {
        COMPANY.parent_404(&state, &company_id).await?
    } else if let Some(user_id) = query_param(&params, "userId") {
        COMPANY.parent_by(&state, "userId", &user_id).await?
    } else {
        return Err(ApiError::bad_request("companyId or userId is required"));
    };

    Ok(ApiResponse::success(Value::Object(COMPANY.read(&state, &profile).await)))
}

/// POST /api/company-complete - profile plus optional child sections
pub async fn post(
    Extension(state): Extension<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Value> {
    let body = body_object(payload)?;
    let write = COMPANY.create(&state, body).await?;
    let message = if write.errors.is_empty() {
        "Company created successfully"
    } else {
        "Company created with errors"
    };

    Ok(ApiResponse::created(write.into_value()).message(message))
}

/// PUT /api/company-complete?companyId= - update or create each supplied section
pub async fn put(
    Extension(state): Extension<AppState>,
    Query(params): Query<HashMap<String, String>>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Value> {
    let company_id = query_param(&params, "companyId").ok_or_else(|| ApiError::bad_request("companyId is required"))?;
    let body = body_object(payload)?;
    let write = COMPANY.update(&state, &company_id, body).await?;
    let message = if write.errors.is_empty() {
        "Company updated successfully"
    } else {
        "Company updated with errors"
    };

    Ok(ApiResponse::success(write.into_value()).message(message))
}
