use axum::{
    extract::{rejection::JsonRejection, Extension, Query},
    Json,
};
use serde_json::{json, Value};
use std::collections::HashMap;

use crate::api::format::{document_to_api_value, documents_to_api_values};
use crate::collections::Collection;
use crate::error::ApiError;
use crate::filter::FilterData;
use crate::handlers::data::utils::{body_object, filter_from_query, query_param};
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

const POLICIES: Collection = Collection::InsurancePolicies;

fn provider_id(params: &HashMap<String, String>) -> Result<String, ApiError> {
    query_param(params, "providerId").ok_or_else(|| ApiError::field_error("providerId", "Provider ID is required"))
}

/// GET /api/insurance/provider?providerId= - Policies owned by a provider
pub async fn get(
    Extension(state): Extension<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> ApiResult<Value> {
    let provider_id = provider_id(&params)?;
    // providerId stays in the params, so it becomes an equality condition
    let filter_data: FilterData = filter_from_query(&params)?;
    let policies = state.repository(POLICIES).select_any(filter_data).await?;

    tracing::debug!("Provider {} has {} policies", provider_id, policies.len());
    Ok(ApiResponse::success(Value::Array(documents_to_api_values(&policies, POLICIES))))
}

/// POST /api/insurance/provider - Create a policy owned by `providerId`
pub async fn post(
    Extension(state): Extension<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Value> {
    let data = body_object(payload)?;
    let has_provider = data
        .get("providerId")
        .and_then(Value::as_str)
        .is_some_and(|p| !p.trim().is_empty());
    if !has_provider {
        return Err(ApiError::field_error("providerId", "Provider ID is required"));
    }

    let policy = state.repository(POLICIES).create(data).await?;

    Ok(ApiResponse::created(document_to_api_value(&policy, POLICIES))
        .message("Insurance policy created successfully"))
}

/// DELETE /api/insurance/provider?providerId=&id= - Delete a provider's own policy
pub async fn delete(
    Extension(state): Extension<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> ApiResult<Value> {
    let provider_id = provider_id(&params)?;
    let id = query_param(&params, "id").ok_or_else(|| ApiError::bad_request("Document ID is required"))?;

    let repository = state.repository(POLICIES);
    let policy = repository.select_404(&id).await?;
    // Another provider's policy looks exactly like a missing one
    if policy.get_str("providerId") != Some(provider_id.as_str()) {
        return Err(ApiError::not_found(format!("{} not found", POLICIES.label())));
    }

    let deleted = repository.delete(&id).await?;
    Ok(ApiResponse::success(json!({ "$id": deleted.id })).message("Insurance policy deleted successfully"))
}
