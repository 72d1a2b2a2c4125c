use axum::{extract::rejection::JsonRejection, Json};
use serde_json::{Map, Value};
use std::collections::HashMap;

use crate::config::config;
use crate::error::ApiError;
use crate::filter::FilterData;

/// Query keys that control paging rather than filter documents
const RESERVED_PARAMS: [&str; 3] = ["limit", "offset", "id"];

/// Build a listing filter from query parameters: `limit`, `offset`, and
/// equality conditions for every other key.
pub fn filter_from_query(params: &HashMap<String, String>) -> Result<FilterData, ApiError> {
    let mut filter_data = FilterData::new()
        .with_limit(parse_number(params, "limit")?.unwrap_or(config().filter.default_limit))
        .with_offset(parse_number(params, "offset")?.unwrap_or(0));

    for (field, value) in params {
        if RESERVED_PARAMS.contains(&field.as_str()) {
            continue;
        }
        if field.contains('.') || field.starts_with('$') {
            return Err(ApiError::bad_request(format!(
                "Cannot filter on '{}': only top-level document fields can be filtered",
                field
            )));
        }
        filter_data = filter_data.and_eq(field.clone(), value.clone());
    }
    Ok(filter_data)
}

fn parse_number(params: &HashMap<String, String>, key: &str) -> Result<Option<i32>, ApiError> {
    match params.get(key) {
        None => Ok(None),
        Some(raw) => raw
            .parse::<i32>()
            .ok()
            .filter(|n| *n >= 0)
            .map(Some)
            .ok_or_else(|| ApiError::bad_request(format!("{} must be a non-negative integer", key))),
    }
}

/// Non-blank query parameter
pub fn query_param(params: &HashMap<String, String>, key: &str) -> Option<String> {
    params
        .get(key)
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Unwrap a JSON body that must be an object
pub fn body_object(payload: Result<Json<Value>, JsonRejection>) -> Result<Map<String, Value>, ApiError> {
    let Json(payload) = payload?;
    match payload {
        Value::Object(map) => Ok(map),
        _ => Err(ApiError::bad_request("Request body must be a JSON object")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn splits_paging_from_conditions() {
        let filter = filter_from_query(&params(&[("limit", "10"), ("offset", "5"), ("companyId", "c1")])).unwrap();
        assert_eq!(filter.limit, Some(10));
        assert_eq!(filter.offset, Some(5));
        assert_eq!(filter.where_clause.len(), 1);
        assert_eq!(filter.where_clause["companyId"], "c1");
    }

    #[test]
    fn id_is_not_a_condition() {
        let filter = filter_from_query(&params(&[("id", "abc")])).unwrap();
        assert!(filter.where_clause.is_empty());
        assert_eq!(filter.limit, Some(config().filter.default_limit));
    }

    #[test]
    fn nested_and_system_keys_are_not_filters() {
        let err = filter_from_query(&params(&[("incentiveDetails.type", "grant")])).unwrap_err();
        assert_eq!(err.status_code(), axum::http::StatusCode::BAD_REQUEST);
        assert!(err.message().contains("incentiveDetails.type"), "{}", err.message());

        assert!(filter_from_query(&params(&[("$createdAt", "2025")])).is_err());
    }

    #[test]
    fn rejects_bad_paging() {
        assert!(filter_from_query(&params(&[("limit", "-1")])).is_err());
        assert!(filter_from_query(&params(&[("offset", "many")])).is_err());
    }
}
