use serde_json::Value;
use std::collections::BTreeMap;

use super::error::FilterError;
use super::types::{FilterData, SqlResult};
use crate::database::document::{value_text, Document};

const DOCUMENT_COLUMNS: &str = "id, collection, data, created_at, updated_at";

/// Validated equality filter over one collection.
///
/// The same filter drives all three stores: it renders parameterised SQL for
/// Postgres, query strings for the hosted REST API, and an in-process matcher
/// for the memory store. Comparison is textual on both sides.
pub struct Filter {
    collection: String,
    where_data: BTreeMap<String, Value>,
    limit: Option<i32>,
    offset: Option<i32>,
}

impl Filter {
    pub fn new(collection: impl Into<String>) -> Result<Self, FilterError> {
        let collection = collection.into();
        Self::validate_collection_name(&collection)?;
        Ok(Self {
            collection,
            where_data: BTreeMap::new(),
            limit: None,
            offset: None,
        })
    }

    pub fn assign(&mut self, data: FilterData) -> Result<&mut Self, FilterError> {
        for (field, value) in data.where_clause {
            self.where_eq(field, value)?;
        }
        if data.limit.is_some() || data.offset.is_some() {
            self.limit(data.limit, data.offset)?;
        }
        Ok(self)
    }

    pub fn where_eq(&mut self, field: impl Into<String>, value: Value) -> Result<&mut Self, FilterError> {
        let field = field.into();
        Self::validate_field_name(&field)?;
        self.where_data.insert(field, value);
        Ok(self)
    }

    pub fn limit(&mut self, limit: Option<i32>, offset: Option<i32>) -> Result<&mut Self, FilterError> {
        if let Some(l) = limit { if l < 0 { return Err(FilterError::InvalidLimit("Limit must be non-negative".to_string())); } }
        if let Some(off) = offset { if off < 0 { return Err(FilterError::InvalidOffset("Offset must be non-negative".to_string())); } }

        // Apply max limit from config
        let max_limit = crate::config::CONFIG.filter.max_limit.unwrap_or(i32::MAX);
        self.limit = limit.map(|l| {
            if l > max_limit {
                if crate::config::CONFIG.filter.debug_logging {
                    tracing::warn!("Limit {} exceeds max {}, capping to max", l, max_limit);
                }
                max_limit
            } else {
                l
            }
        });
        self.offset = offset;
        Ok(self)
    }

    pub fn limit_value(&self) -> Option<i32> {
        self.limit
    }

    pub fn offset_value(&self) -> i32 {
        self.offset.unwrap_or(0)
    }

    /// SELECT over the `documents` table; `$1` is always the collection id
    pub fn to_sql(&self) -> SqlResult {
        let (where_clause, params) = self.where_sql();
        let mut query = format!(
            "SELECT {} FROM documents WHERE {} ORDER BY created_at ASC, id ASC",
            DOCUMENT_COLUMNS, where_clause
        );
        match (self.limit, self.offset) {
            (Some(l), Some(o)) => query.push_str(&format!(" LIMIT {} OFFSET {}", l, o)),
            (Some(l), None) => query.push_str(&format!(" LIMIT {}", l)),
            (None, Some(o)) => query.push_str(&format!(" OFFSET {}", o)),
            (None, None) => {}
        }
        SqlResult { query, params }
    }

    fn where_sql(&self) -> (String, Vec<String>) {
        let mut clauses = vec!["collection = $1".to_string()];
        let mut params = vec![self.collection.clone()];

        for (field, value) in &self.where_data {
            params.push(field.clone());
            let field_param = params.len();
            match value_text(value) {
                Some(text) => {
                    params.push(text);
                    clauses.push(format!("data->>${} = ${}", field_param, params.len()));
                }
                None => clauses.push(format!("data->>${} IS NULL", field_param)),
            }
        }

        (clauses.join(" AND "), params)
    }

    /// Query strings understood by the hosted document database
    pub fn to_remote_queries(&self) -> Vec<String> {
        let mut queries: Vec<String> = self
            .where_data
            .iter()
            .map(|(field, value)| match value {
                Value::Null => serde_json::json!({ "method": "isNull", "attribute": field }),
                other => serde_json::json!({ "method": "equal", "attribute": field, "values": [other] }),
            })
            .map(|q| q.to_string())
            .collect();

        if let Some(limit) = self.limit {
            queries.push(serde_json::json!({ "method": "limit", "values": [limit] }).to_string());
        }
        if let Some(offset) = self.offset {
            queries.push(serde_json::json!({ "method": "offset", "values": [offset] }).to_string());
        }
        queries
    }

    /// In-process evaluation against a document
    pub fn matches(&self, document: &Document) -> bool {
        if document.collection != self.collection {
            return false;
        }
        self.where_data.iter().all(|(field, expected)| {
            let actual = document.get(field).and_then(value_text);
            actual == value_text(expected)
        })
    }

    /// Apply offset/limit to an already ordered list
    pub fn paginate<T>(&self, items: Vec<T>) -> Vec<T> {
        let skipped = items.into_iter().skip(self.offset_value().max(0) as usize);
        match self.limit {
            Some(l) => skipped.take(l.max(0) as usize).collect(),
            None => skipped.collect(),
        }
    }

    fn validate_collection_name(name: &str) -> Result<(), FilterError> {
        if !Self::is_identifier(name) {
            return Err(FilterError::InvalidCollection(format!("Invalid collection name format: {}", name)));
        }
        Ok(())
    }

    fn validate_field_name(name: &str) -> Result<(), FilterError> {
        if !Self::is_identifier(name) {
            return Err(FilterError::InvalidField(format!("Invalid field name format: {}", name)));
        }
        Ok(())
    }

    fn is_identifier(name: &str) -> bool {
        let mut chars = name.chars();
        match chars.next() {
            Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
            _ => return false,
        }
        chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
    }
}
