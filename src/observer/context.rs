use serde_json::{Map, Value};
use std::sync::Arc;
use std::time::Instant;

use crate::collections::Collection;
use crate::database::document::{field_path, strip_system_fields, Document};
use crate::database::store::DocumentStore;
use crate::filter::FilterData;
use crate::observer::error::ObserverError;
use crate::observer::traits::{ObserverRing, Operation};

/// State that flows through the observer pipeline for one operation
pub struct ObserverContext {
    // Core request data
    pub operation: Operation,
    pub collection: Collection,
    pub store: Arc<dyn DocumentStore>,

    /// Target document for update, delete and single selects
    pub id: Option<String>,

    /// Fields as they will be written (merged with the stored document on update)
    pub record: Map<String, Value>,

    /// Fields supplied by the caller
    pub changes: Map<String, Value>,

    /// Stored document, loaded by ring 0 for update and delete
    pub existing: Option<Document>,

    // SELECT-specific query filter
    pub filter_data: Option<FilterData>,

    // Documents produced by ring 5
    pub result: Vec<Document>,

    // Performance tracking
    pub start_time: Instant,
    pub current_ring: Option<ObserverRing>,

    // Error and warning accumulation
    pub errors: Vec<ObserverError>,
    pub warnings: Vec<String>,
}

impl ObserverContext {
    pub fn new(operation: Operation, collection: Collection, store: Arc<dyn DocumentStore>) -> Self {
        Self {
            operation,
            collection,
            store,
            id: None,
            record: Map::new(),
            changes: Map::new(),
            existing: None,
            filter_data: None,
            result: Vec::new(),
            start_time: Instant::now(),
            current_ring: None,
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Caller-supplied fields; store-owned fields are dropped
    pub fn with_changes(mut self, changes: Map<String, Value>) -> Self {
        let changes = strip_system_fields(changes);
        self.record = changes.clone();
        self.changes = changes;
        self
    }

    pub fn with_filter(mut self, filter_data: FilterData) -> Self {
        self.filter_data = Some(filter_data);
        self
    }

    /// Working value of a field, following dots into nested objects
    pub fn field(&self, path: &str) -> Option<&Value> {
        field_path(&self.record, path)
    }

    pub fn field_str(&self, path: &str) -> Option<&str> {
        self.field(path).and_then(Value::as_str)
    }

    pub fn field_f64(&self, path: &str) -> Option<f64> {
        self.field(path).and_then(Value::as_f64)
    }

    pub fn add_error(&mut self, error: ObserverError) {
        self.errors.push(error);
    }

    pub fn add_warning(&mut self, warning: impl Into<String>) {
        self.warnings.push(warning.into());
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn execution_time(&self) -> std::time::Duration {
        self.start_time.elapsed()
    }
}
