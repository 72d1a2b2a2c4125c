use serde_json::{Map, Value};
use std::sync::Arc;

use crate::collections::Collection;
use crate::database::document::Document;
use crate::database::store::DocumentStore;
use crate::filter::FilterData;
use crate::observer::{ObserverError, ObserverPipeline};
use crate::state::AppState;

/// One collection seen through the observer pipeline.
/// Handlers and services go through here so every write is validated and audited.
#[derive(Clone)]
pub struct Repository {
    collection: Collection,
    store: Arc<dyn DocumentStore>,
    pipeline: Arc<ObserverPipeline>,
}

impl Repository {
    pub fn new(collection: Collection, state: &AppState) -> Self {
        Self {
            collection,
            store: state.store.clone(),
            pipeline: state.pipeline.clone(),
        }
    }

    pub fn collection(&self) -> Collection {
        self.collection
    }

    pub async fn select_any(&self, filter_data: FilterData) -> Result<Vec<Document>, ObserverError> {
        self.pipeline
            .select(self.store.clone(), self.collection, filter_data)
            .await
    }

    /// First document matching the filter
    pub async fn select_one(&self, filter_data: FilterData) -> Result<Option<Document>, ObserverError> {
        let filter_data = filter_data.with_limit(1);
        Ok(self.select_any(filter_data).await?.into_iter().next())
    }

    pub async fn select_id(&self, id: &str) -> Result<Option<Document>, ObserverError> {
        self.pipeline.select_id(self.store.clone(), self.collection, id).await
    }

    /// Like `select_id`, but a missing document is an error
    pub async fn select_404(&self, id: &str) -> Result<Document, ObserverError> {
        self.select_id(id)
            .await?
            .ok_or_else(|| ObserverError::NotFound(format!("{} not found", self.collection.label())))
    }

    /// Documents whose parent key points at `parent_id`
    pub async fn select_children(&self, parent_id: &str) -> Result<Vec<Document>, ObserverError> {
        let Some(parent_key) = self.collection.parent_key() else {
            return Ok(Vec::new());
        };
        self.select_any(FilterData::eq(parent_key, parent_id)).await
    }

    pub async fn create(&self, data: Map<String, Value>) -> Result<Document, ObserverError> {
        self.pipeline.create(self.store.clone(), self.collection, data).await
    }

    pub async fn update(&self, id: &str, changes: Map<String, Value>) -> Result<Document, ObserverError> {
        self.pipeline
            .update(self.store.clone(), self.collection, id, changes)
            .await
    }

    pub async fn delete(&self, id: &str) -> Result<Document, ObserverError> {
        self.pipeline.delete(self.store.clone(), self.collection, id).await
    }
}
