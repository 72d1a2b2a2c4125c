use async_trait::async_trait;
use chrono::Utc;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::config::StoreKind;
use crate::database::document::Document;
use crate::database::manager::DatabaseError;
use crate::database::store::DocumentStore;
use crate::filter::{Filter, FilterData};

/// In-process store keeping documents per collection in insertion order
#[derive(Clone, Default)]
pub struct MemoryStore {
    collections: Arc<RwLock<HashMap<String, Vec<Document>>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    fn kind(&self) -> StoreKind {
        StoreKind::Memory
    }

    async fn create(&self, collection: &str, data: Map<String, Value>) -> Result<Document, DatabaseError> {
        let document = Document::new(collection, data);
        let mut collections = self.collections.write().await;
        collections
            .entry(collection.to_string())
            .or_default()
            .push(document.clone());
        Ok(document)
    }

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, DatabaseError> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .and_then(|docs| docs.iter().find(|d| d.id == id))
            .cloned())
    }

    async fn list(&self, collection: &str, filter_data: &FilterData) -> Result<Vec<Document>, DatabaseError> {
        let mut filter = Filter::new(collection).map_err(|e| DatabaseError::QueryError(e.to_string()))?;
        filter
            .assign(filter_data.clone())
            .map_err(|e| DatabaseError::QueryError(e.to_string()))?;

        let collections = self.collections.read().await;
        let matching: Vec<Document> = collections
            .get(collection)
            .map(|docs| docs.iter().filter(|d| filter.matches(d)).cloned().collect())
            .unwrap_or_default();
        Ok(filter.paginate(matching))
    }

    async fn update(
        &self,
        collection: &str,
        id: &str,
        data: Map<String, Value>,
    ) -> Result<Option<Document>, DatabaseError> {
        let mut collections = self.collections.write().await;
        let Some(document) = collections
            .get_mut(collection)
            .and_then(|docs| docs.iter_mut().find(|d| d.id == id))
        else {
            return Ok(None);
        };
        document.data = data;
        document.updated_at = Utc::now();
        Ok(Some(document.clone()))
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<bool, DatabaseError> {
        let mut collections = self.collections.write().await;
        let Some(docs) = collections.get_mut(collection) else {
            return Ok(false);
        };
        let before = docs.len();
        docs.retain(|d| d.id != id);
        Ok(docs.len() != before)
    }

    async fn ping(&self) -> Result<(), DatabaseError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn map(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[tokio::test]
    async fn create_get_update_delete() {
        let store = MemoryStore::new();
        let created = store.create("projects", map(json!({ "project_name": "Plant A" }))).await.unwrap();

        let fetched = store.get("projects", &created.id).await.unwrap().unwrap();
        assert_eq!(fetched.data["project_name"], json!("Plant A"));
        assert!(store.get("company_profiles", &created.id).await.unwrap().is_none());

        let updated = store
            .update("projects", &created.id, map(json!({ "project_name": "Plant B" })))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.data["project_name"], json!("Plant B"));
        assert!(updated.updated_at >= created.updated_at);

        assert!(store.delete("projects", &created.id).await.unwrap());
        assert!(!store.delete("projects", &created.id).await.unwrap());
        assert!(store.update("projects", &created.id, Map::new()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn lists_with_equality_and_paging() {
        let store = MemoryStore::new();
        for (company, name) in [("c1", "A"), ("c2", "B"), ("c1", "C"), ("c1", "D")] {
            store
                .create("projects", map(json!({ "companyId": company, "project_name": name })))
                .await
                .unwrap();
        }

        let all_c1 = store.list("projects", &FilterData::eq("companyId", "c1")).await.unwrap();
        let names: Vec<_> = all_c1.iter().map(|d| d.get_str("project_name").unwrap()).collect();
        assert_eq!(names, vec!["A", "C", "D"]);

        let page = store
            .list("projects", &FilterData::eq("companyId", "c1").with_limit(1).with_offset(1))
            .await
            .unwrap();
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].get_str("project_name"), Some("C"));

        assert!(store.list("subsidies", &FilterData::new()).await.unwrap().is_empty());
    }
}
