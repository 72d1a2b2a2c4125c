//! Complete-entity reads and writes: a parent document plus its 0..1 children.
//!
//! Child reads and writes fan out concurrently. A failing child never fails
//! the request; reads drop the key, writes report it under `errors`.

use futures::future::join_all;
use serde_json::{Map, Value};

use crate::api::format::document_to_api_value;
use crate::collections::Collection;
use crate::database::document::Document;
use crate::error::ApiError;
use crate::filter::FilterData;
use crate::observer::ObserverError;
use crate::state::AppState;

/// Shape of one aggregate: parent section name plus child sections
#[derive(Debug, Clone, Copy)]
pub struct Aggregate {
    pub parent: Collection,
    pub parent_section: &'static str,
    pub children: &'static [(&'static str, Collection)],
}

pub const COMPANY: Aggregate = Aggregate {
    parent: Collection::CompanyProfiles,
    parent_section: "profile",
    children: &[
        ("contacts", Collection::CompanyContacts),
        ("financials", Collection::CompanyFinancials),
        ("operations", Collection::CompanyOperations),
    ],
};

pub const PROJECT: Aggregate = Aggregate {
    parent: Collection::Projects,
    parent_section: "project",
    children: &[
        ("compliance", Collection::ProjectCompliance),
        ("financials", Collection::ProjectFinancials),
        ("production", Collection::ProjectProduction),
        ("verification", Collection::ProjectVerification),
    ],
};

/// Result of an aggregate write; `errors` holds one message per failed section
#[derive(Debug, Default)]
pub struct AggregateWrite {
    pub data: Map<String, Value>,
    pub errors: Map<String, Value>,
}

impl AggregateWrite {
    /// `data` with an `errors` object added when any section failed
    pub fn into_value(self) -> Value {
        let mut data = self.data;
        if !self.errors.is_empty() {
            data.insert("errors".to_string(), Value::Object(self.errors));
        }
        Value::Object(data)
    }
}

impl Aggregate {
    fn link_key(&self) -> &'static str {
        // Both aggregate parents define a link key
        self.parent.link_key().unwrap_or("parentId")
    }

    pub async fn parent_404(&self, state: &AppState, id: &str) -> Result<Document, ApiError> {
        Ok(state.repository(self.parent).select_404(id).await?)
    }

    /// The single parent whose `field` equals `value`
    pub async fn parent_by(&self, state: &AppState, field: &str, value: &str) -> Result<Document, ApiError> {
        state
            .repository(self.parent)
            .select_one(FilterData::eq(field, value))
            .await?
            .ok_or_else(|| ApiError::not_found(format!("{} not found", self.parent.label())))
    }

    /// All parents whose `field` equals `value`
    pub async fn parents_by(&self, state: &AppState, field: &str, value: &str) -> Result<Vec<Document>, ApiError> {
        Ok(state
            .repository(self.parent)
            .select_any(FilterData::eq(field, value))
            .await?)
    }

    /// Parent plus whichever children exist and could be read
    pub async fn read(&self, state: &AppState, parent: &Document) -> Map<String, Value> {
        let link_key = self.link_key();
        let reads = self.children.iter().map(|&(section, child)| async move {
            let found: Result<Option<Document>, ObserverError> = state
                .repository(child)
                .select_one(FilterData::eq(link_key, parent.id.as_str()))
                .await;
            (section, child, found)
        });

        let mut data = Map::new();
        data.insert(
            self.parent_section.to_string(),
            document_to_api_value(parent, self.parent),
        );

        for (section, child, found) in join_all(reads).await {
            match found {
                Ok(Some(document)) => {
                    data.insert(section.to_string(), document_to_api_value(&document, child));
                }
                Ok(None) => {}
                Err(err) => {
                    tracing::warn!("Aggregate read of {} for {} {} failed: {}", child, self.parent, parent.id, err);
                }
            }
        }
        data
    }

    /// Read every parent concurrently
    pub async fn read_all(&self, state: &AppState, parents: &[Document]) -> Vec<Value> {
        join_all(parents.iter().map(|parent| self.read(state, parent)))
            .await
            .into_iter()
            .map(Value::Object)
            .collect()
    }

    /// Create the parent, then every supplied child section pointing at it
    pub async fn create(&self, state: &AppState, mut body: Map<String, Value>) -> Result<AggregateWrite, ApiError> {
        let parent_data = match body.remove(self.parent_section) {
            Some(Value::Object(map)) => map,
            Some(_) => {
                return Err(ApiError::field_error(
                    self.parent_section,
                    format!("{} must be an object", self.parent_section),
                ))
            }
            None => {
                return Err(ApiError::field_error(
                    self.parent_section,
                    format!("{} data is required", self.parent.label()),
                ))
            }
        };

        let parent = state.repository(self.parent).create(parent_data).await?;
        let mut write = AggregateWrite::default();
        write.data.insert(
            self.parent_section.to_string(),
            document_to_api_value(&parent, self.parent),
        );

        let link_key = self.link_key();
        let parent_id = parent.id.as_str();
        let creates = self.sections(&mut body, &mut write).into_iter().map(|(section, child, mut data)| async move {
            data.insert(link_key.to_string(), Value::String(parent_id.to_string()));
            let result = state.repository(child).create(data).await;
            (section, child, result)
        });

        for (section, child, result) in join_all(creates).await {
            write.record(section, child, result);
        }
        Ok(write)
    }

    /// Update the parent if given, then update or create each supplied child
    pub async fn update(
        &self,
        state: &AppState,
        parent_id: &str,
        mut body: Map<String, Value>,
    ) -> Result<AggregateWrite, ApiError> {
        let mut parent = self.parent_404(state, parent_id).await?;

        match body.remove(self.parent_section) {
            Some(Value::Object(changes)) => {
                parent = state.repository(self.parent).update(parent_id, changes).await?;
            }
            Some(_) => {
                return Err(ApiError::field_error(
                    self.parent_section,
                    format!("{} must be an object", self.parent_section),
                ))
            }
            None => {}
        }

        let mut write = AggregateWrite::default();
        write.data.insert(
            self.parent_section.to_string(),
            document_to_api_value(&parent, self.parent),
        );

        let link_key = self.link_key();
        let upserts = self.sections(&mut body, &mut write).into_iter().map(|(section, child, mut data)| async move {
            let repository = state.repository(child);
            let result = match repository.select_one(FilterData::eq(link_key, parent_id)).await {
                Ok(Some(existing)) => repository.update(&existing.id, data).await,
                Ok(None) => {
                    data.insert(link_key.to_string(), Value::String(parent_id.to_string()));
                    repository.create(data).await
                }
                Err(err) => Err(err),
            };
            (section, child, result)
        });

        for (section, child, result) in join_all(upserts).await {
            write.record(section, child, result);
        }
        Ok(write)
    }

    /// Child sections present in the body; non-object sections are reported as errors
    fn sections(
        &self,
        body: &mut Map<String, Value>,
        write: &mut AggregateWrite,
    ) -> Vec<(&'static str, Collection, Map<String, Value>)> {
        let mut sections = Vec::new();
        for &(section, child) in self.children {
            match body.remove(section) {
                Some(Value::Object(data)) => sections.push((section, child, data)),
                Some(Value::Null) | None => {}
                Some(_) => {
                    write
                        .errors
                        .insert(section.to_string(), Value::String(format!("{} must be an object", section)));
                }
            }
        }
        sections
    }
}

impl AggregateWrite {
    fn record(&mut self, section: &'static str, child: Collection, result: Result<Document, ObserverError>) {
        match result {
            Ok(document) => {
                self.data
                    .insert(section.to_string(), document_to_api_value(&document, child));
            }
            Err(err) => {
                let err = ApiError::from(err);
                tracing::warn!("Aggregate write of {} failed: {}", child, err);
                self.errors
                    .insert(section.to_string(), Value::String(err.message().to_string()));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::memory::MemoryStore;
    use serde_json::json;
    use std::sync::Arc;

    fn object(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[tokio::test]
    async fn read_without_children_has_only_the_parent() {
        let state = AppState::new(Arc::new(MemoryStore::new()));
        let profile = state
            .repository(Collection::CompanyProfiles)
            .create(object(json!({ "userId": "u1", "company_name": "H2" })))
            .await
            .unwrap();

        let data = COMPANY.read(&state, &profile).await;
        assert_eq!(data.len(), 1);
        assert_eq!(data["profile"]["company_name"], "H2");
    }

    #[tokio::test]
    async fn create_reports_failed_children() {
        let state = AppState::new(Arc::new(MemoryStore::new()));
        let write = COMPANY
            .create(
                &state,
                object(json!({
                    "profile": { "userId": "u1", "company_name": "H2" },
                    "financials": { "annual_revenue": -1 },
                    "operations": { "employees": 12 }
                })),
            )
            .await
            .unwrap();

        let company_id = write.data["profile"]["$id"].as_str().unwrap().to_string();
        assert_eq!(write.data["operations"]["companyId"], company_id.as_str());
        assert!(!write.data.contains_key("financials"));
        assert_eq!(write.errors["financials"], "Annual revenue cannot be negative");
    }

    #[tokio::test]
    async fn update_creates_missing_children_and_updates_existing() {
        let state = AppState::new(Arc::new(MemoryStore::new()));
        let write = PROJECT
            .create(
                &state,
                object(json!({
                    "project": { "companyId": "c1", "project_name": "Plant A" },
                    "production": { "installed_capacity_mw": 10 }
                })),
            )
            .await
            .unwrap();
        let project_id = write.data["project"]["$id"].as_str().unwrap().to_string();

        let write = PROJECT
            .update(
                &state,
                &project_id,
                object(json!({
                    "production": { "installed_capacity_mw": 20 },
                    "verification": { "verification_score": 80 }
                })),
            )
            .await
            .unwrap();
        assert!(write.errors.is_empty());
        assert_eq!(write.data["production"]["installed_capacity_mw"], 20);
        assert_eq!(write.data["verification"]["projectId"], project_id.as_str());

        let productions = state
            .repository(Collection::ProjectProduction)
            .select_any(FilterData::new())
            .await
            .unwrap();
        assert_eq!(productions.len(), 1);
    }

    #[tokio::test]
    async fn create_requires_the_parent_section() {
        let state = AppState::new(Arc::new(MemoryStore::new()));
        let err = COMPANY.create(&state, object(json!({ "contacts": {} }))).await.unwrap_err();
        assert_eq!(err.status_code().as_u16(), 400);
    }
}
