// Observer pipeline: every document operation runs through ordered rings

use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tokio::time::timeout;

use crate::collections::Collection;
use crate::database::document::Document;
use crate::database::store::DocumentStore;
use crate::filter::FilterData;
use crate::observer::context::ObserverContext;
use crate::observer::error::ObserverError;
use crate::observer::implementations::register_default_observers;
use crate::observer::traits::{Observer, ObserverRing, Operation};

/// Executes registered observers in ring order.
/// Errors in a ring before the database abort the operation; errors after it are logged.
pub struct ObserverPipeline {
    observers: HashMap<ObserverRing, Vec<Box<dyn Observer>>>,
}

impl ObserverPipeline {
    /// Empty pipeline; observers are added with `register_observer`
    pub fn new() -> Self {
        Self { observers: HashMap::new() }
    }

    /// Pipeline with every built-in observer registered
    pub fn with_defaults() -> Self {
        let mut pipeline = Self::new();
        register_default_observers(&mut pipeline);
        pipeline
    }

    pub fn register_observer(&mut self, observer: Box<dyn Observer>) {
        let ring = observer.ring();
        let name = observer.name();
        let observers = self.observers.entry(ring).or_default();
        observers.push(observer);
        observers.sort_by_key(|o| o.priority());

        tracing::debug!("Registered observer '{}' for ring {:?}", name, ring);
    }

    pub fn observer_count(&self) -> usize {
        self.observers.values().map(Vec::len).sum()
    }

    /// Run a prepared context through every ring relevant to its operation
    pub async fn execute(&self, mut ctx: ObserverContext) -> Result<ObserverContext, ObserverError> {
        let relevant_rings = ObserverRing::for_operation(&ctx.operation);

        tracing::debug!(
            "Observer pipeline starting: operation={:?}, collection={}, rings={:?}",
            ctx.operation, ctx.collection, relevant_rings
        );

        for &ring in relevant_rings.iter().filter(|r| r.is_synchronous()) {
            ctx.current_ring = Some(ring);
            self.execute_ring(ring, &mut ctx).await;

            if ctx.has_errors() {
                tracing::debug!("Observer pipeline stopped at ring {:?}", ring);
                return Err(ctx.errors.remove(0));
            }
        }

        for &ring in relevant_rings.iter().filter(|r| !r.is_synchronous()) {
            ctx.current_ring = Some(ring);
            self.execute_ring(ring, &mut ctx).await;

            for error in ctx.errors.drain(..) {
                tracing::warn!("Post-commit observer error in ring {:?}: {}", ring, error);
            }
        }

        tracing::debug!(
            "Observer pipeline finished: operation={:?}, collection={}, elapsed={:?}",
            ctx.operation, ctx.collection, ctx.execution_time()
        );
        Ok(ctx)
    }

    pub async fn create(
        &self,
        store: Arc<dyn DocumentStore>,
        collection: Collection,
        data: Map<String, Value>,
    ) -> Result<Document, ObserverError> {
        let ctx = ObserverContext::new(Operation::Create, collection, store).with_changes(data);
        Self::single(self.execute(ctx).await?)
    }

    pub async fn update(
        &self,
        store: Arc<dyn DocumentStore>,
        collection: Collection,
        id: &str,
        changes: Map<String, Value>,
    ) -> Result<Document, ObserverError> {
        let ctx = ObserverContext::new(Operation::Update, collection, store)
            .with_id(id)
            .with_changes(changes);
        Self::single(self.execute(ctx).await?)
    }

    pub async fn delete(
        &self,
        store: Arc<dyn DocumentStore>,
        collection: Collection,
        id: &str,
    ) -> Result<Document, ObserverError> {
        let ctx = ObserverContext::new(Operation::Delete, collection, store).with_id(id);
        Self::single(self.execute(ctx).await?)
    }

    pub async fn select(
        &self,
        store: Arc<dyn DocumentStore>,
        collection: Collection,
        filter_data: FilterData,
    ) -> Result<Vec<Document>, ObserverError> {
        let ctx = ObserverContext::new(Operation::Select, collection, store).with_filter(filter_data);
        Ok(self.execute(ctx).await?.result)
    }

    pub async fn select_id(
        &self,
        store: Arc<dyn DocumentStore>,
        collection: Collection,
        id: &str,
    ) -> Result<Option<Document>, ObserverError> {
        let ctx = ObserverContext::new(Operation::Select, collection, store).with_id(id);
        Ok(self.execute(ctx).await?.result.into_iter().next())
    }

    fn single(ctx: ObserverContext) -> Result<Document, ObserverError> {
        ctx.result.into_iter().next().ok_or_else(|| {
            ObserverError::DatabaseError(format!("{:?} produced no document", ctx.operation))
        })
    }

    /// Execute observers in a specific ring, collecting their errors on the context
    async fn execute_ring(&self, ring: ObserverRing, ctx: &mut ObserverContext) {
        let Some(observers) = self.observers.get(&ring) else {
            tracing::trace!("No observers registered for ring {:?}", ring);
            return;
        };

        for observer in observers {
            if !observer.applies_to_operation(ctx.operation) || !observer.applies_to_collection(ctx.collection) {
                continue;
            }

            let observer_start = Instant::now();
            let result = timeout(observer.timeout(), observer.execute(ctx)).await;
            let execution_time = observer_start.elapsed();

            match result {
                Ok(Ok(())) => {
                    tracing::trace!("Observer: {} completed in {:?}", observer.name(), execution_time);
                }
                Ok(Err(error)) => {
                    tracing::debug!("Observer: {} failed in {:?}: {}", observer.name(), execution_time, error);
                    ctx.add_error(error);
                }
                Err(_elapsed) => {
                    tracing::error!("Observer: {} timed out after {:?}", observer.name(), observer.timeout());
                    ctx.add_error(ObserverError::TimeoutError(format!(
                        "Observer {} timed out after {:?}",
                        observer.name(),
                        observer.timeout()
                    )));
                }
            }

            // First failure in a ring short-circuits the rest of it
            if ring.is_synchronous() && ctx.has_errors() {
                return;
            }
        }
    }
}

impl Default for ObserverPipeline {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::memory::MemoryStore;
    use serde_json::json;

    fn object(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    fn setup() -> (ObserverPipeline, Arc<dyn DocumentStore>) {
        (ObserverPipeline::with_defaults(), Arc::new(MemoryStore::new()))
    }

    #[tokio::test]
    async fn create_runs_validation_before_the_store() {
        let (pipeline, store) = setup();
        let err = pipeline
            .create(store.clone(), Collection::CompanyFinancials, object(json!({ "companyId": "c1", "net_worth": -5 })))
            .await
            .unwrap_err();
        assert!(matches!(err, ObserverError::InvalidField { ref field, .. } if field == "net_worth"));

        let stored = store.list("company_financials", &FilterData::new()).await.unwrap();
        assert!(stored.is_empty());
    }

    #[tokio::test]
    async fn update_merges_and_rechecks_bounds() {
        let (pipeline, store) = setup();
        let created = pipeline
            .create(
                store.clone(),
                Collection::Projects,
                object(json!({ "companyId": "c1", "project_name": "Plant A", "start_year": 2025 })),
            )
            .await
            .unwrap();

        let err = pipeline
            .update(store.clone(), Collection::Projects, &created.id, object(json!({ "completion_year": 2020 })))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Start year cannot be after completion year");

        let updated = pipeline
            .update(store, Collection::Projects, &created.id, object(json!({ "completion_year": 2030 })))
            .await
            .unwrap();
        assert_eq!(updated.get_str("project_name"), Some("Plant A"));
        assert_eq!(updated.data["completion_year"], 2030);
    }

    #[tokio::test]
    async fn subsidies_are_stored_encoded() {
        let (pipeline, store) = setup();
        let created = pipeline
            .create(
                store.clone(),
                Collection::Subsidies,
                object(json!({
                    "name": "H2 Grant", "country": "DE", "programType": "grant", "status": "open",
                    "incentiveDetails": { "type": "grant", "amount": 1000000, "currency": "EUR" }
                })),
            )
            .await
            .unwrap();
        assert!(created.data["incentiveDetails"].is_string());

        // Partial update keeps the stored string valid
        let updated = pipeline
            .update(store, Collection::Subsidies, &created.id, object(json!({ "status": "closed" })))
            .await
            .unwrap();
        let details: Value = serde_json::from_str(updated.data["incentiveDetails"].as_str().unwrap()).unwrap();
        assert_eq!(details["amount"], 1000000);
    }

    #[tokio::test]
    async fn update_rechecks_required_fields_on_merged_record() {
        let (pipeline, store) = setup();
        let financials = pipeline
            .create(store.clone(), Collection::CompanyFinancials, object(json!({ "companyId": "c1" })))
            .await
            .unwrap();

        let err = pipeline
            .update(store.clone(), Collection::CompanyFinancials, &financials.id, object(json!({ "companyId": null })))
            .await
            .unwrap_err();
        assert!(matches!(err, ObserverError::InvalidField { ref field, .. } if field == "companyId"));

        // The parent link survived, so a second record for c1 still conflicts
        let err = pipeline
            .create(store.clone(), Collection::CompanyFinancials, object(json!({ "companyId": "c1" })))
            .await
            .unwrap_err();
        assert!(matches!(err, ObserverError::Conflict(_)));

        let profile = pipeline
            .create(
                store.clone(),
                Collection::CompanyProfiles,
                object(json!({ "userId": "u1", "company_name": "H2 Co" })),
            )
            .await
            .unwrap();
        let err = pipeline
            .update(store, Collection::CompanyProfiles, &profile.id, object(json!({ "company_name": "  " })))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Company name is required");
    }

    #[tokio::test]
    async fn subsidy_update_requires_complete_incentive_details() {
        let (pipeline, store) = setup();
        let created = pipeline
            .create(
                store.clone(),
                Collection::Subsidies,
                object(json!({
                    "name": "H2 Grant", "country": "DE", "programType": "grant", "status": "open",
                    "incentiveDetails": { "type": "grant", "amount": 1000000, "currency": "EUR" }
                })),
            )
            .await
            .unwrap();

        let err = pipeline
            .update(
                store.clone(),
                Collection::Subsidies,
                &created.id,
                object(json!({ "incentiveDetails": { "type": "grant" } })),
            )
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Incentive details amount is required");

        let stored = store.get("subsidies", &created.id).await.unwrap().unwrap();
        let details: Value = serde_json::from_str(stored.data["incentiveDetails"].as_str().unwrap()).unwrap();
        assert_eq!(details["currency"], "EUR");
    }

    #[tokio::test]
    async fn plain_text_encoded_fields_do_not_block_updates() {
        let (pipeline, store) = setup();
        let seeded = store
            .create(
                "subsidies",
                object(json!({
                    "name": "H2 Grant", "country": "DE", "programType": "grant", "status": "open",
                    "incentiveDetails": "{\"type\":\"grant\",\"amount\":10,\"currency\":\"EUR\"}",
                    "eligibility": "Open to EU SMEs"
                })),
            )
            .await
            .unwrap();

        let updated = pipeline
            .update(store, Collection::Subsidies, &seeded.id, object(json!({ "status": "closed" })))
            .await
            .unwrap();
        assert_eq!(updated.get_str("status"), Some("closed"));
        assert_eq!(updated.get_str("eligibility"), Some("Open to EU SMEs"));
    }

    #[tokio::test]
    async fn delete_and_select_missing_documents() {
        let (pipeline, store) = setup();
        let err = pipeline.delete(store.clone(), Collection::Subsidies, "missing").await.unwrap_err();
        assert!(matches!(err, ObserverError::NotFound(_)));

        let found = pipeline.select_id(store, Collection::Subsidies, "missing").await.unwrap();
        assert!(found.is_none());
    }
}
