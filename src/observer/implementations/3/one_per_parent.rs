// Ring 3: Business Logic - at most one document per unique key
use async_trait::async_trait;

use crate::collections::Collection;
use crate::database::document::value_text;
use crate::filter::FilterData;
use crate::observer::context::ObserverContext;
use crate::observer::error::ObserverError;
use crate::observer::traits::{Observer, ObserverRing, Operation};

/// Check-then-create: looks for another document holding the same key value.
/// Two concurrent creates can both pass; the store has no constraint behind this.
#[derive(Default)]
pub struct OnePerParentObserver;

#[async_trait]
impl Observer for OnePerParentObserver {
    fn name(&self) -> &'static str {
        "OnePerParentObserver"
    }

    fn ring(&self) -> ObserverRing {
        ObserverRing::Business
    }

    fn applies_to_operation(&self, op: Operation) -> bool {
        matches!(op, Operation::Create | Operation::Update)
    }

    fn applies_to_collection(&self, collection: Collection) -> bool {
        collection.unique_key().is_some()
    }

    async fn execute(&self, ctx: &mut ObserverContext) -> Result<(), ObserverError> {
        let Some(key) = ctx.collection.unique_key() else {
            return Ok(());
        };
        let Some(value) = ctx.field(key).and_then(value_text) else {
            return Ok(());
        };

        // Unchanged key on update cannot collide with anything new
        if let Some(existing) = &ctx.existing {
            if existing.data.get(key).and_then(value_text).as_deref() == Some(value.as_str()) {
                return Ok(());
            }
        }

        let filter = FilterData::eq(key, value.clone()).with_limit(2);
        let holders = ctx.store.list(ctx.collection.id(), &filter).await?;
        let own_id = ctx.id.as_deref();

        if holders.iter().any(|doc| Some(doc.id.as_str()) != own_id) {
            return Err(ObserverError::Conflict(format!(
                "{} already exists for {} '{}'",
                ctx.collection.label(),
                key,
                value
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::memory::MemoryStore;
    use crate::database::store::DocumentStore;
    use serde_json::json;
    use std::sync::Arc;

    #[tokio::test]
    async fn second_child_for_same_parent_conflicts() {
        let store: Arc<dyn DocumentStore> = Arc::new(MemoryStore::new());
        let data = json!({ "companyId": "c1", "annual_revenue": 10 });
        store
            .create(Collection::CompanyFinancials.id(), data.as_object().cloned().unwrap())
            .await
            .unwrap();

        let mut ctx = ObserverContext::new(Operation::Create, Collection::CompanyFinancials, store.clone())
            .with_changes(data.as_object().cloned().unwrap());
        let err = OnePerParentObserver.execute(&mut ctx).await.unwrap_err();
        assert!(matches!(err, ObserverError::Conflict(_)));

        let other = json!({ "companyId": "c2" });
        let mut ctx = ObserverContext::new(Operation::Create, Collection::CompanyFinancials, store)
            .with_changes(other.as_object().cloned().unwrap());
        assert!(OnePerParentObserver.execute(&mut ctx).await.is_ok());
    }

    #[tokio::test]
    async fn moving_a_profile_onto_a_taken_user_conflicts() {
        let store: Arc<dyn DocumentStore> = Arc::new(MemoryStore::new());
        let taken = json!({ "userId": "u1", "company_name": "A" });
        store
            .create(Collection::CompanyProfiles.id(), taken.as_object().cloned().unwrap())
            .await
            .unwrap();
        let mine = store
            .create(
                Collection::CompanyProfiles.id(),
                json!({ "userId": "u2", "company_name": "B" }).as_object().cloned().unwrap(),
            )
            .await
            .unwrap();

        let mut ctx = ObserverContext::new(Operation::Update, Collection::CompanyProfiles, store.clone())
            .with_id(mine.id.clone())
            .with_changes(json!({ "userId": "u1" }).as_object().cloned().unwrap());
        ctx.existing = Some(mine.clone());
        assert!(OnePerParentObserver.execute(&mut ctx).await.is_err());

        let mut ctx = ObserverContext::new(Operation::Update, Collection::CompanyProfiles, store)
            .with_id(mine.id.clone())
            .with_changes(json!({ "userId": "u2", "company_name": "B2" }).as_object().cloned().unwrap());
        ctx.existing = Some(mine);
        assert!(OnePerParentObserver.execute(&mut ctx).await.is_ok());
    }
}
