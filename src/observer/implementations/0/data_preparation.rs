// Ring 0: Data Preparation - loads the stored document and merges updates
use async_trait::async_trait;

use crate::collections::Collection;
use crate::observer::context::ObserverContext;
use crate::observer::error::ObserverError;
use crate::observer::traits::{Observer, ObserverRing, Operation};

/// Loads the target document for UPDATE and DELETE; unknown ids become 404.
/// For UPDATE the working record becomes stored fields overlaid with the changes.
#[derive(Default)]
pub struct DataPreparationObserver;

#[async_trait]
impl Observer for DataPreparationObserver {
    fn name(&self) -> &'static str {
        "DataPreparationObserver"
    }

    fn ring(&self) -> ObserverRing {
        ObserverRing::DataPreparation
    }

    fn applies_to_operation(&self, op: Operation) -> bool {
        matches!(op, Operation::Update | Operation::Delete)
    }

    fn applies_to_collection(&self, _collection: Collection) -> bool {
        true
    }

    fn priority(&self) -> u8 {
        10
    }

    async fn execute(&self, ctx: &mut ObserverContext) -> Result<(), ObserverError> {
        let id = ctx
            .id
            .clone()
            .ok_or_else(|| ObserverError::ValidationError("Document ID is required".to_string()))?;

        let existing = ctx
            .store
            .get(ctx.collection.id(), &id)
            .await?
            .ok_or_else(|| ObserverError::NotFound(format!("{} not found", ctx.collection.label())))?;

        if ctx.operation == Operation::Update {
            let mut merged = existing.data.clone();
            for (key, value) in &ctx.changes {
                merged.insert(key.clone(), value.clone());
            }
            ctx.record = merged;
        }

        ctx.existing = Some(existing);
        Ok(())
    }
}
