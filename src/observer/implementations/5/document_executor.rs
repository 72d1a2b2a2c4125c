// Ring 5: Document Executor - handles CREATE, UPDATE and DELETE
use async_trait::async_trait;
use std::time::Duration;

use crate::collections::Collection;
use crate::observer::context::ObserverContext;
use crate::observer::error::ObserverError;
use crate::observer::traits::{Observer, ObserverRing, Operation};

/// Writes the prepared record to the store. DELETE leaves the removed
/// document in the result so callers can report what went away.
#[derive(Default)]
pub struct DocumentExecutor;

impl DocumentExecutor {
    fn target_id(ctx: &ObserverContext) -> Result<String, ObserverError> {
        ctx.id
            .clone()
            .ok_or_else(|| ObserverError::ValidationError("Document ID is required".to_string()))
    }

    fn not_found(ctx: &ObserverContext) -> ObserverError {
        ObserverError::NotFound(format!("{} not found", ctx.collection.label()))
    }
}

#[async_trait]
impl Observer for DocumentExecutor {
    fn name(&self) -> &'static str {
        "DocumentExecutor"
    }

    fn ring(&self) -> ObserverRing {
        ObserverRing::Database
    }

    fn applies_to_operation(&self, op: Operation) -> bool {
        op.is_write()
    }

    fn applies_to_collection(&self, _collection: Collection) -> bool {
        true
    }

    /// Remote round trips are bounded by the HTTP client timeout instead
    fn timeout(&self) -> Duration {
        Duration::from_secs(60)
    }

    async fn execute(&self, ctx: &mut ObserverContext) -> Result<(), ObserverError> {
        let collection = ctx.collection.id();

        let document = match ctx.operation {
            Operation::Create => ctx.store.create(collection, ctx.record.clone()).await?,
            Operation::Update => {
                let id = Self::target_id(ctx)?;
                ctx.store
                    .update(collection, &id, ctx.record.clone())
                    .await?
                    .ok_or_else(|| Self::not_found(ctx))?
            }
            Operation::Delete => {
                let id = Self::target_id(ctx)?;
                if !ctx.store.delete(collection, &id).await? {
                    return Err(Self::not_found(ctx));
                }
                ctx.existing.clone().ok_or_else(|| Self::not_found(ctx))?
            }
            Operation::Select => return Ok(()),
        };

        tracing::debug!("{:?} {} {}", ctx.operation, collection, document.id);
        ctx.result = vec![document];
        Ok(())
    }
}
