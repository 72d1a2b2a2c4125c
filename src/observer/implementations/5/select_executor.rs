// Ring 5: Select Executor - handles SELECT operations
use async_trait::async_trait;
use std::time::Duration;

use crate::collections::Collection;
use crate::observer::context::ObserverContext;
use crate::observer::error::ObserverError;
use crate::observer::traits::{Observer, ObserverRing, Operation};

/// Reads by id when the context carries one, otherwise lists with the filter
#[derive(Default)]
pub struct SelectExecutor;

#[async_trait]
impl Observer for SelectExecutor {
    fn name(&self) -> &'static str {
        "SelectExecutor"
    }

    fn ring(&self) -> ObserverRing {
        ObserverRing::Database
    }

    fn applies_to_operation(&self, op: Operation) -> bool {
        op == Operation::Select
    }

    fn applies_to_collection(&self, _collection: Collection) -> bool {
        true
    }

    /// Remote round trips are bounded by the HTTP client timeout instead
    fn timeout(&self) -> Duration {
        Duration::from_secs(60)
    }

    async fn execute(&self, ctx: &mut ObserverContext) -> Result<(), ObserverError> {
        let query_start = std::time::Instant::now();

        ctx.result = match &ctx.id {
            Some(id) => ctx.store.get(ctx.collection.id(), id).await?.into_iter().collect(),
            None => {
                let filter_data = ctx.filter_data.clone().unwrap_or_default();
                ctx.store.list(ctx.collection.id(), &filter_data).await?
            }
        };

        tracing::debug!(
            "SELECT {} returned {} documents in {:?}",
            ctx.collection,
            ctx.result.len(),
            query_start.elapsed()
        );
        Ok(())
    }
}
