// Ring 7: Audit - change log after commit
use async_trait::async_trait;

use crate::collections::Collection;
use crate::observer::context::ObserverContext;
use crate::observer::error::ObserverError;
use crate::observer::traits::{Observer, ObserverRing, Operation};

#[derive(Default)]
pub struct AuditLogObserver;

#[async_trait]
impl Observer for AuditLogObserver {
    fn name(&self) -> &'static str {
        "AuditLogObserver"
    }

    fn ring(&self) -> ObserverRing {
        ObserverRing::Audit
    }

    fn applies_to_operation(&self, op: Operation) -> bool {
        op.is_write()
    }

    fn applies_to_collection(&self, _collection: Collection) -> bool {
        true
    }

    async fn execute(&self, ctx: &mut ObserverContext) -> Result<(), ObserverError> {
        for document in &ctx.result {
            let mut fields: Vec<&str> = ctx.changes.keys().map(String::as_str).collect();
            fields.sort_unstable();

            tracing::info!(
                target: "trustchain::audit",
                operation = ?ctx.operation,
                collection = %ctx.collection,
                id = %document.id,
                fields = ?fields,
                elapsed = ?ctx.execution_time(),
                "document changed"
            );
        }
        Ok(())
    }
}
