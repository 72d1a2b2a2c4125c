// Ring 4: Enrichment - store nested objects as JSON strings
use async_trait::async_trait;
use serde_json::Value;

use crate::collections::Collection;
use crate::observer::context::ObserverContext;
use crate::observer::error::ObserverError;
use crate::observer::traits::{Observer, ObserverRing, Operation};

/// The hosted document store only holds flat attributes, so nested
/// objects are written as strings and parsed again on the way out.
#[derive(Default)]
pub struct NestedJsonEncoder;

#[async_trait]
impl Observer for NestedJsonEncoder {
    fn name(&self) -> &'static str {
        "NestedJsonEncoder"
    }

    fn ring(&self) -> ObserverRing {
        ObserverRing::Enrichment
    }

    fn applies_to_operation(&self, op: Operation) -> bool {
        matches!(op, Operation::Create | Operation::Update)
    }

    fn applies_to_collection(&self, collection: Collection) -> bool {
        !collection.encoded_fields().is_empty()
    }

    async fn execute(&self, ctx: &mut ObserverContext) -> Result<(), ObserverError> {
        for field in ctx.collection.encoded_fields() {
            if let Some(value @ (Value::Object(_) | Value::Array(_))) = ctx.record.get(*field) {
                let encoded = Value::String(value.to_string());
                ctx.record.insert(field.to_string(), encoded);
            }
        }
        Ok(())
    }
}
