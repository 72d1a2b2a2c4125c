// Ring 0: parse nested fields that arrive (or are stored) as JSON strings
use async_trait::async_trait;
use serde_json::Value;

use crate::collections::Collection;
use crate::observer::context::ObserverContext;
use crate::observer::error::ObserverError;
use crate::observer::traits::{Observer, ObserverRing, Operation};

/// Normalises encoded fields to objects so validation sees one shape.
/// Runs after `DataPreparationObserver` so merged stored strings are decoded too.
/// Strings that are not JSON objects or arrays stay as they are; the encoder
/// stores them unchanged and reads return them as strings.
#[derive(Default)]
pub struct NestedJsonDecoder;

#[async_trait]
impl Observer for NestedJsonDecoder {
    fn name(&self) -> &'static str {
        "NestedJsonDecoder"
    }

    fn ring(&self) -> ObserverRing {
        ObserverRing::DataPreparation
    }

    fn applies_to_operation(&self, op: Operation) -> bool {
        matches!(op, Operation::Create | Operation::Update)
    }

    fn applies_to_collection(&self, collection: Collection) -> bool {
        !collection.encoded_fields().is_empty()
    }

    fn priority(&self) -> u8 {
        20
    }

    async fn execute(&self, ctx: &mut ObserverContext) -> Result<(), ObserverError> {
        for field in ctx.collection.encoded_fields() {
            let Some(Value::String(raw)) = ctx.record.get(*field) else {
                continue;
            };
            if let Ok(parsed @ (Value::Object(_) | Value::Array(_))) = serde_json::from_str::<Value>(raw) {
                ctx.record.insert(field.to_string(), parsed);
            }
        }
        Ok(())
    }
}
