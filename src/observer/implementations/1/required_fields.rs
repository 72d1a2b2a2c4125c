// Ring 1: Input Validation - required fields on create and on the merged update
use async_trait::async_trait;
use serde_json::Value;

use crate::collections::{humanize, Collection, FieldKind};
use crate::observer::context::ObserverContext;
use crate::observer::error::ObserverError;
use crate::observer::traits::{Observer, ObserverRing, Operation};

/// Required text must be a non-blank string; required numbers must be JSON numbers.
#[derive(Default)]
pub struct RequiredFieldsObserver;

#[async_trait]
impl Observer for RequiredFieldsObserver {
    fn name(&self) -> &'static str {
        "RequiredFieldsObserver"
    }

    fn ring(&self) -> ObserverRing {
        ObserverRing::InputValidation
    }

    fn applies_to_operation(&self, op: Operation) -> bool {
        matches!(op, Operation::Create | Operation::Update)
    }

    fn applies_to_collection(&self, collection: Collection) -> bool {
        !collection.required_fields().is_empty()
    }

    fn priority(&self) -> u8 {
        10
    }

    async fn execute(&self, ctx: &mut ObserverContext) -> Result<(), ObserverError> {
        for required in ctx.collection.required_fields() {
            let value = ctx.field(required.name);
            let present = match (required.kind, value) {
                (FieldKind::Text, Some(Value::String(s))) => !s.trim().is_empty(),
                (FieldKind::Number, Some(Value::Number(_))) => true,
                (_, None) | (_, Some(Value::Null)) => false,
                (FieldKind::Text, Some(_)) => false,
                (FieldKind::Number, Some(_)) => {
                    return Err(ObserverError::invalid_field(
                        required.name,
                        format!("{} must be a number", humanize(required.name)),
                    ));
                }
            };

            if !present {
                return Err(ObserverError::invalid_field(
                    required.name,
                    format!("{} is required", humanize(required.name)),
                ));
            }
        }
        Ok(())
    }
}
