// Ring 1: Input Validation - numeric ranges
use async_trait::async_trait;
use serde_json::Value;

use crate::collections::{humanize, Collection, NumericBound};
use crate::observer::context::ObserverContext;
use crate::observer::error::ObserverError;
use crate::observer::traits::{Observer, ObserverRing, Operation};

/// Checks every bounded field that is present on the working record.
/// On update the record is already merged, so stored values are checked too.
#[derive(Default)]
pub struct NumericBoundsObserver;

impl NumericBoundsObserver {
    fn check(bound: &NumericBound, value: &Value) -> Result<(), ObserverError> {
        let label = humanize(bound.field);
        let Some(number) = value.as_f64() else {
            return Err(ObserverError::invalid_field(bound.field, format!("{} must be a number", label)));
        };

        match bound.max {
            Some(max) if number < bound.min || number > max => Err(ObserverError::invalid_field(
                bound.field,
                format!("{} must be between {} and {}", label, bound.min, max),
            )),
            None if number < bound.min => {
                let message = if bound.min == 0.0 {
                    format!("{} cannot be negative", label)
                } else {
                    format!("{} must be at least {}", label, bound.min)
                };
                Err(ObserverError::invalid_field(bound.field, message))
            }
            _ => Ok(()),
        }
    }
}

#[async_trait]
impl Observer for NumericBoundsObserver {
    fn name(&self) -> &'static str {
        "NumericBoundsObserver"
    }

    fn ring(&self) -> ObserverRing {
        ObserverRing::InputValidation
    }

    fn applies_to_operation(&self, op: Operation) -> bool {
        matches!(op, Operation::Create | Operation::Update)
    }

    fn applies_to_collection(&self, collection: Collection) -> bool {
        !collection.numeric_bounds().is_empty()
    }

    fn priority(&self) -> u8 {
        20
    }

    async fn execute(&self, ctx: &mut ObserverContext) -> Result<(), ObserverError> {
        for bound in ctx.collection.numeric_bounds() {
            match ctx.field(bound.field) {
                None | Some(Value::Null) => continue,
                Some(value) => Self::check(bound, value)?,
            }
        }
        Ok(())
    }
}
