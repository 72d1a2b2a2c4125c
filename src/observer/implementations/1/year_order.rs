// Ring 1: Input Validation - project timeline
use async_trait::async_trait;

use crate::collections::Collection;
use crate::observer::context::ObserverContext;
use crate::observer::error::ObserverError;
use crate::observer::traits::{Observer, ObserverRing, Operation};

#[derive(Default)]
pub struct YearOrderObserver;

#[async_trait]
impl Observer for YearOrderObserver {
    fn name(&self) -> &'static str {
        "YearOrderObserver"
    }

    fn ring(&self) -> ObserverRing {
        ObserverRing::InputValidation
    }

    fn applies_to_operation(&self, op: Operation) -> bool {
        matches!(op, Operation::Create | Operation::Update)
    }

    fn applies_to_collection(&self, collection: Collection) -> bool {
        collection == Collection::Projects
    }

    fn priority(&self) -> u8 {
        30
    }

    async fn execute(&self, ctx: &mut ObserverContext) -> Result<(), ObserverError> {
        if let (Some(start), Some(completion)) = (ctx.field_f64("start_year"), ctx.field_f64("completion_year")) {
            if start > completion {
                return Err(ObserverError::invalid_field(
                    "start_year",
                    "Start year cannot be after completion year",
                ));
            }
        }
        Ok(())
    }
}
