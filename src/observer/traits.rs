use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::collections::Collection;
use crate::observer::context::ObserverContext;
use crate::observer::error::ObserverError;

/// Observer rings with semantic meaning - synchronous (0-6) and post-commit (7)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum ObserverRing {
    DataPreparation = 0, // Load existing document, merge updates, decode nested fields
    InputValidation = 1, // Required fields, numeric bounds, field relations
    Business = 3,        // One-per-parent rules
    Enrichment = 4,      // Encode nested fields for storage
    Database = 5,        // Store execution
    Audit = 7,           // Change logging after commit
}

impl ObserverRing {
    /// Rings that run before the store and may abort the operation
    pub fn is_synchronous(&self) -> bool {
        (*self as u8) <= 6
    }

    /// Get all rings for an operation type
    pub fn for_operation(operation: &Operation) -> Vec<Self> {
        use ObserverRing::*;

        match operation {
            Operation::Select => vec![Database],
            Operation::Delete => vec![DataPreparation, Database, Audit],
            Operation::Create | Operation::Update => vec![
                DataPreparation, InputValidation, Business, Enrichment, Database, Audit,
            ],
        }
    }
}

/// Document operations supported by the observer system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operation {
    Create,
    Update,
    Delete,
    Select,
}

impl Operation {
    pub fn is_write(&self) -> bool {
        !matches!(self, Operation::Select)
    }
}

/// A pipeline stage with metadata and applicability checks
#[async_trait]
pub trait Observer: Send + Sync {
    /// Observer name for logging and debugging
    fn name(&self) -> &'static str;

    /// Which ring this observer belongs to
    fn ring(&self) -> ObserverRing;

    fn applies_to_operation(&self, op: Operation) -> bool;

    fn applies_to_collection(&self, collection: Collection) -> bool;

    /// Execution timeout (default 5 seconds)
    fn timeout(&self) -> Duration {
        Duration::from_secs(5)
    }

    /// Priority within ring (lower numbers execute first)
    fn priority(&self) -> u8 {
        50
    }

    async fn execute(&self, ctx: &mut ObserverContext) -> Result<(), ObserverError>;
}
