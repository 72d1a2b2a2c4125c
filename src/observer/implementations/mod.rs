// Observer implementations organized by rings
// Each ring handles a specific phase of document processing

use crate::observer::pipeline::ObserverPipeline;

// Ring 0: Data Preparation - load existing data, merge updates, decode nested fields
#[path = "0/data_preparation.rs"]
pub mod data_preparation;
#[path = "0/nested_json_decoder.rs"]
pub mod nested_json_decoder;

// Ring 1: Input Validation
#[path = "1/numeric_bounds.rs"]
pub mod numeric_bounds;
#[path = "1/required_fields.rs"]
pub mod required_fields;
#[path = "1/year_order.rs"]
pub mod year_order;

// Ring 3: Business Logic
#[path = "3/one_per_parent.rs"]
pub mod one_per_parent;

// Ring 4: Enrichment
#[path = "4/nested_json_encoder.rs"]
pub mod nested_json_encoder;

// Ring 5: Database - store execution
#[path = "5/document_executor.rs"]
pub mod document_executor;
#[path = "5/select_executor.rs"]
pub mod select_executor;

// Ring 7: Audit
#[path = "7/audit_log.rs"]
pub mod audit_log;

pub use audit_log::*;
pub use data_preparation::*;
pub use document_executor::*;
pub use nested_json_decoder::*;
pub use nested_json_encoder::*;
pub use numeric_bounds::*;
pub use one_per_parent::*;
pub use required_fields::*;
pub use select_executor::*;
pub use year_order::*;

/// Register every built-in observer on a pipeline
pub fn register_default_observers(pipeline: &mut ObserverPipeline) {
    pipeline.register_observer(Box::new(DataPreparationObserver));
    pipeline.register_observer(Box::new(NestedJsonDecoder));
    pipeline.register_observer(Box::new(RequiredFieldsObserver));
    pipeline.register_observer(Box::new(NumericBoundsObserver));
    pipeline.register_observer(Box::new(YearOrderObserver));
    pipeline.register_observer(Box::new(OnePerParentObserver));
    pipeline.register_observer(Box::new(NestedJsonEncoder));
    pipeline.register_observer(Box::new(SelectExecutor));
    pipeline.register_observer(Box::new(DocumentExecutor));
    pipeline.register_observer(Box::new(AuditLogObserver));

    tracing::debug!("Registered {} default observers", pipeline.observer_count());
}
