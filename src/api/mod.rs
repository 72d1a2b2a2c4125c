pub mod format;

pub use format::{document_to_api_value, documents_to_api_values};
