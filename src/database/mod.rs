pub mod document;
pub mod manager;
pub mod memory;
pub mod postgres;
pub mod remote;
pub mod repository;
pub mod store;

pub use document::Document;
pub use manager::{DatabaseError, DatabaseManager};
pub use repository::Repository;
pub use store::DocumentStore;
