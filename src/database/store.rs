use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::config::StoreKind;
use crate::database::document::Document;
use crate::database::manager::DatabaseError;
use crate::filter::FilterData;

/// CRUD over named document collections.
///
/// Implementations never enforce uniqueness or cascades; both live in the
/// observer pipeline and the services above it.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    fn kind(&self) -> StoreKind;

    /// Insert a document and return it with its generated id and timestamps
    async fn create(&self, collection: &str, data: Map<String, Value>) -> Result<Document, DatabaseError>;

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, DatabaseError>;

    /// Documents matching every equality condition, oldest first
    async fn list(&self, collection: &str, filter: &FilterData) -> Result<Vec<Document>, DatabaseError>;

    /// Replace the document's fields; `None` when the id is unknown
    async fn update(
        &self,
        collection: &str,
        id: &str,
        data: Map<String, Value>,
    ) -> Result<Option<Document>, DatabaseError>;

    /// `false` when nothing was deleted
    async fn delete(&self, collection: &str, id: &str) -> Result<bool, DatabaseError>;

    async fn ping(&self) -> Result<(), DatabaseError>;
}
