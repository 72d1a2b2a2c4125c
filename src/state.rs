use std::sync::Arc;

use crate::collections::Collection;
use crate::database::{DocumentStore, Repository};
use crate::observer::ObserverPipeline;

/// Shared handles every request works with
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn DocumentStore>,
    pub pipeline: Arc<ObserverPipeline>,
}

impl AppState {
    /// State with the default observer pipeline
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            store,
            pipeline: Arc::new(ObserverPipeline::with_defaults()),
        }
    }

    pub fn repository(&self, collection: Collection) -> Repository {
        Repository::new(collection, self)
    }
}
