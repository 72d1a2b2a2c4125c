use std::sync::Arc;
use thiserror::Error;
use tracing::info;

use crate::config::{AppConfig, StoreKind};
use crate::database::memory::MemoryStore;
use crate::database::postgres::PostgresStore;
use crate::database::remote::RemoteStore;
use crate::database::store::DocumentStore;

/// Errors raised by any document store backend
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Missing configuration: {0}")]
    ConfigMissing(&'static str),

    #[error("Invalid database URL")]
    InvalidDatabaseUrl,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Query error: {0}")]
    QueryError(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid response from document database: {0}")]
    InvalidResponse(String),

    #[error("Document database returned {status}: {message}")]
    Remote { status: u16, message: String },

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Builds the configured document store
pub struct DatabaseManager;

impl DatabaseManager {
    pub async fn connect(config: &AppConfig) -> Result<Arc<dyn DocumentStore>, DatabaseError> {
        let store: Arc<dyn DocumentStore> = match config.database.store {
            StoreKind::Remote => Arc::new(RemoteStore::new(
                &config.remote,
                config.database.connection_timeout,
            )?),
            StoreKind::Postgres => Arc::new(PostgresStore::connect(&config.database).await?),
            StoreKind::Memory => {
                tracing::warn!("Using in-memory document store; data is lost on restart");
                Arc::new(MemoryStore::new())
            }
        };
        info!("Document store ready: {:?}", store.kind());
        Ok(store)
    }

    /// Pings the store to ensure connectivity
    pub async fn health_check(store: &dyn DocumentStore) -> Result<(), DatabaseError> {
        store.ping().await
    }
}
