use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use sqlx::types::Json;
use sqlx::{postgres::PgPoolOptions, FromRow, PgPool};
use std::time::Duration;
use tracing::info;

use crate::config::{DatabaseConfig, StoreKind};
use crate::database::document::{generate_id, Document};
use crate::database::manager::DatabaseError;
use crate::database::store::DocumentStore;
use crate::filter::{Filter, FilterData};

const SCHEMA_SQL: &[&str] = &[
    r#"CREATE TABLE IF NOT EXISTS documents (
        id TEXT PRIMARY KEY,
        collection TEXT NOT NULL,
        data JSONB NOT NULL DEFAULT '{}'::jsonb,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
    )"#,
    "CREATE INDEX IF NOT EXISTS documents_collection_created_idx ON documents (collection, created_at, id)",
];

#[derive(Debug, FromRow)]
struct DocumentRow {
    id: String,
    collection: String,
    data: Json<Map<String, Value>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<DocumentRow> for Document {
    fn from(row: DocumentRow) -> Self {
        Document {
            id: row.id,
            collection: row.collection,
            created_at: row.created_at,
            updated_at: row.updated_at,
            data: row.data.0,
        }
    }
}

/// Documents as JSONB rows in a single `documents` table
#[derive(Clone)]
pub struct PostgresStore {
    pool: PgPool,
    log_queries: bool,
}

impl PostgresStore {
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, DatabaseError> {
        let url = config
            .url
            .as_deref()
            .ok_or(DatabaseError::ConfigMissing("DATABASE_URL"))?;
        url::Url::parse(url).map_err(|_| DatabaseError::InvalidDatabaseUrl)?;

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout))
            .connect(url)
            .await?;

        let store = Self { pool, log_queries: config.enable_query_logging };
        store.ensure_schema().await?;
        info!("Connected Postgres document store");
        Ok(store)
    }

    pub async fn ensure_schema(&self) -> Result<(), DatabaseError> {
        for statement in SCHEMA_SQL {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        Ok(())
    }

    fn build_filter(collection: &str, filter_data: &FilterData) -> Result<Filter, DatabaseError> {
        let mut filter = Filter::new(collection).map_err(|e| DatabaseError::QueryError(e.to_string()))?;
        filter
            .assign(filter_data.clone())
            .map_err(|e| DatabaseError::QueryError(e.to_string()))?;
        Ok(filter)
    }
}

#[async_trait]
impl DocumentStore for PostgresStore {
    fn kind(&self) -> StoreKind {
        StoreKind::Postgres
    }

    async fn create(&self, collection: &str, data: Map<String, Value>) -> Result<Document, DatabaseError> {
        let row: DocumentRow = sqlx::query_as(
            "INSERT INTO documents (id, collection, data) VALUES ($1, $2, $3) \
             RETURNING id, collection, data, created_at, updated_at",
        )
        .bind(generate_id())
        .bind(collection)
        .bind(Json(data))
        .fetch_one(&self.pool)
        .await?;
        Ok(row.into())
    }

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, DatabaseError> {
        let row: Option<DocumentRow> = sqlx::query_as(
            "SELECT id, collection, data, created_at, updated_at FROM documents \
             WHERE collection = $1 AND id = $2",
        )
        .bind(collection)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Document::from))
    }

    async fn list(&self, collection: &str, filter_data: &FilterData) -> Result<Vec<Document>, DatabaseError> {
        let sql = Self::build_filter(collection, filter_data)?.to_sql();
        if self.log_queries {
            tracing::debug!("SQL: {} params={:?}", sql.query, sql.params);
        }
        let mut q = sqlx::query_as::<_, DocumentRow>(&sql.query);
        for p in &sql.params {
            q = q.bind(p);
        }
        let rows = q.fetch_all(&self.pool).await?;
        Ok(rows.into_iter().map(Document::from).collect())
    }

    async fn update(
        &self,
        collection: &str,
        id: &str,
        data: Map<String, Value>,
    ) -> Result<Option<Document>, DatabaseError> {
        let row: Option<DocumentRow> = sqlx::query_as(
            "UPDATE documents SET data = $3, updated_at = now() \
             WHERE collection = $1 AND id = $2 \
             RETURNING id, collection, data, created_at, updated_at",
        )
        .bind(collection)
        .bind(id)
        .bind(Json(data))
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Document::from))
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<bool, DatabaseError> {
        let result = sqlx::query("DELETE FROM documents WHERE collection = $1 AND id = $2")
            .bind(collection)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn ping(&self) -> Result<(), DatabaseError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
