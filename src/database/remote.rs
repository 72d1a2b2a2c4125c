use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{header, Client, Method, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

use crate::config::{RemoteConfig, StoreKind};
use crate::database::document::{generate_id, Document, SYSTEM_PREFIX};
use crate::database::manager::DatabaseError;
use crate::database::store::DocumentStore;
use crate::filter::{Filter, FilterData};

const PROJECT_HEADER: &str = "x-appwrite-project";
const KEY_HEADER: &str = "x-appwrite-key";

/// Page size used when a listing asks for every matching document
const PAGE_SIZE: i32 = 100;

#[derive(Debug, Deserialize)]
struct DocumentList {
    #[serde(default)]
    documents: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct RemoteErrorBody {
    message: Option<String>,
}

/// Client for the hosted document database REST API
#[derive(Clone)]
pub struct RemoteStore {
    client: Client,
    endpoint: Url,
    database_id: String,
}

impl RemoteStore {
    pub fn new(config: &RemoteConfig, timeout_secs: u64) -> Result<Self, DatabaseError> {
        let endpoint = config
            .endpoint
            .as_deref()
            .ok_or(DatabaseError::ConfigMissing("TRUSTCHAIN_DB_ENDPOINT"))?;
        let project_id = config
            .project_id
            .as_deref()
            .ok_or(DatabaseError::ConfigMissing("TRUSTCHAIN_DB_PROJECT_ID"))?;
        let api_key = config
            .api_key
            .as_deref()
            .ok_or(DatabaseError::ConfigMissing("TRUSTCHAIN_DB_API_KEY"))?;

        let mut endpoint = Url::parse(endpoint).map_err(|_| DatabaseError::InvalidDatabaseUrl)?;
        if !endpoint.path().ends_with('/') {
            let path = format!("{}/", endpoint.path());
            endpoint.set_path(&path);
        }

        let mut headers = header::HeaderMap::new();
        headers.insert(
            PROJECT_HEADER,
            header::HeaderValue::from_str(project_id)
                .map_err(|_| DatabaseError::InvalidConfig("invalid project id".into()))?,
        );
        let mut key = header::HeaderValue::from_str(api_key)
            .map_err(|_| DatabaseError::InvalidConfig("invalid api key".into()))?;
        key.set_sensitive(true);
        headers.insert(KEY_HEADER, key);

        let client = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;

        info!("Using hosted document database at {}", endpoint);
        Ok(Self { client, endpoint, database_id: config.database_id.clone() })
    }

    fn documents_url(&self, collection: &str, id: Option<&str>) -> Result<Url, DatabaseError> {
        let mut path = format!(
            "databases/{}/collections/{}/documents",
            self.database_id, collection
        );
        if let Some(id) = id {
            path.push('/');
            path.push_str(id);
        }
        self.endpoint
            .join(&path)
            .map_err(|e| DatabaseError::InvalidConfig(e.to_string()))
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        debug!("{} {}", method, url);
        self.client.request(method, url)
    }

    async fn fetch_page(&self, collection: &str, filter: &Filter) -> Result<Vec<Document>, DatabaseError> {
        let url = self.documents_url(collection, None)?;
        let queries: Vec<(&str, String)> = filter
            .to_remote_queries()
            .into_iter()
            .map(|q| ("queries[]", q))
            .collect();

        let response = self.request(Method::GET, url).query(&queries).send().await?;
        let list: DocumentList = expect_success(response).await?.json().await?;
        list.documents.into_iter().map(document_from_wire).collect()
    }
}

#[async_trait]
impl DocumentStore for RemoteStore {
    fn kind(&self) -> StoreKind {
        StoreKind::Remote
    }

    async fn create(&self, collection: &str, data: Map<String, Value>) -> Result<Document, DatabaseError> {
        let url = self.documents_url(collection, None)?;
        let body = json!({ "documentId": generate_id(), "data": data });
        let response = self.request(Method::POST, url).json(&body).send().await?;
        document_from_wire(expect_success(response).await?.json().await?)
    }

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, DatabaseError> {
        let url = self.documents_url(collection, Some(id))?;
        let response = self.request(Method::GET, url).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        document_from_wire(expect_success(response).await?.json().await?).map(Some)
    }

    async fn list(&self, collection: &str, filter_data: &FilterData) -> Result<Vec<Document>, DatabaseError> {
        let mut filter = Filter::new(collection).map_err(|e| DatabaseError::QueryError(e.to_string()))?;
        filter
            .assign(filter_data.clone())
            .map_err(|e| DatabaseError::QueryError(e.to_string()))?;

        if filter.limit_value().is_some() {
            return self.fetch_page(collection, &filter).await;
        }

        // No limit requested: walk pages until a short one comes back
        let mut documents = Vec::new();
        let mut offset = filter.offset_value();
        loop {
            filter
                .limit(Some(PAGE_SIZE), Some(offset))
                .map_err(|e| DatabaseError::QueryError(e.to_string()))?;
            let page = self.fetch_page(collection, &filter).await?;
            let fetched = page.len() as i32;
            documents.extend(page);
            if fetched < PAGE_SIZE {
                break;
            }
            offset += fetched;
        }
        Ok(documents)
    }

    async fn update(
        &self,
        collection: &str,
        id: &str,
        data: Map<String, Value>,
    ) -> Result<Option<Document>, DatabaseError> {
        let url = self.documents_url(collection, Some(id))?;
        let response = self
            .request(Method::PATCH, url)
            .json(&json!({ "data": data }))
            .send()
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        document_from_wire(expect_success(response).await?.json().await?).map(Some)
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<bool, DatabaseError> {
        let url = self.documents_url(collection, Some(id))?;
        let response = self.request(Method::DELETE, url).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(false);
        }
        expect_success(response).await?;
        Ok(true)
    }

    async fn ping(&self) -> Result<(), DatabaseError> {
        let url = self
            .endpoint
            .join(&format!("databases/{}", self.database_id))
            .map_err(|e| DatabaseError::InvalidConfig(e.to_string()))?;
        let response = self.request(Method::GET, url).send().await?;
        expect_success(response).await?;
        Ok(())
    }
}

/// Turn a non-2xx response into `DatabaseError::Remote` carrying the service's message
async fn expect_success(response: Response) -> Result<Response, DatabaseError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let message = response
        .json::<RemoteErrorBody>()
        .await
        .ok()
        .and_then(|b| b.message)
        .unwrap_or_else(|| status.canonical_reason().unwrap_or("request failed").to_string());
    Err(DatabaseError::Remote { status: status.as_u16(), message })
}

/// Split a wire document into system fields and data
fn document_from_wire(value: Value) -> Result<Document, DatabaseError> {
    let Value::Object(mut map) = value else {
        return Err(DatabaseError::InvalidResponse("unexpected document format".into()));
    };

    let id = take_string(&mut map, "$id")
        .ok_or_else(|| DatabaseError::InvalidResponse("document without $id".into()))?;
    let collection = take_string(&mut map, "$collectionId").unwrap_or_default();
    let created_at = take_timestamp(&mut map, "$createdAt");
    let updated_at = take_timestamp(&mut map, "$updatedAt").unwrap_or_else(|| created_at.unwrap_or_else(Utc::now));

    map.retain(|key, _| !key.starts_with(SYSTEM_PREFIX));

    Ok(Document {
        id,
        collection,
        created_at: created_at.unwrap_or(updated_at),
        updated_at,
        data: map,
    })
}

fn take_string(map: &mut Map<String, Value>, key: &str) -> Option<String> {
    match map.remove(key) {
        Some(Value::String(s)) => Some(s),
        _ => None,
    }
}

fn take_timestamp(map: &mut Map<String, Value>, key: &str) -> Option<DateTime<Utc>> {
    take_string(map, key)
        .and_then(|s| DateTime::parse_from_rfc3339(&s).ok())
        .map(|dt| dt.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> RemoteConfig {
        RemoteConfig {
            endpoint: Some("https://db.example.com/v1".into()),
            project_id: Some("trustchain-project".into()),
            api_key: Some("key".into()),
            database_id: "trustchain".into(),
        }
    }

    #[test]
    fn requires_endpoint_project_and_key() {
        let mut incomplete = config();
        incomplete.api_key = None;
        assert!(matches!(
            RemoteStore::new(&incomplete, 5),
            Err(DatabaseError::ConfigMissing("TRUSTCHAIN_DB_API_KEY"))
        ));
    }

    #[test]
    fn builds_document_urls_under_endpoint_path() {
        let store = RemoteStore::new(&config(), 5).unwrap();
        let url = store.documents_url("projects", Some("abc")).unwrap();
        assert_eq!(
            url.as_str(),
            "https://db.example.com/v1/databases/trustchain/collections/projects/documents/abc"
        );
    }

    #[test]
    fn malformed_wire_documents_are_store_failures() {
        assert!(matches!(document_from_wire(json!([1, 2])), Err(DatabaseError::InvalidResponse(_))));
        assert!(matches!(
            document_from_wire(json!({ "project_name": "Plant A" })),
            Err(DatabaseError::InvalidResponse(_))
        ));
    }

    #[test]
    fn parses_wire_documents() {
        let doc = document_from_wire(json!({
            "$id": "abc",
            "$collectionId": "projects",
            "$databaseId": "trustchain",
            "$createdAt": "2025-01-02T03:04:05.000+00:00",
            "$updatedAt": "2025-01-03T03:04:05.000+00:00",
            "$permissions": [],
            "project_name": "Plant A"
        }))
        .unwrap();

        assert_eq!(doc.id, "abc");
        assert_eq!(doc.collection, "projects");
        assert!(doc.updated_at > doc.created_at);
        assert_eq!(doc.data.len(), 1);
        assert_eq!(doc.data["project_name"], json!("Plant A"));
    }

    #[test]
    fn rejects_documents_without_id() {
        assert!(document_from_wire(json!({ "name": "x" })).is_err());
        assert!(document_from_wire(json!([1, 2])).is_err());
    }
}
