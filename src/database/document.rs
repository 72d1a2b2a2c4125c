use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use uuid::Uuid;

/// Prefix reserved for fields owned by the document store (`$id`, `$createdAt`, ...)
pub const SYSTEM_PREFIX: char = '$';

/// A stored document: generated id, timestamps and free-form fields
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    pub collection: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub data: Map<String, Value>,
}

impl Document {
    /// New document with a generated id; used by stores that assign ids locally
    pub fn new(collection: impl Into<String>, data: Map<String, Value>) -> Self {
        let now = Utc::now();
        Self {
            id: generate_id(),
            collection: collection.into(),
            created_at: now,
            updated_at: now,
            data,
        }
    }

    /// Look up a field, following dots into nested objects
    pub fn get(&self, path: &str) -> Option<&Value> {
        field_path(&self.data, path)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.data.get(key).and_then(Value::as_str)
    }
}

pub fn generate_id() -> String {
    Uuid::new_v4().simple().to_string()
}

/// Resolve `a.b.c` against a JSON object
pub fn field_path<'a>(map: &'a Map<String, Value>, path: &str) -> Option<&'a Value> {
    let mut parts = path.split('.');
    let mut current = map.get(parts.next()?)?;
    for part in parts {
        current = current.as_object()?.get(part)?;
    }
    Some(current)
}

/// Drop store-owned fields and a bare `id` from client input
pub fn strip_system_fields(mut data: Map<String, Value>) -> Map<String, Value> {
    data.retain(|key, _| !key.starts_with(SYSTEM_PREFIX) && key != "id");
    data
}

/// Id carried in a request body as `$id` or `id`
pub fn body_id(data: &Map<String, Value>) -> Option<String> {
    data.get("$id")
        .or_else(|| data.get("id"))
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Textual form used for equality filters; `None` for null
pub fn value_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        other => Some(other.to_string()),
    }
}
