use serde_json::{Map, Value};

use crate::collections::Collection;
use crate::database::document::Document;

/// Convert a stored document into the flat public wire format:
/// `$id`, `$collectionId`, `$createdAt`, `$updatedAt` followed by the fields.
///
/// Encoded nested fields are parsed back into JSON; a stored string that
/// does not parse is passed through unchanged.
pub fn document_to_api_value(document: &Document, collection: Collection) -> Value {
    let mut out = Map::new();
    out.insert("$id".to_string(), Value::String(document.id.clone()));
    out.insert("$collectionId".to_string(), Value::String(document.collection.clone()));
    out.insert("$createdAt".to_string(), Value::String(document.created_at.to_rfc3339()));
    out.insert("$updatedAt".to_string(), Value::String(document.updated_at.to_rfc3339()));

    for (key, value) in &document.data {
        out.insert(key.clone(), value.clone());
    }

    for field in collection.encoded_fields() {
        if let Some(Value::String(raw)) = out.get(*field) {
            match serde_json::from_str::<Value>(raw) {
                Ok(parsed @ (Value::Object(_) | Value::Array(_))) => {
                    out.insert(field.to_string(), parsed);
                }
                _ => tracing::debug!("{} {} has an undecodable {}", collection, document.id, field),
            }
        }
    }

    Value::Object(out)
}

pub fn documents_to_api_values(documents: &[Document], collection: Collection) -> Vec<Value> {
    documents
        .iter()
        .map(|doc| document_to_api_value(doc, collection))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn subsidy(data: Value) -> Document {
        Document::new("subsidies", data.as_object().cloned().unwrap())
    }

    #[test]
    fn flattens_system_fields() {
        let doc = Document::new("projects", json!({ "project_name": "Plant A" }).as_object().cloned().unwrap());
        let value = document_to_api_value(&doc, Collection::Projects);
        assert_eq!(value["$id"], doc.id.as_str());
        assert_eq!(value["$collectionId"], "projects");
        assert_eq!(value["project_name"], "Plant A");
        assert!(value["$createdAt"].as_str().unwrap().contains('T'));
    }

    #[test]
    fn decodes_subsidy_fields() {
        let doc = subsidy(json!({
            "incentiveDetails": "{\"type\":\"grant\",\"amount\":5,\"currency\":\"EUR\"}",
            "eligibility": "{not json",
            "resourceLinks": "[]"
        }));
        let value = document_to_api_value(&doc, Collection::Subsidies);
        assert_eq!(value["incentiveDetails"]["amount"], 5);
        assert_eq!(value["eligibility"], "{not json");
        assert_eq!(value["resourceLinks"], json!([]));
    }

    #[test]
    fn other_collections_keep_strings() {
        let doc = Document::new("projects", json!({ "notes": "{\"a\":1}" }).as_object().cloned().unwrap());
        let value = document_to_api_value(&doc, Collection::Projects);
        assert_eq!(value["notes"], "{\"a\":1}");
    }
}
