use anyhow::Context;
use serde_json::{json, Map, Value};
use std::io::Read;
use std::path::Path;

use crate::cli::OutputFormat;

/// Output a success message in the appropriate format
pub fn output_success(output_format: &OutputFormat, message: &str, data: Option<Value>) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let mut response = json!({
                "success": true,
                "message": message
            });
            if let Some(data_value) = data {
                response["data"] = data_value;
            }
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        OutputFormat::Text => {
            println!("✓ {}", message);
            if let Some(data_value) = data {
                print_text(&data_value);
            }
        }
    }
    Ok(())
}

/// Output an error message in the appropriate format
pub fn output_error(output_format: &OutputFormat, message: &str) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&json!({ "success": false, "error": message }))?);
        }
        OutputFormat::Text => {
            eprintln!("Error: {}", message);
        }
    }
    Ok(())
}

/// Documents in text mode: one line per document, `$id` first
fn print_text(data: &Value) {
    match data {
        Value::Array(items) if items.is_empty() => println!("(no documents)"),
        Value::Array(items) => items.iter().for_each(print_text),
        Value::Object(map) => {
            let id = map.get("$id").and_then(Value::as_str).unwrap_or("-");
            let fields: Vec<String> = map
                .iter()
                .filter(|(k, _)| !k.starts_with('$'))
                .map(|(k, v)| format!("{}={}", k, v))
                .collect();
            println!("{}  {}", id, fields.join(" "));
        }
        other => println!("{}", other),
    }
}

/// Parse `key=value` arguments into query pairs
pub fn parse_pairs(pairs: &[String]) -> anyhow::Result<Vec<(String, String)>> {
    pairs
        .iter()
        .map(|pair| {
            pair.split_once('=')
                .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
                .filter(|(k, _)| !k.is_empty())
                .ok_or_else(|| anyhow::anyhow!("expected key=value, got '{}'", pair))
        })
        .collect()
}

/// A JSON object read from stdin
pub fn read_stdin_object() -> anyhow::Result<Map<String, Value>> {
    let mut input = String::new();
    std::io::stdin()
        .read_to_string(&mut input)
        .context("failed to read stdin")?;
    match serde_json::from_str::<Value>(&input).context("stdin is not valid JSON")? {
        Value::Object(map) => Ok(map),
        _ => Err(anyhow::anyhow!("stdin must contain a JSON object")),
    }
}

/// Documents from a JSON or YAML file holding one object or a list of them
pub fn read_documents(path: &Path) -> anyhow::Result<Vec<Value>> {
    let raw = std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    let is_yaml = matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml") | Some("yml")
    );

    let value: Value = if is_yaml {
        serde_yaml::from_str(&raw).with_context(|| format!("{} is not valid YAML", path.display()))?
    } else {
        serde_json::from_str(&raw).with_context(|| format!("{} is not valid JSON", path.display()))?
    };

    match value {
        Value::Array(items) => Ok(items),
        object @ Value::Object(_) => Ok(vec![object]),
        _ => Err(anyhow::anyhow!("{} must hold an object or a list of objects", path.display())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_filter_pairs() {
        let pairs = parse_pairs(&["country=DE".to_string(), "status = open".to_string()]).unwrap();
        assert_eq!(pairs, vec![("country".into(), "DE".into()), ("status".into(), "open".into())]);
        assert!(parse_pairs(&["country".to_string()]).is_err());
        assert!(parse_pairs(&["=DE".to_string()]).is_err());
    }

    #[test]
    fn reads_yaml_and_json_fixtures() {
        let dir = std::env::temp_dir().join(format!("trustchain-cli-{}", uuid::Uuid::new_v4().simple()));
        std::fs::create_dir_all(&dir).unwrap();

        let yaml = dir.join("subsidies.yaml");
        std::fs::write(&yaml, "- name: H2 Grant\n  incentiveDetails:\n    amount: 5\n- name: Other\n").unwrap();
        let docs = read_documents(&yaml).unwrap();
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0]["incentiveDetails"]["amount"], 5);

        let json = dir.join("one.json");
        std::fs::write(&json, r#"{"name":"Single"}"#).unwrap();
        assert_eq!(read_documents(&json).unwrap().len(), 1);

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
