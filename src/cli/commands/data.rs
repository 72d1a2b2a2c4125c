use anyhow::anyhow;
use clap::Subcommand;
use serde_json::Value;

use crate::cli::client::ApiClient;
use crate::cli::utils::{output_success, parse_pairs, read_stdin_object};
use crate::cli::OutputFormat;
use crate::collections::Collection;

#[derive(Subcommand)]
pub enum DataCommands {
    #[command(about = "Select document(s) from a collection")]
    Select {
        #[arg(help = "Collection route (e.g. company-profiles, projects)")]
        collection: String,
        #[arg(help = "Document ID to retrieve (optional)")]
        id: Option<String>,
        #[arg(long = "where", help = "Equality filter as key=value (repeatable)")]
        filters: Vec<String>,
        #[arg(long)]
        limit: Option<u32>,
        #[arg(long)]
        offset: Option<u32>,
    },

    #[command(about = "Create document from stdin")]
    Create {
        #[arg(help = "Collection route")]
        collection: String,
    },

    #[command(about = "Update document from stdin")]
    Update {
        #[arg(help = "Collection route")]
        collection: String,
        #[arg(help = "Document ID to update")]
        id: String,
    },

    #[command(about = "Delete document (cascades for company profiles and projects)")]
    Delete {
        #[arg(help = "Collection route")]
        collection: String,
        #[arg(help = "Document ID to delete")]
        id: String,
    },
}

/// Resolve a route name to a collection; unknown names list the valid ones
pub fn resolve_collection(route: &str) -> anyhow::Result<Collection> {
    Collection::from_route(route).ok_or_else(|| {
        let known: Vec<&str> = Collection::ALL.iter().map(|c| c.route()).collect();
        anyhow!("unknown collection '{}' (expected one of: {})", route, known.join(", "))
    })
}

pub async fn handle(cmd: DataCommands, client: &ApiClient, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        DataCommands::Select { collection, id, filters, limit, offset } => {
            let collection = resolve_collection(&collection)?;
            let path = match &id {
                Some(id) => format!("/api/{}/{}", collection.route(), id),
                None => format!("/api/{}", collection.route()),
            };

            let mut query = parse_pairs(&filters)?;
            if let Some(limit) = limit {
                query.push(("limit".to_string(), limit.to_string()));
            }
            if let Some(offset) = offset {
                query.push(("offset".to_string(), offset.to_string()));
            }

            let data = client.get(&path, &query).await?.into_data()?;
            let count = data.as_array().map(Vec::len).unwrap_or(1);
            output_success(&output_format, &format!("{} {} document(s)", count, collection.label()), Some(data))
        }
        DataCommands::Create { collection } => {
            let collection = resolve_collection(&collection)?;
            let body = Value::Object(read_stdin_object()?);
            let data = client.post(&format!("/api/{}", collection.route()), &body).await?.into_data()?;
            output_success(&output_format, &format!("{} created", collection.label()), Some(data))
        }
        DataCommands::Update { collection, id } => {
            let collection = resolve_collection(&collection)?;
            let body = Value::Object(read_stdin_object()?);
            let path = format!("/api/{}/{}", collection.route(), id);
            let data = client.put(&path, &body).await?.into_data()?;
            output_success(&output_format, &format!("{} {} updated", collection.label(), id), Some(data))
        }
        DataCommands::Delete { collection, id } => {
            let collection = resolve_collection(&collection)?;
            let path = format!("/api/{}/{}", collection.route(), id);
            let data = client.delete(&path).await?.into_data()?;
            output_success(&output_format, &format!("{} {} deleted", collection.label(), id), Some(data))
        }
    }
}
