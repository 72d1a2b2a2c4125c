use clap::Subcommand;
use serde_json::{json, Value};
use std::path::PathBuf;

use crate::cli::client::ApiClient;
use crate::cli::utils::{output_success, read_documents};
use crate::cli::OutputFormat;

#[derive(Subcommand)]
pub enum SubsidyCommands {
    #[command(about = "List subsidy programs, optionally filtered")]
    List {
        #[arg(long)]
        country: Option<String>,
        #[arg(long)]
        status: Option<String>,
        #[arg(long = "program-type")]
        program_type: Option<String>,
    },

    #[command(about = "Load subsidy programs from a JSON or YAML file")]
    Seed {
        #[arg(help = "File holding one subsidy or a list of them")]
        file: PathBuf,
        #[arg(long, help = "Stop at the first rejected program")]
        fail_fast: bool,
    },
}

pub async fn handle(cmd: SubsidyCommands, client: &ApiClient, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        SubsidyCommands::List { country, status, program_type } => {
            let query: Vec<(String, String)> = [("country", country), ("status", status), ("programType", program_type)]
                .into_iter()
                .filter_map(|(k, v)| v.map(|v| (k.to_string(), v)))
                .collect();

            let data = client.get("/api/subsidies", &query).await?.into_data()?;
            let count = data.as_array().map(Vec::len).unwrap_or(0);
            output_success(&output_format, &format!("{} subsidy program(s)", count), Some(data))
        }
        SubsidyCommands::Seed { file, fail_fast } => seed(client, &file, fail_fast, output_format).await,
    }
}

async fn seed(client: &ApiClient, file: &PathBuf, fail_fast: bool, output_format: OutputFormat) -> anyhow::Result<()> {
    let programs = read_documents(file)?;
    let total = programs.len();
    let mut created = Vec::new();
    let mut rejected = Vec::new();

    for (index, program) in programs.iter().enumerate() {
        let name = program.get("name").and_then(Value::as_str).unwrap_or("(unnamed)").to_string();
        match client.post("/api/subsidies", program).await?.into_data() {
            Ok(data) => {
                tracing::info!("Seeded subsidy {} ({}/{})", name, index + 1, total);
                created.push(data.get("$id").cloned().unwrap_or(Value::Null));
            }
            Err(e) if !fail_fast => {
                tracing::warn!("Rejected subsidy {}: {}", name, e);
                rejected.push(json!({ "index": index, "name": name, "error": e.to_string() }));
            }
            Err(e) => return Err(e.context(format!("subsidy #{} '{}' rejected", index, name))),
        }
    }

    output_success(
        &output_format,
        &format!("Seeded {} of {} subsidy programs from {}", created.len(), total, file.display()),
        Some(json!({ "created": created, "rejected": rejected })),
    )
}
