use clap::Subcommand;
use serde_json::json;

use crate::cli::client::ApiClient;
use crate::cli::utils::output_success;
use crate::cli::OutputFormat;

#[derive(Subcommand)]
pub enum ServerCommands {
    #[command(about = "Run the API server in this process")]
    Start {
        #[arg(long, help = "Listen port (overrides TRUSTCHAIN_API_PORT)")]
        port: Option<u16>,
    },

    #[command(about = "Show server information from API root endpoint")]
    Info,

    #[command(about = "Check server health status from API /health endpoint")]
    Health,
}

pub async fn handle(cmd: ServerCommands, client: &ApiClient, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        ServerCommands::Start { port } => start(port).await,
        ServerCommands::Info => {
            let data = client.get("/", &[]).await?.into_data()?;
            let name = data.get("name").and_then(|v| v.as_str()).unwrap_or("TrustChain API");
            let version = data.get("version").and_then(|v| v.as_str()).unwrap_or("unknown");
            output_success(&output_format, &format!("{} {} at {}", name, version, client.url("/")), Some(data))
        }
        ServerCommands::Health => {
            let envelope = client.get("/health", &[]).await?;
            let healthy = envelope.is_success();
            let status = envelope.status;
            let data = envelope.body.get("data").cloned().unwrap_or_else(|| json!({}));
            if !healthy {
                anyhow::bail!("server unhealthy ({}): {}", status.as_u16(), data);
            }
            output_success(&output_format, &format!("Server healthy at {}", client.url("/health")), Some(data))
        }
    }
}

async fn start(port: Option<u16>) -> anyhow::Result<()> {
    let mut config = crate::config::config().clone();
    if let Some(port) = port {
        config.api.port = port;
    }

    let store = crate::database::DatabaseManager::connect(&config).await?;
    let state = crate::state::AppState::new(store);

    let shutdown = crate::app::until_ctrl_c(tokio::signal::ctrl_c());
    crate::app::serve(state, &config, shutdown).await
}
