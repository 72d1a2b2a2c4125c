pub mod client;
pub mod commands;
pub mod utils;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

use client::ApiClient;

#[derive(Parser)]
#[command(name = "trustchain")]
#[command(about = "TrustChain CLI - run and operate the TrustChain API")]
#[command(version)]
pub struct Cli {
    #[arg(
        long,
        global = true,
        env = "TRUSTCHAIN_API_URL",
        default_value = "http://localhost:3000",
        help = "Base URL of the TrustChain API"
    )]
    pub url: String,

    #[arg(long, global = true, help = "Output in human-readable text format")]
    pub text: bool,

    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Run the server or inspect a running one")]
    Server {
        #[command(subcommand)]
        cmd: commands::server::ServerCommands,
    },

    #[command(about = "Document operations on any collection")]
    Data {
        #[command(subcommand)]
        cmd: commands::data::DataCommands,
    },

    #[command(about = "Subsidy catalog listing and seeding")]
    Subsidy {
        #[command(subcommand)]
        cmd: commands::subsidy::SubsidyCommands,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);
    let client = ApiClient::new(&cli.url)?;

    let result = match cli.command {
        Commands::Server { cmd } => commands::server::handle(cmd, &client, output_format.clone()).await,
        Commands::Data { cmd } => commands::data::handle(cmd, &client, output_format.clone()).await,
        Commands::Subsidy { cmd } => commands::subsidy::handle(cmd, &client, output_format.clone()).await,
    };

    if let Err(e) = &result {
        utils::output_error(&output_format, &e.to_string())?;
    }
    result
}
