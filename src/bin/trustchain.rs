use clap::Parser;
use tracing_subscriber::EnvFilter;
use trustchain_api::cli::Cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    // run() has already reported the error in the selected output format
    if let Err(e) = trustchain_api::cli::run(cli).await {
        if matches!(std::env::var("CLI_VERBOSE").as_deref(), Ok("true") | Ok("1")) {
            eprintln!("Error: {e:?}");
        }
        std::process::exit(1);
    }

    Ok(())
}
