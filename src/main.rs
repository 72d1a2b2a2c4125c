use tracing_subscriber::EnvFilter;

use trustchain_api::app;
use trustchain_api::config::config;
use trustchain_api::database::DatabaseManager;
use trustchain_api::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up TRUSTCHAIN_DB_*, DATABASE_URL, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Initialize configuration (this loads the config singleton)
    let config = config();
    tracing::info!(
        "Starting TrustChain API in {:?} mode with {:?} store",
        config.environment,
        config.database.store
    );

    let store = DatabaseManager::connect(config).await?;
    let state = AppState::new(store);

    app::serve(state, config, shutdown_signal()).await
}

/// Ctrl-C, or stdin closing when `TRUSTCHAIN_SHUTDOWN_ON_STDIN_CLOSE=1`
/// (lets a supervising process stop the server by dropping the pipe).
async fn shutdown_signal() {
    let ctrl_c = app::until_ctrl_c(tokio::signal::ctrl_c());

    let stdin_closed = async {
        if std::env::var("TRUSTCHAIN_SHUTDOWN_ON_STDIN_CLOSE").as_deref() != Ok("1") {
            return std::future::pending::<()>().await;
        }
        use tokio::io::AsyncReadExt;
        let mut stdin = tokio::io::stdin();
        let mut buf = [0u8; 256];
        loop {
            match stdin.read(&mut buf).await {
                Ok(0) | Err(_) => break,
                Ok(_) => continue,
            }
        }
    };

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received ctrl-c, shutting down"),
        _ = stdin_closed => tracing::info!("Stdin closed, shutting down"),
    }
}
