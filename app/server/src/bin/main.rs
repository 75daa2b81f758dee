//! Podbay server binary entry point.
//!
//! Loads TOML configuration, opens the transcript store, constructs the
//! provider and runtime, and runs the axum server with graceful shutdown
//! on ctrl-c.

use anyhow::Result;
use podbay_server::{ServerConfig, serve};
use tokio::signal;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing from RUST_LOG (default: info).
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "podbay.toml".to_string());
    let config = ServerConfig::load(&config_path)?;
    tracing::info!("loaded configuration from {config_path}");

    let handle = serve(&config).await?;

    signal::ctrl_c().await?;
    tracing::info!("shutting down");
    handle.shutdown().await?;

    Ok(())
}
