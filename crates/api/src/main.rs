//! Students API - Main Entry Point

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use api::{init_logging, run_server, AppConfig, AppState};
use clap::Parser;
use data_validator::{ValidationConfig, Validator};
use storage::SqliteStore;
use tracing::info;

/// Command-line arguments
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the YAML config file
    #[arg(long, env = "CONFIG_PATH")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let config = AppConfig::load(&args.config)
        .with_context(|| format!("loading {}", args.config.display()))?;

    init_logging(&config.log).map_err(|e| anyhow::anyhow!(e))?;

    info!("=== Students API v{} ===", env!("CARGO_PKG_VERSION"));

    let store = SqliteStore::connect(&config.storage_path)
        .await
        .context("opening storage")?;
    info!(env = %config.env, "Storage initialized");

    let validator = Validator::new(ValidationConfig::default())?;
    let state = AppState::new(Arc::new(store.clone()), Arc::new(validator));

    run_server(&config.http_server, state).await?;

    store.close().await;
    Ok(())
}
