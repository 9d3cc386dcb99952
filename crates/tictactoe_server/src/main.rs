//! Tictactoe - Unified CLI
//!
//! Runs the REST API server or the terminal client.

use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use tictactoe_server::{
    Cli, Command, GameRepository, RestStore, ServerConfig, run_server, run_terminal,
};
use tracing::{info, instrument};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    match cli.command {
        Command::Serve { .. } => {
            let config = ServerConfig::from_command(&cli.command)
                .context("serve command carries server settings")?;
            serve(config).await
        }
        Command::Play { server_url, db } => play(server_url, db).await,
    }
}

/// Run the HTTP API server
async fn serve(config: ServerConfig) -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!(
        addr = %config.bind_addr(),
        db = %config.database_url(),
        clear_on_startup = *config.clear_on_startup(),
        "Starting tic-tac-toe server"
    );
    run_server(config).await
}

/// Run the terminal client
#[instrument(skip_all)]
async fn play(server_url: String, db: Option<String>) -> Result<()> {
    // Logs go to stderr so they don't interleave with the board.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    match db {
        Some(path) => {
            let repository = GameRepository::open(path.clone())
                .with_context(|| format!("Failed to open game database {}", path))?;
            run_terminal(Arc::new(repository)).await
        }
        None => run_terminal(Arc::new(RestStore::new(server_url))).await,
    }
}
