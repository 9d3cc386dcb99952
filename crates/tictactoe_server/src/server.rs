//! HTTP server startup.

use anyhow::{Context, Result};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, instrument, warn};

use crate::api::{AppState, router};
use crate::config::ServerConfig;
use crate::db::GameRepository;

/// Opens the database, applies migrations and optionally clears old games.
///
/// A failed clear is logged and does not stop startup.
///
/// # Errors
///
/// Returns an error if the database cannot be opened or migrated.
#[instrument(skip(config), fields(db = %config.database_url()))]
pub fn prepare_repository(config: &ServerConfig) -> Result<GameRepository> {
    let repository = GameRepository::open(config.database_url().clone())
        .context("Failed to open game database")?;

    if *config.clear_on_startup() {
        match repository.clear_games() {
            Ok(deleted) => info!(deleted, "Games cleared on server startup"),
            Err(e) => warn!(error = %e, "Error clearing games on startup"),
        }
    }

    Ok(repository)
}

/// Runs the API server until the process is stopped.
///
/// # Errors
///
/// Returns an error if the database or listener cannot be set up, or the
/// server stops with an error.
#[instrument(skip(config), fields(addr = %config.bind_addr()))]
pub async fn run_server(config: ServerConfig) -> Result<()> {
    let repository = prepare_repository(&config)?;
    let app = router(AppState::new(Arc::new(repository)));

    let listener = TcpListener::bind(config.bind_addr())
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_addr()))?;
    info!(
        "Server running at http://{}/",
        listener.local_addr().context("Listener has no address")?
    );

    axum::serve(listener, app).await.context("Server error")?;
    Ok(())
}
