//! Tic-tac-toe server library
//!
//! Serves the persisted game session over HTTP and plays it from a terminal.
//!
//! # Architecture
//!
//! - **Db**: SQLite persistence for the current game (diesel)
//! - **Api**: axum routes over any [`tictactoe_core::GameStore`]
//! - **RestStore**: a `GameStore` that talks to a running server
//! - **Terminal**: line-based client driving a [`tictactoe_core::GameController`]
//!
//! # Example
//!
//! ```no_run
//! use tictactoe_server::{ServerConfig, run_server};
//!
//! # async fn example() -> anyhow::Result<()> {
//! run_server(ServerConfig::default()).await?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Private module declarations
mod api;
mod cli;
mod config;
mod db;
mod rest_store;
mod server;
mod terminal;

// Crate-level exports - HTTP API
pub use api::{ApiError, AppState, router};

// Crate-level exports - Configuration
pub use cli::{Cli, Command};
pub use config::ServerConfig;

// Crate-level exports - Persistence
pub use db::{DbError, GameChanges, GameRepository, GameRow, MIGRATIONS, NewGameRow};
pub use rest_store::RestStore;

// Crate-level exports - Entry points
pub use server::{prepare_repository, run_server};
pub use terminal::{Input, render, run_terminal};
