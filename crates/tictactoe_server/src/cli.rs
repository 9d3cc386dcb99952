//! Command-line interface for tictactoe.

use clap::{Parser, Subcommand};

/// Tic-tac-toe with a persisted game session
#[derive(Parser, Debug)]
#[command(name = "tictactoe")]
#[command(
    about = "Persisted tic-tac-toe: REST API server and terminal client",
    long_about = None
)]
#[command(version)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the HTTP API server
    Serve {
        /// Host to bind to
        #[arg(long, env = "TICTACTOE_HOST", default_value = "127.0.0.1")]
        host: String,

        /// Port to bind to
        #[arg(short, long, env = "PORT", default_value = "5000")]
        port: u16,

        /// Path to the SQLite database file (created if it doesn't exist)
        #[arg(long, env = "DATABASE_URL", default_value = "tictactoe.db")]
        database_url: String,

        /// Keep stored games instead of clearing them on startup
        #[arg(long, env = "TICTACTOE_KEEP_GAMES")]
        keep_games: bool,
    },

    /// Play in the terminal
    Play {
        /// Game server URL
        #[arg(
            long,
            env = "TICTACTOE_SERVER_URL",
            default_value = "http://localhost:5000"
        )]
        server_url: String,

        /// Play against a local SQLite file instead of a server
        #[arg(long)]
        db: Option<String>,
    },
}
