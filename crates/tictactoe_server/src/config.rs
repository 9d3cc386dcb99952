//! Server configuration.

use derive_getters::Getters;
use derive_new::new;
use std::net::SocketAddr;
use tracing::instrument;

use crate::cli::Command;

/// Settings for the API server.
#[derive(Debug, Clone, PartialEq, Eq, Getters, new)]
pub struct ServerConfig {
    /// Host to bind to.
    host: String,
    /// Port to bind to.
    port: u16,
    /// Path to the SQLite database file.
    database_url: String,
    /// Whether stored games are deleted at startup.
    clear_on_startup: bool,
}

impl ServerConfig {
    /// Builds the configuration from a `serve` command.
    ///
    /// Returns `None` for other commands.
    #[instrument]
    pub fn from_command(command: &Command) -> Option<Self> {
        match command {
            Command::Serve {
                host,
                port,
                database_url,
                keep_games,
            } => Some(Self::new(host.clone(), *port, database_url.clone(), !keep_games)),
            Command::Play { .. } => None,
        }
    }

    /// Address string to bind, e.g. `127.0.0.1:5000`.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Parses the bind address, if the host is an IP literal.
    pub fn socket_addr(&self) -> Option<SocketAddr> {
        self.bind_addr().parse().ok()
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::new(
            "127.0.0.1".to_string(),
            5000,
            "tictactoe.db".to_string(),
            true,
        )
    }
}
