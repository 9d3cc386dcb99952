//! Line-based terminal client.
//!
//! Renders the board on stdout and reads one command per line from stdin:
//! `1`-`9` plays that square, `r` restarts, `q` quits.

use anyhow::Result;
use std::sync::Arc;
use tictactoe_core::{GameController, GameSession, GameStore, Outcome, SessionError};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, instrument, warn};

/// A parsed line of input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Input {
    /// Play the square at this board index (0-8).
    Cell(usize),
    /// Start a new game.
    Restart,
    /// Leave the client.
    Quit,
    /// Show the key help.
    Help,
}

impl Input {
    /// Parses a line. Squares are entered 1-9 as shown on the board.
    pub fn parse(line: &str) -> Option<Self> {
        match line.trim().to_lowercase().as_str() {
            "r" | "restart" => Some(Input::Restart),
            "q" | "quit" | "exit" => Some(Input::Quit),
            "h" | "help" | "?" => Some(Input::Help),
            other => match other.parse::<usize>() {
                Ok(key @ 1..=9) => Some(Input::Cell(key - 1)),
                _ => None,
            },
        }
    }
}

const HELP: &str = "Keys: 1-9 play a square, r restart, q quit";

/// Renders the headline, board and winning line.
pub fn render(session: &GameSession) -> String {
    let mut out = format!(
        "\n{}\n\n{}\n",
        session.status_text(),
        session.board().display()
    );
    if let Outcome::Win { line, .. } = session.outcome() {
        let keys: Vec<String> = line.iter().map(|i| (i + 1).to_string()).collect();
        out.push_str(&format!("\nWinning line: {}\n", keys.join("-")));
    }
    out
}

/// Runs the client until `q` or end of input.
///
/// # Errors
///
/// Returns an error only if stdin cannot be read; store failures are shown
/// and play continues on local state.
#[instrument(skip(store))]
pub async fn run_terminal<S>(store: Arc<S>) -> Result<()>
where
    S: GameStore + ?Sized + 'static,
{
    let mut controller = GameController::new(store);
    if let Err(e) = controller.on_mount().await {
        warn!(error = %e, "Could not load a game");
        println!("Could not load a game: {}", e);
    }
    println!("{}\n{}", HELP, render(controller.session()));

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match Input::parse(&line) {
            Some(Input::Cell(index)) => match controller.on_cell_clicked(index).await {
                Ok(Some(_)) => {}
                Ok(None) => println!("Square {} can't be played.", index + 1),
                Err(SessionError::NoSession) => {
                    println!("No game loaded. Press r to start one.");
                }
                Err(e) => println!("Move kept locally, save failed: {}", e),
            },
            Some(Input::Restart) => {
                if let Err(e) = controller.on_restart_clicked().await {
                    println!("Could not start a new game: {}", e);
                }
            }
            Some(Input::Quit) => break,
            Some(Input::Help) | None => {
                println!("{}", HELP);
                continue;
            }
        }
        println!("{}", render(controller.session()));
    }

    info!("Terminal client finished");
    Ok(())
}
