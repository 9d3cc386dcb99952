//! Tic-tac-toe game logic with a persisted session.
//!
//! # Architecture
//!
//! - **Board**: the 9-cell grid and its marks
//! - **Outcome**: pure win/draw evaluation over a board
//! - **Session**: board, turn and outcome of the tracked game
//! - **Store**: the persistence contract ([`GameStore`]) and its record shapes
//! - **Controller**: applies moves and keeps the store in step, writing
//!   through a single-writer [`SaveQueue`]
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use tictactoe_core::{GameController, MemoryStore};
//!
//! # async fn example() -> Result<(), tictactoe_core::SessionError> {
//! let mut controller = GameController::new(Arc::new(MemoryStore::new()));
//! controller.load_latest_or_create().await?;
//! controller.apply_move(4).await?;
//! println!("{}", controller.status_text());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod board;
mod controller;
mod error;
mod memory;
mod outcome;
mod queue;
mod session;
mod store;

// Crate-level exports - Board model
pub use board::{Board, Player, Square};

// Crate-level exports - Outcome evaluation
pub use outcome::{LINES, Line, Outcome, evaluate};

// Crate-level exports - Session value and controller
pub use controller::GameController;
pub use session::{GameSession, MoveRejection};

// Crate-level exports - Persistence
pub use error::{SessionError, StoreError};
pub use memory::MemoryStore;
pub use queue::{PendingSave, SaveAck, SaveQueue};
pub use store::{GameFields, GameId, GameInit, GameRecord, GameStore, Winner};
