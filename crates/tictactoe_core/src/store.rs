//! Persistence contract for game sessions.
//!
//! The controller talks to storage only through [`GameStore`]. Records use
//! the same JSON shape the REST API exchanges, so a store may be a database,
//! a remote API or plain memory.

use crate::board::{Board, Player};
use crate::error::StoreError;
use crate::outcome::{LINES, Outcome};
use async_trait::async_trait;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Identifier assigned to a persisted game.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    derive_more::Display,
    derive_more::From,
)]
#[serde(transparent)]
pub struct GameId(i32);

impl GameId {
    /// Returns the raw identifier.
    pub fn get(self) -> i32 {
        self.0
    }
}

/// Persisted result column: a winning mark or the draw sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Winner {
    /// Player X won.
    X,
    /// Player O won.
    O,
    /// Game ended in a draw.
    Draw,
}

impl Winner {
    /// Returns the persisted winner column for an outcome.
    pub fn from_outcome(outcome: &Outcome) -> Option<Self> {
        match outcome {
            Outcome::Ongoing => None,
            Outcome::Win {
                player: Player::X, ..
            } => Some(Winner::X),
            Outcome::Win {
                player: Player::O, ..
            } => Some(Winner::O),
            Outcome::Draw => Some(Winner::Draw),
        }
    }

    /// Returns the winning player, `None` for a draw.
    pub fn player(self) -> Option<Player> {
        match self {
            Winner::X => Some(Player::X),
            Winner::O => Some(Player::O),
            Winner::Draw => None,
        }
    }

    /// Converts the winner to the string stored in the database.
    pub fn to_db_string(self) -> &'static str {
        match self {
            Winner::X => "X",
            Winner::O => "O",
            Winner::Draw => "Draw",
        }
    }

    /// Parses the winner from the string stored in the database.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Invalid`] for unknown values.
    pub fn from_db_string(s: &str) -> Result<Self, StoreError> {
        match s {
            "X" => Ok(Winner::X),
            "O" => Ok(Winner::O),
            "Draw" => Ok(Winner::Draw),
            other => Err(StoreError::invalid(format!("unknown winner '{}'", other))),
        }
    }
}

/// Mutable fields of a game record.
///
/// This is the body the client sends when creating or updating a game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameFields {
    /// Board marks.
    pub board: Board,
    /// Whether X moves next.
    pub is_x_next: bool,
    /// Winner column, `None` while the game is ongoing.
    #[serde(default)]
    pub winner: Option<Winner>,
    /// Indices of the winning line, empty unless someone won.
    #[serde(default)]
    pub winning_squares: Vec<usize>,
}

/// Fields used to create a fresh record.
pub type GameInit = GameFields;

impl GameFields {
    /// Fields of a brand new game: empty board, X to move.
    pub fn initial() -> Self {
        Self {
            board: Board::new(),
            is_x_next: true,
            winner: None,
            winning_squares: Vec::new(),
        }
    }

    /// Derives the persisted columns from a board, turn and tagged outcome.
    pub fn from_parts(board: Board, turn: Player, outcome: &Outcome) -> Self {
        Self {
            board,
            is_x_next: turn == Player::X,
            winner: Winner::from_outcome(outcome),
            winning_squares: outcome.line().to_vec(),
        }
    }

    /// Checks that the winner and winning line columns agree.
    ///
    /// A winning mark needs one of the eight lines; no winner or a draw
    /// needs an empty line.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Invalid`] describing the first failed check.
    pub fn validate(&self) -> Result<(), StoreError> {
        if let Some(&bad) = self.winning_squares.iter().find(|&&i| i >= Board::CELLS) {
            return Err(StoreError::invalid(format!(
                "winning square {} is off the board",
                bad
            )));
        }
        match self.winner.and_then(Winner::player) {
            Some(_) => {
                let is_line = LINES
                    .iter()
                    .any(|line| line.as_slice() == self.winning_squares.as_slice());
                if !is_line {
                    return Err(StoreError::invalid(format!(
                        "winner needs a winning line, got {:?}",
                        self.winning_squares
                    )));
                }
            }
            None => {
                if !self.winning_squares.is_empty() {
                    return Err(StoreError::invalid(format!(
                        "winning squares {:?} without a winner",
                        self.winning_squares
                    )));
                }
            }
        }
        Ok(())
    }
}

impl Default for GameFields {
    fn default() -> Self {
        Self::initial()
    }
}

/// A persisted game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameRecord {
    /// Store-assigned identifier.
    pub id: GameId,
    /// Board marks.
    pub board: Board,
    /// Whether X moves next.
    pub is_x_next: bool,
    /// Winner column.
    pub winner: Option<Winner>,
    /// Winning line, empty unless someone won.
    pub winning_squares: Vec<usize>,
    /// When the record was inserted.
    pub created_at: NaiveDateTime,
    /// When the record was last written.
    pub updated_at: NaiveDateTime,
}

impl GameRecord {
    /// Returns the mutable fields of this record.
    pub fn fields(&self) -> GameFields {
        GameFields {
            board: self.board,
            is_x_next: self.is_x_next,
            winner: self.winner,
            winning_squares: self.winning_squares.clone(),
        }
    }
}

/// Durable storage for the current game.
///
/// Implementations must make [`replace_all_with`](GameStore::replace_all_with)
/// atomic: a reader never observes zero games once it has returned.
#[async_trait]
pub trait GameStore: Send + Sync {
    /// Returns the record with the latest `updated_at`, if any.
    async fn fetch_latest(&self) -> Result<Option<GameRecord>, StoreError>;

    /// Returns the record with the given identifier, if any.
    async fn fetch(&self, id: GameId) -> Result<Option<GameRecord>, StoreError>;

    /// Deletes every record and inserts one built from `init`.
    async fn replace_all_with(&self, init: GameInit) -> Result<GameRecord, StoreError>;

    /// Overwrites the fields of record `id` and refreshes `updated_at`.
    ///
    /// Fails with [`StoreError::NotFound`] if no such record exists.
    async fn update(&self, id: GameId, fields: GameFields) -> Result<GameRecord, StoreError>;
}

#[async_trait]
impl<S: GameStore + ?Sized> GameStore for Arc<S> {
    async fn fetch_latest(&self) -> Result<Option<GameRecord>, StoreError> {
        (**self).fetch_latest().await
    }

    async fn fetch(&self, id: GameId) -> Result<Option<GameRecord>, StoreError> {
        (**self).fetch(id).await
    }

    async fn replace_all_with(&self, init: GameInit) -> Result<GameRecord, StoreError> {
        (**self).replace_all_with(init).await
    }

    async fn update(&self, id: GameId, fields: GameFields) -> Result<GameRecord, StoreError> {
        (**self).update(id, fields).await
    }
}
