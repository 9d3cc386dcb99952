//! Database models and their mapping to game records.

use chrono::NaiveDateTime;
use derive_getters::Getters;
use derive_new::new;
use diesel::prelude::*;
use tictactoe_core::{Board, GameFields, GameId, GameRecord, Winner};
use tracing::instrument;

use crate::db::{DbError, schema};

/// A row of the `games` table.
///
/// The board and winning line are stored as JSON arrays, the winner as
/// `"X"`, `"O"`, `"Draw"` or NULL.
#[derive(Debug, Clone, Queryable, Identifiable, Selectable, Getters)]
#[diesel(table_name = schema::games)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct GameRow {
    id: i32,
    board: String,
    is_x_next: bool,
    winner: Option<String>,
    winning_squares: String,
    created_at: NaiveDateTime,
    updated_at: NaiveDateTime,
}

impl GameRow {
    /// Decodes the stored columns into a [`GameRecord`].
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a column holds malformed JSON or an unknown
    /// winner value.
    #[instrument(skip(self), fields(id = self.id))]
    pub fn into_record(self) -> Result<GameRecord, DbError> {
        let board: Board = serde_json::from_str(&self.board)?;
        let winning_squares: Vec<usize> = serde_json::from_str(&self.winning_squares)?;
        let winner = self
            .winner
            .as_deref()
            .map(Winner::from_db_string)
            .transpose()
            .map_err(|e| DbError::new(e.to_string()))?;

        Ok(GameRecord {
            id: GameId::from(self.id),
            board,
            is_x_next: self.is_x_next,
            winner,
            winning_squares,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// Insertable row for creating a game.
#[derive(Debug, Clone, Insertable, new, Getters)]
#[diesel(table_name = schema::games)]
pub struct NewGameRow {
    board: String,
    is_x_next: bool,
    winner: Option<String>,
    winning_squares: String,
    created_at: NaiveDateTime,
    updated_at: NaiveDateTime,
}

impl NewGameRow {
    /// Encodes fields for insertion with both timestamps set to `now`.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the fields cannot be encoded.
    #[instrument(skip(fields))]
    pub fn from_fields(fields: &GameFields, now: NaiveDateTime) -> Result<Self, DbError> {
        Ok(Self::new(
            serde_json::to_string(&fields.board)?,
            fields.is_x_next,
            fields.winner.map(|w| w.to_db_string().to_string()),
            serde_json::to_string(&fields.winning_squares)?,
            now,
            now,
        ))
    }
}

/// Changeset overwriting the mutable columns of a game.
///
/// `None` winners are written as NULL so a restarted game clears them.
#[derive(Debug, Clone, AsChangeset, new, Getters)]
#[diesel(table_name = schema::games)]
#[diesel(treat_none_as_null = true)]
pub struct GameChanges {
    board: String,
    is_x_next: bool,
    winner: Option<String>,
    winning_squares: String,
    updated_at: NaiveDateTime,
}

impl GameChanges {
    /// Encodes fields for an update stamped with `now`.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the fields cannot be encoded.
    #[instrument(skip(fields))]
    pub fn from_fields(fields: &GameFields, now: NaiveDateTime) -> Result<Self, DbError> {
        Ok(Self::new(
            serde_json::to_string(&fields.board)?,
            fields.is_x_next,
            fields.winner.map(|w| w.to_db_string().to_string()),
            serde_json::to_string(&fields.winning_squares)?,
            now,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tictactoe_core::Player;

    fn stamp() -> NaiveDateTime {
        chrono::NaiveDate::from_ymd_opt(2024, 5, 1)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_new_row_encodes_columns() {
        let mut fields = GameFields::initial();
        fields.board = fields.board.place(4, Player::X);
        fields.is_x_next = false;

        let row = NewGameRow::from_fields(&fields, stamp()).unwrap();
        assert_eq!(
            row.board(),
            r#"[null,null,null,null,"X",null,null,null,null]"#
        );
        assert_eq!(row.winner(), &None);
        assert_eq!(row.winning_squares(), "[]");
    }

    #[test]
    fn test_row_decodes_to_record() {
        let row = GameRow {
            id: 5,
            board: r#"["O",null,"X",null,"O",null,"X",null,"O"]"#.to_string(),
            is_x_next: true,
            winner: Some("O".to_string()),
            winning_squares: "[0,4,8]".to_string(),
            created_at: stamp(),
            updated_at: stamp(),
        };
        let record = row.into_record().unwrap();
        assert_eq!(record.id, GameId::from(5));
        assert_eq!(record.winner, Some(Winner::O));
        assert_eq!(record.winning_squares, vec![0, 4, 8]);
        assert_eq!(record.board.occupied_count(), 5);
    }

    #[test]
    fn test_row_with_unknown_winner_fails() {
        let row = GameRow {
            id: 1,
            board: "[null,null,null,null,null,null,null,null,null]".to_string(),
            is_x_next: true,
            winner: Some("Z".to_string()),
            winning_squares: "[]".to_string(),
            created_at: stamp(),
            updated_at: stamp(),
        };
        assert!(row.into_record().is_err());
    }
}
