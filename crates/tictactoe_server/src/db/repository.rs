//! Database repository for the persisted game.

use chrono::Utc;
use diesel::connection::SimpleConnection;
use diesel::prelude::*;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use tictactoe_core::{GameFields, GameId, GameRecord};
use tracing::{debug, info, instrument};

use crate::db::{DbError, GameChanges, GameRow, NewGameRow, schema};

/// Schema migrations bundled into the binary.
pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Database repository for game operations.
///
/// Each call opens its own connection, so the repository is cheap to clone
/// and safe to move onto blocking threads. The database must be a file path;
/// `":memory:"` would give every call a fresh empty database.
#[derive(Debug, Clone)]
pub struct GameRepository {
    db_path: String,
}

impl GameRepository {
    /// Creates a repository for the database at the given path without
    /// touching the schema.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the path is empty.
    #[instrument(skip(db_path), fields(db_path = %db_path))]
    pub fn new(db_path: String) -> Result<Self, DbError> {
        if db_path.trim().is_empty() {
            return Err(DbError::new("Database path is empty"));
        }
        info!(path = %db_path, "Creating GameRepository");
        Ok(Self { db_path })
    }

    /// Creates a repository and applies pending migrations.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the database cannot be opened or migrated.
    #[instrument(skip(db_path), fields(db_path = %db_path))]
    pub fn open(db_path: String) -> Result<Self, DbError> {
        let repo = Self::new(db_path)?;
        repo.run_migrations()?;
        Ok(repo)
    }

    /// Returns the database path.
    pub fn db_path(&self) -> &str {
        &self.db_path
    }

    /// Establishes a database connection.
    #[instrument(skip(self))]
    fn connection(&self) -> Result<SqliteConnection, DbError> {
        debug!(path = %self.db_path, "Establishing connection");
        let mut conn = SqliteConnection::establish(&self.db_path)
            .map_err(|e| DbError::new(format!("Failed to connect to '{}': {}", self.db_path, e)))?;
        // Requests run on separate connections; wait for the writer lock
        // instead of failing with SQLITE_BUSY.
        conn.batch_execute("PRAGMA busy_timeout = 5000;")?;
        Ok(conn)
    }

    /// Applies any pending schema migrations.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a migration fails.
    #[instrument(skip(self))]
    pub fn run_migrations(&self) -> Result<(), DbError> {
        let mut conn = self.connection()?;
        let applied = conn
            .run_pending_migrations(MIGRATIONS)
            .map_err(|e| DbError::new(format!("Migrations failed: {}", e)))?;
        info!(count = applied.len(), "Migrations applied");
        Ok(())
    }

    /// Gets the most recently updated game. Returns `None` if there is none.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn latest_game(&self) -> Result<Option<GameRecord>, DbError> {
        debug!("Loading latest game");
        let mut conn = self.connection()?;

        let row = schema::games::table
            .order_by(schema::games::updated_at.desc())
            .then_order_by(schema::games::id.desc())
            .select(GameRow::as_select())
            .first(&mut conn)
            .optional()?;

        row.map(GameRow::into_record).transpose()
    }

    /// Gets a game by identifier. Returns `None` if not found.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn get_game(&self, id: GameId) -> Result<Option<GameRecord>, DbError> {
        debug!(game_id = %id, "Loading game");
        let mut conn = self.connection()?;

        let row = schema::games::table
            .find(id.get())
            .select(GameRow::as_select())
            .first(&mut conn)
            .optional()?;

        row.map(GameRow::into_record).transpose()
    }

    /// Deletes every game and inserts a new one in a single transaction.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs; nothing is deleted in
    /// that case.
    #[instrument(skip(self, fields))]
    pub fn create_game(&self, fields: &GameFields) -> Result<GameRecord, DbError> {
        let new_game = NewGameRow::from_fields(fields, Utc::now().naive_utc())?;
        let mut conn = self.connection()?;

        let (deleted, row) = conn.immediate_transaction(|conn| {
            let deleted = diesel::delete(schema::games::table).execute(conn)?;
            let row = diesel::insert_into(schema::games::table)
                .values(&new_game)
                .returning(GameRow::as_returning())
                .get_result(conn)?;
            Ok::<_, diesel::result::Error>((deleted, row))
        })?;

        info!(game_id = row.id(), deleted, "Game created");
        row.into_record()
    }

    /// Overwrites a game's fields. Returns `None` if no game has that id.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self, fields))]
    pub fn update_game(
        &self,
        id: GameId,
        fields: &GameFields,
    ) -> Result<Option<GameRecord>, DbError> {
        let changes = GameChanges::from_fields(fields, Utc::now().naive_utc())?;
        let mut conn = self.connection()?;

        let row = diesel::update(schema::games::table.find(id.get()))
            .set(&changes)
            .returning(GameRow::as_returning())
            .get_result(&mut conn)
            .optional()?;

        match &row {
            Some(_) => debug!(game_id = %id, "Game updated"),
            None => debug!(game_id = %id, "No game to update"),
        }
        row.map(GameRow::into_record).transpose()
    }

    /// Deletes every game. Returns the number of rows removed.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn clear_games(&self) -> Result<usize, DbError> {
        let mut conn = self.connection()?;
        let deleted = diesel::delete(schema::games::table).execute(&mut conn)?;
        info!(deleted, "Games cleared");
        Ok(deleted)
    }

    /// Counts stored games.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn count_games(&self) -> Result<i64, DbError> {
        let mut conn = self.connection()?;
        let count: i64 = schema::games::table.count().get_result(&mut conn)?;
        Ok(count)
    }
}
