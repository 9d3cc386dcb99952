//! [`GameStore`] implementation backed by the SQLite repository.

use async_trait::async_trait;
use tictactoe_core::{GameFields, GameId, GameInit, GameRecord, GameStore, StoreError};
use tracing::{error, instrument};

use crate::db::{DbError, GameRepository};

impl GameRepository {
    /// Runs a repository call on the blocking thread pool.
    async fn blocking<T, F>(&self, op: F) -> Result<T, StoreError>
    where
        T: Send + 'static,
        F: FnOnce(&GameRepository) -> Result<T, DbError> + Send + 'static,
    {
        let repo = self.clone();
        tokio::task::spawn_blocking(move || op(&repo))
            .await
            .map_err(|e| {
                error!(error = %e, "Database task failed");
                StoreError::unavailable(format!("database task failed: {}", e))
            })?
            .map_err(|e| {
                error!(error = %e, "Database call failed");
                StoreError::from(e)
            })
    }
}

#[async_trait]
impl GameStore for GameRepository {
    #[instrument(skip(self))]
    async fn fetch_latest(&self) -> Result<Option<GameRecord>, StoreError> {
        self.blocking(|repo| repo.latest_game()).await
    }

    #[instrument(skip(self))]
    async fn fetch(&self, id: GameId) -> Result<Option<GameRecord>, StoreError> {
        self.blocking(move |repo| repo.get_game(id)).await
    }

    #[instrument(skip(self, init))]
    async fn replace_all_with(&self, init: GameInit) -> Result<GameRecord, StoreError> {
        init.validate()?;
        self.blocking(move |repo| repo.create_game(&init)).await
    }

    #[instrument(skip(self, fields))]
    async fn update(&self, id: GameId, fields: GameFields) -> Result<GameRecord, StoreError> {
        fields.validate()?;
        self.blocking(move |repo| repo.update_game(id, &fields))
            .await?
            .ok_or(StoreError::NotFound { id })
    }
}
