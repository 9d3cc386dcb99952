//! Game session controller.
//!
//! Owns the live [`GameSession`] and keeps the store's copy in step with it.
//! A session must be established with [`GameController::load_latest_or_create`]
//! or [`GameController::start_new_session`] before moves are accepted.

use crate::board::{Board, Player};
use crate::error::SessionError;
use crate::outcome::Outcome;
use crate::queue::{SaveAck, SaveQueue};
use crate::session::GameSession;
use crate::store::{GameId, GameInit, GameStore};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Drives one game session against a [`GameStore`].
pub struct GameController<S: GameStore + ?Sized + 'static> {
    store: Arc<S>,
    saves: SaveQueue,
    session: GameSession,
}

impl<S: GameStore + ?Sized + 'static> GameController<S> {
    /// Creates a controller with an empty, unsaved session.
    ///
    /// Spawns the save queue, so this must run inside a Tokio runtime.
    #[instrument(skip(store))]
    pub fn new(store: Arc<S>) -> Self {
        let saves = SaveQueue::spawn(store.clone());
        Self {
            store,
            saves,
            session: GameSession::new(),
        }
    }

    /// Returns the backing store.
    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Returns the live session.
    pub fn session(&self) -> &GameSession {
        &self.session
    }

    /// Returns the current board.
    pub fn board(&self) -> &Board {
        self.session.board()
    }

    /// Returns the player to move.
    pub fn turn(&self) -> Player {
        self.session.turn()
    }

    /// Returns the current outcome.
    pub fn outcome(&self) -> &Outcome {
        self.session.outcome()
    }

    /// Returns the persisted identifier of the live session.
    pub fn game_id(&self) -> Option<GameId> {
        self.session.id()
    }

    /// Returns true once the game has been won or drawn.
    pub fn is_terminal(&self) -> bool {
        self.session.is_terminal()
    }

    /// Returns true once any square holds a mark.
    pub fn has_started(&self) -> bool {
        self.session.has_started()
    }

    /// Headline for the current state.
    pub fn status_text(&self) -> String {
        self.session.status_text()
    }

    /// Discards every persisted game and starts a fresh one.
    ///
    /// The live session is replaced only once the store has created the new
    /// record; on failure the previous session is kept.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Store`] if the store call fails.
    #[instrument(skip(self), fields(previous = ?self.session.id()))]
    pub async fn start_new_session(&mut self) -> Result<GameSession, SessionError> {
        let record = self
            .store
            .replace_all_with(GameInit::initial())
            .await
            .inspect_err(|e| warn!(error = %e, "Failed to create game"))?;

        self.session = GameSession::with_id(record.id);
        info!(game_id = %record.id, "New game session started");
        Ok(self.session.clone())
    }

    /// Resumes the most recently updated game, or starts one if none exist.
    ///
    /// A failed fetch is returned rather than treated as "no game": falling
    /// back to [`start_new_session`](Self::start_new_session) there would
    /// discard a stored game the store merely failed to read. Callers that
    /// want a fresh game anyway can call `start_new_session` on error.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Store`] if the store call fails; the current
    /// session is left unchanged.
    #[instrument(skip(self))]
    pub async fn load_latest_or_create(&mut self) -> Result<GameSession, SessionError> {
        let latest = self
            .store
            .fetch_latest()
            .await
            .inspect_err(|e| warn!(error = %e, "Failed to fetch latest game"))?;

        match latest {
            Some(record) => {
                self.session = GameSession::from_record(&record);
                info!(
                    game_id = %record.id,
                    turns = self.session.turns_taken(),
                    outcome = %self.session.outcome(),
                    "Resumed game session"
                );
                Ok(self.session.clone())
            }
            None => {
                debug!("No stored game, starting a new one");
                self.start_new_session().await
            }
        }
    }

    /// Places the current player's mark at `index` and persists the result.
    ///
    /// Returns `Ok(None)` without touching state or the store when the game
    /// is over, `index` is off the board, or the square is taken.
    ///
    /// # Errors
    ///
    /// - [`SessionError::NoSession`] if no session has been established.
    /// - [`SessionError::Store`] if persisting fails. The move stays applied
    ///   in memory and is not retried.
    #[instrument(skip(self), fields(game_id = ?self.session.id(), player = %self.session.turn()))]
    pub async fn apply_move(&mut self, index: usize) -> Result<Option<GameSession>, SessionError> {
        if let Err(rejection) = self.session.check_move(index) {
            debug!(%rejection, "Move rejected");
            return Ok(None);
        }
        let id = self.session.id().ok_or(SessionError::NoSession)?;

        let outcome = self.session.place_unchecked(index);
        info!(index, %outcome, "Move applied");

        let ack = self
            .saves
            .submit(id, self.session.fields())
            .wait()
            .await
            .inspect_err(|e| warn!(error = %e, "Failed to persist move, keeping local state"))?;
        if ack == SaveAck::Superseded {
            debug!("Save superseded by a newer one");
        }

        Ok(Some(self.session.clone()))
    }

    /// Mount hook for the presentation layer.
    ///
    /// # Errors
    ///
    /// See [`load_latest_or_create`](Self::load_latest_or_create).
    pub async fn on_mount(&mut self) -> Result<GameSession, SessionError> {
        self.load_latest_or_create().await
    }

    /// Cell click hook for the presentation layer.
    ///
    /// # Errors
    ///
    /// See [`apply_move`](Self::apply_move).
    pub async fn on_cell_clicked(
        &mut self,
        index: usize,
    ) -> Result<Option<GameSession>, SessionError> {
        self.apply_move(index).await
    }

    /// Restart button hook for the presentation layer.
    ///
    /// # Errors
    ///
    /// See [`start_new_session`](Self::start_new_session).
    pub async fn on_restart_clicked(&mut self) -> Result<GameSession, SessionError> {
        self.start_new_session().await
    }
}

impl<S: GameStore + ?Sized + 'static> std::fmt::Debug for GameController<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GameController")
            .field("session", &self.session)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;
    use crate::memory::MemoryStore;

    #[tokio::test]
    async fn test_move_before_session_is_refused() {
        let store = Arc::new(MemoryStore::new());
        let mut controller = GameController::new(store.clone());

        assert_eq!(controller.apply_move(0).await, Err(SessionError::NoSession));
        assert!(!controller.has_started());
        assert_eq!(store.write_count(), 0);
    }

    #[tokio::test]
    async fn test_failed_restart_keeps_previous_session() {
        let store = Arc::new(MemoryStore::new());
        let mut controller = GameController::new(store.clone());
        controller.start_new_session().await.unwrap();
        controller.apply_move(4).await.unwrap();
        let before = controller.session().clone();

        store.set_offline(true);
        let result = controller.start_new_session().await;
        assert!(matches!(
            result,
            Err(SessionError::Store {
                source: StoreError::Unavailable { .. }
            })
        ));
        assert_eq!(controller.session(), &before);
    }

    #[tokio::test]
    async fn test_persist_failure_keeps_move() {
        let store = Arc::new(MemoryStore::new());
        let mut controller = GameController::new(store.clone());
        controller.start_new_session().await.unwrap();

        store.set_offline(true);
        let result = controller.apply_move(4).await;
        assert!(result.is_err());
        assert!(controller.has_started());
        assert_eq!(controller.turn(), Player::O);
    }

    #[tokio::test]
    async fn test_missing_record_surfaces_not_found() {
        let store = Arc::new(MemoryStore::new());
        let mut controller = GameController::new(store.clone());
        controller.start_new_session().await.unwrap();
        let stale = controller.game_id().unwrap();

        // Another writer restarted the game behind our back.
        store.replace_all_with(GameInit::initial()).await.unwrap();

        let err = controller.apply_move(0).await.unwrap_err();
        assert_eq!(err.store_error(), Some(&StoreError::NotFound { id: stale }));

        let resumed = controller.load_latest_or_create().await.unwrap();
        assert_ne!(resumed.id(), Some(stale));
        assert!(!resumed.has_started());
    }

    #[tokio::test]
    async fn test_rejection_is_checked_before_session() {
        let store = Arc::new(MemoryStore::new());
        let mut controller = GameController::new(store.clone());

        assert_eq!(controller.apply_move(9).await, Ok(None));
        assert_eq!(store.write_count(), 0);
    }

    #[tokio::test]
    async fn test_failed_load_does_not_create_game() {
        let store = Arc::new(MemoryStore::new());
        let mut controller = GameController::new(store.clone());
        controller.start_new_session().await.unwrap();
        controller.apply_move(0).await.unwrap();
        let before = controller.session().clone();
        let writes = store.write_count();

        store.set_offline(true);
        let result = controller.load_latest_or_create().await;
        assert!(matches!(result, Err(SessionError::Store { .. })));
        assert_eq!(controller.session(), &before);
        assert_eq!(store.write_count(), writes);

        store.set_offline(false);
        let records = store.records().await;
        assert_eq!(records.len(), 1);
        assert_eq!(Some(records[0].id), before.id());
    }
}
