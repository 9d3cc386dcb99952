//! In-memory [`GameStore`] for tests and offline play.

use crate::error::StoreError;
use crate::store::{GameFields, GameId, GameInit, GameRecord, GameStore};
use async_trait::async_trait;
use chrono::{NaiveDateTime, Utc};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::sync::Mutex;
use tracing::{debug, instrument};

#[derive(Debug, Default)]
struct Inner {
    records: Vec<GameRecord>,
    next_id: i32,
}

/// Volatile store holding records behind a single lock.
///
/// Besides the store contract it counts calls and can be switched offline,
/// which makes it useful for exercising the controller's failure paths.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
    offline: AtomicBool,
    updates: AtomicUsize,
    writes: AtomicUsize,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent call fail with [`StoreError::Unavailable`]
    /// until switched back.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Number of successful `update` calls.
    pub fn update_count(&self) -> usize {
        self.updates.load(Ordering::SeqCst)
    }

    /// Number of `replace_all_with` and `update` calls attempted.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Snapshot of all records.
    pub async fn records(&self) -> Vec<GameRecord> {
        self.inner.lock().await.records.clone()
    }

    fn check_online(&self) -> Result<(), StoreError> {
        if self.offline.load(Ordering::SeqCst) {
            Err(StoreError::unavailable("memory store is offline"))
        } else {
            Ok(())
        }
    }
}

/// Current time, strictly after `floor` so updates always move forward.
fn now_after(floor: Option<NaiveDateTime>) -> NaiveDateTime {
    let now = Utc::now().naive_utc();
    match floor {
        Some(prev) if prev >= now => prev + chrono::Duration::microseconds(1),
        _ => now,
    }
}

#[async_trait]
impl GameStore for MemoryStore {
    #[instrument(skip(self))]
    async fn fetch_latest(&self) -> Result<Option<GameRecord>, StoreError> {
        self.check_online()?;
        let inner = self.inner.lock().await;
        Ok(inner
            .records
            .iter()
            .max_by_key(|r| (r.updated_at, r.id))
            .cloned())
    }

    #[instrument(skip(self))]
    async fn fetch(&self, id: GameId) -> Result<Option<GameRecord>, StoreError> {
        self.check_online()?;
        let inner = self.inner.lock().await;
        Ok(inner.records.iter().find(|r| r.id == id).cloned())
    }

    #[instrument(skip(self, init))]
    async fn replace_all_with(&self, init: GameInit) -> Result<GameRecord, StoreError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.check_online()?;
        init.validate()?;

        let mut inner = self.inner.lock().await;
        let floor = inner.records.iter().map(|r| r.updated_at).max();
        inner.next_id += 1;
        let stamp = now_after(floor);
        let record = GameRecord {
            id: GameId::from(inner.next_id),
            board: init.board,
            is_x_next: init.is_x_next,
            winner: init.winner,
            winning_squares: init.winning_squares,
            created_at: stamp,
            updated_at: stamp,
        };
        inner.records = vec![record.clone()];
        debug!(game_id = %record.id, "Replaced all games");
        Ok(record)
    }

    #[instrument(skip(self, fields))]
    async fn update(&self, id: GameId, fields: GameFields) -> Result<GameRecord, StoreError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.check_online()?;
        fields.validate()?;

        let mut inner = self.inner.lock().await;
        let record = inner
            .records
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or(StoreError::NotFound { id })?;
        record.updated_at = now_after(Some(record.updated_at));
        record.board = fields.board;
        record.is_x_next = fields.is_x_next;
        record.winner = fields.winner;
        record.winning_squares = fields.winning_squares;
        self.updates.fetch_add(1, Ordering::SeqCst);
        debug!(game_id = %id, "Updated game");
        Ok(record.clone())
    }
}
