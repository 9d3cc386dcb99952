//! Single-writer save queue.
//!
//! Updates for a session are persisted one at a time by a dedicated task, in
//! submission order. When several saves are waiting, only the newest is
//! written; the others resolve as [`SaveAck::Superseded`] because the newer
//! save already carries the full state.

use crate::error::StoreError;
use crate::store::{GameFields, GameId, GameRecord, GameStore};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, instrument, warn};

/// How a submitted save was resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveAck {
    /// The save was written; the stored record is returned.
    Saved(GameRecord),
    /// A newer save was queued behind this one and written instead.
    Superseded,
}

type AckSender = oneshot::Sender<Result<SaveAck, StoreError>>;

#[derive(Debug)]
struct SaveRequest {
    id: GameId,
    fields: GameFields,
    ack: AckSender,
}

/// Handle to a save that has been queued.
#[derive(Debug)]
pub struct PendingSave {
    rx: oneshot::Receiver<Result<SaveAck, StoreError>>,
}

impl PendingSave {
    /// Waits for the writer to resolve this save.
    ///
    /// # Errors
    ///
    /// Returns the store's error, or [`StoreError::Unavailable`] if the
    /// writer task is gone.
    pub async fn wait(self) -> Result<SaveAck, StoreError> {
        match self.rx.await {
            Ok(result) => result,
            Err(_) => Err(StoreError::unavailable("save queue stopped")),
        }
    }
}

/// Sender side of the save queue. Dropping it stops the writer once the
/// queued saves are flushed.
#[derive(Debug, Clone)]
pub struct SaveQueue {
    tx: mpsc::UnboundedSender<SaveRequest>,
}

impl SaveQueue {
    /// Spawns the writer task on the current Tokio runtime.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime.
    #[instrument(skip(store))]
    pub fn spawn<S>(store: Arc<S>) -> Self
    where
        S: GameStore + ?Sized + 'static,
    {
        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(run_writer(store, rx));
        info!("Save queue started");
        Self { tx }
    }

    /// Queues a save of `fields` to record `id`.
    #[instrument(skip(self, fields))]
    pub fn submit(&self, id: GameId, fields: GameFields) -> PendingSave {
        let (ack, rx) = oneshot::channel();
        let request = SaveRequest { id, fields, ack };
        if let Err(mpsc::error::SendError(request)) = self.tx.send(request) {
            warn!(game_id = %id, "Save queue closed, dropping save");
            let _ = request
                .ack
                .send(Err(StoreError::unavailable("save queue stopped")));
        }
        PendingSave { rx }
    }
}

async fn run_writer<S>(store: Arc<S>, mut rx: mpsc::UnboundedReceiver<SaveRequest>)
where
    S: GameStore + ?Sized,
{
    while let Some(mut request) = rx.recv().await {
        while let Ok(newer) = rx.try_recv() {
            debug!(game_id = %request.id, "Save superseded by newer state");
            let _ = request.ack.send(Ok(SaveAck::Superseded));
            request = newer;
        }

        let SaveRequest { id, fields, ack } = request;
        let result = store.update(id, fields).await.map(SaveAck::Saved);
        match &result {
            Ok(_) => debug!(game_id = %id, "Save written"),
            Err(e) => warn!(game_id = %id, error = %e, "Save failed"),
        }
        // The submitter may have stopped waiting.
        let _ = ack.send(result);
    }
    debug!("Save queue closed");
}
