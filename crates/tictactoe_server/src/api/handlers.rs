//! Request handlers for the game API.

use axum::Json;
use axum::extract::{Path, State};
use serde_json::{Value, json};
use tictactoe_core::{GameFields, GameId, GameRecord};
use tracing::{debug, info, instrument};

use crate::api::{ApiError, AppState};

/// Health check.
#[instrument]
pub async fn root() -> Json<Value> {
    Json(json!({ "message": "Tic-Tac-Toe API is running!" }))
}

/// Returns the most recently updated game, or `null`.
#[instrument(skip(state))]
pub async fn latest_game(
    State(state): State<AppState>,
) -> Result<Json<Option<GameRecord>>, ApiError> {
    let latest = state.store().fetch_latest().await?;
    debug!(found = latest.is_some(), "Latest game fetched");
    Ok(Json(latest))
}

/// Returns one game by identifier.
#[instrument(skip(state))]
pub async fn get_game(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<GameRecord>, ApiError> {
    state
        .store()
        .fetch(GameId::from(id))
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound)
}

/// Deletes every game and creates a new one from the body.
#[instrument(skip(state, fields))]
pub async fn create_game(
    State(state): State<AppState>,
    Json(fields): Json<GameFields>,
) -> Result<Json<GameRecord>, ApiError> {
    fields.validate()?;
    let record = state.store().replace_all_with(fields).await?;
    info!(game_id = %record.id, "Game created");
    Ok(Json(record))
}

/// Overwrites a game's board, turn and result.
#[instrument(skip(state, fields))]
pub async fn update_game(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(fields): Json<GameFields>,
) -> Result<Json<GameRecord>, ApiError> {
    fields.validate()?;
    let record = state.store().update(GameId::from(id), fields).await?;
    debug!(game_id = %record.id, "Game updated");
    Ok(Json(record))
}
