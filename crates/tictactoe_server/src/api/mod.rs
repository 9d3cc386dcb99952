//! REST API over the game store.
//!
//! | Route | Handler |
//! |-------|---------|
//! | `GET /` | health check |
//! | `GET /api/games/latest` | latest game or `null` |
//! | `GET /api/games/{id}` | one game |
//! | `POST /api/games` | replace all games with a new one |
//! | `PUT /api/games/{id}` | update a game |

mod error;
mod handlers;

pub use error::ApiError;

use axum::Router;
use axum::routing::{get, post};
use std::sync::Arc;
use tictactoe_core::GameStore;
use tower_http::cors::CorsLayer;
use tracing::instrument;

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    store: Arc<dyn GameStore>,
}

impl AppState {
    /// Creates state serving the given store.
    pub fn new(store: Arc<dyn GameStore>) -> Self {
        Self { store }
    }

    /// Returns the store.
    pub fn store(&self) -> &Arc<dyn GameStore> {
        &self.store
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState").finish_non_exhaustive()
    }
}

/// Builds the API router.
///
/// CORS is permissive so a browser client on another origin can call it.
#[instrument(skip(state))]
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::root))
        .route("/api/games", post(handlers::create_game))
        .route("/api/games/latest", get(handlers::latest_game))
        .route(
            "/api/games/{id}",
            get(handlers::get_game).put(handlers::update_game),
        )
        .layer(CorsLayer::permissive())
        .with_state(state)
}
