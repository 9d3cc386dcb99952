//! [`GameStore`] client for the REST API.

use async_trait::async_trait;
use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use tictactoe_core::{GameFields, GameId, GameInit, GameRecord, GameStore, StoreError};
use tracing::{debug, instrument, warn};

/// Store that persists through a running `tictactoe serve` instance.
#[derive(Debug, Clone)]
pub struct RestStore {
    base_url: String,
    client: reqwest::Client,
}

impl RestStore {
    /// Creates a client for the server at `base_url`, e.g.
    /// `http://localhost:5000`.
    #[instrument(skip(base_url))]
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        debug!(base_url = %base_url, "Creating REST store");
        Self {
            base_url,
            client: reqwest::Client::new(),
        }
    }

    /// Returns the server URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

fn transport(err: reqwest::Error) -> StoreError {
    warn!(error = %err, "Game server request failed");
    StoreError::unavailable(err)
}

/// Maps error statuses onto store errors and decodes success bodies.
async fn decode<T: DeserializeOwned>(
    response: Response,
    id: Option<GameId>,
) -> Result<T, StoreError> {
    let status = response.status();
    if status.is_success() {
        return response.json::<T>().await.map_err(transport);
    }

    let body = response.text().await.unwrap_or_default();
    match (status, id) {
        (StatusCode::NOT_FOUND, Some(id)) => Err(StoreError::NotFound { id }),
        (StatusCode::UNPROCESSABLE_ENTITY, _) => Err(StoreError::invalid(body)),
        _ => {
            warn!(%status, body = %body, "Game server returned an error");
            let message = format!("server returned {}: {}", status, body);
            Err(StoreError::unavailable(message))
        }
    }
}

#[async_trait]
impl GameStore for RestStore {
    #[instrument(skip(self))]
    async fn fetch_latest(&self) -> Result<Option<GameRecord>, StoreError> {
        let response = self
            .client
            .get(self.url("/api/games/latest"))
            .send()
            .await
            .map_err(transport)?;
        decode(response, None).await
    }

    #[instrument(skip(self))]
    async fn fetch(&self, id: GameId) -> Result<Option<GameRecord>, StoreError> {
        let response = self
            .client
            .get(self.url(&format!("/api/games/{}", id)))
            .send()
            .await
            .map_err(transport)?;
        match decode(response, Some(id)).await {
            Ok(record) => Ok(Some(record)),
            Err(StoreError::NotFound { .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    #[instrument(skip(self, init))]
    async fn replace_all_with(&self, init: GameInit) -> Result<GameRecord, StoreError> {
        let response = self
            .client
            .post(self.url("/api/games"))
            .json(&init)
            .send()
            .await
            .map_err(transport)?;
        decode(response, None).await
    }

    #[instrument(skip(self, fields))]
    async fn update(&self, id: GameId, fields: GameFields) -> Result<GameRecord, StoreError> {
        let response = self
            .client
            .put(self.url(&format!("/api/games/{}", id)))
            .json(&fields)
            .send()
            .await
            .map_err(transport)?;
        decode(response, Some(id)).await
    }
}
