//! HTTP error responses.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use derive_more::{Display, Error};
use serde_json::json;
use tictactoe_core::StoreError;
use tracing::error;

/// Error returned by an API handler.
#[derive(Debug, Clone, Display, Error)]
pub enum ApiError {
    /// The requested game does not exist.
    #[display("Game not found")]
    NotFound,

    /// The request body failed validation.
    #[display("{message}")]
    Invalid {
        /// Which check failed.
        message: String,
    },

    /// Storage failed. Details are logged, not returned.
    #[display("Internal server error")]
    Internal {
        /// Logged cause.
        message: String,
    },
}

impl ApiError {
    /// Status code for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Invalid { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { .. } => ApiError::NotFound,
            StoreError::Invalid { message } => ApiError::Invalid { message },
            StoreError::Unavailable { message } => ApiError::Internal { message },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::Internal { message } = &self {
            error!(error = %message, "Request failed");
        }
        (self.status(), Json(json!({ "error": self.to_string() }))).into_response()
    }
}
