//! Error types for persistence and session control.

use crate::store::GameId;
use derive_more::{Display, Error};

/// Failure reported by a [`GameStore`](crate::GameStore).
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
pub enum StoreError {
    /// Transport or storage failure. Local state is still usable.
    #[display("Persistence unavailable: {message}")]
    Unavailable {
        /// What went wrong.
        message: String,
    },

    /// An update targeted an identifier with no record.
    #[display("Game {id} not found")]
    NotFound {
        /// The missing identifier.
        id: GameId,
    },

    /// A record or payload failed validation.
    #[display("Invalid game record: {message}")]
    Invalid {
        /// Which check failed.
        message: String,
    },
}

impl StoreError {
    /// Creates an [`StoreError::Unavailable`] from any displayable cause.
    pub fn unavailable(message: impl std::fmt::Display) -> Self {
        Self::Unavailable {
            message: message.to_string(),
        }
    }

    /// Creates an [`StoreError::Invalid`] from any displayable cause.
    pub fn invalid(message: impl std::fmt::Display) -> Self {
        Self::Invalid {
            message: message.to_string(),
        }
    }
}

/// Failure of a session controller operation.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
pub enum SessionError {
    /// A move was attempted before any session was loaded or started.
    #[display("No game session established; load or start one first")]
    NoSession,

    /// The store rejected or failed a call.
    #[display("{source}")]
    Store {
        /// Underlying store failure.
        source: StoreError,
    },
}

impl SessionError {
    /// Returns the store failure, if this error wraps one.
    pub fn store_error(&self) -> Option<&StoreError> {
        match self {
            SessionError::Store { source } => Some(source),
            SessionError::NoSession => None,
        }
    }
}

impl From<StoreError> for SessionError {
    fn from(source: StoreError) -> Self {
        Self::Store { source }
    }
}
