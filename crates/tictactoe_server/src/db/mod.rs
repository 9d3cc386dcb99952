//! Database persistence layer for the current game.

mod error;
mod models;
mod repository;
mod schema; // Diesel generated schema - internal use only
mod store;

pub use error::DbError;
pub use models::{GameChanges, GameRow, NewGameRow};
pub use repository::{GameRepository, MIGRATIONS};
