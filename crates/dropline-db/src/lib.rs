//! Data layer for the Dropline game server (`PostgreSQL`).
//!
//! Holds the leaderboard: one row per player with their win count. The
//! game server writes to it at the end of a game and the HTTP API reads
//! the top of it. Nothing in game play waits on this crate.
//!
//! # Modules
//!
//! - [`postgres`] -- `PostgreSQL` connection pool and configuration
//! - [`leaderboard_store`] -- Win increments and top-N queries
//! - [`error`] -- Shared error types

pub mod error;
pub mod leaderboard_store;
pub mod postgres;

pub use error::DbError;
pub use leaderboard_store::{LEADERBOARD_SIZE, LeaderboardRow, LeaderboardStore};
pub use postgres::{PostgresConfig, PostgresPool};
