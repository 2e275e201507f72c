//! Shared type definitions for the Dropline game server.
//!
//! This crate is the single source of truth for identifiers, seats, wire
//! messages and analytics payloads used across the workspace. Wire types
//! flow downstream to `TypeScript` via `ts-rs` for the browser client.
//!
//! # Modules
//!
//! - [`ids`] -- Game and connection identifiers, usernames
//! - [`enums`] -- Seats, results and game lifecycle
//! - [`protocol`] -- Client and server `WebSocket` messages
//! - [`events`] -- Analytics stream payloads

pub mod enums;
pub mod events;
pub mod ids;
pub mod protocol;

// Re-export all public types at crate root for convenience.
pub use enums::{GameStatus, Role, Winner};
pub use events::{AnalyticsEvent, GameEnded};
pub use ids::{AI_USERNAME, ConnectionId, GameId, Username};
pub use protocol::{ClientMessage, ForfeitReason, ServerMessage};
