//! HTTP and `WebSocket` surface for the Dropline game server.
//!
//! Exposes the game socket (`/ws`), the leaderboard, coordinator stats
//! and a health probe. All game logic lives in `dropline-core`; this
//! crate only frames messages and routes requests.
//!
//! # Modules
//!
//! - [`router`] -- Router assembly with CORS and tracing layers
//! - [`ws`] -- Game `WebSocket` handler
//! - [`handlers`] -- REST endpoints
//! - [`server`] -- Listener lifecycle
//! - [`state`] -- Shared handler state
//! - [`error`] -- API error responses

pub mod error;
pub mod handlers;
pub mod router;
pub mod server;
pub mod state;
pub mod ws;

pub use error::ApiError;
pub use router::build_router;
pub use server::{ServerError, start_server};
pub use state::AppState;
