//! Board engine and heuristic opponent for the Dropline game server.
//!
//! Everything here is pure game logic with no I/O and no locking. The
//! coordinator wraps a [`Board`] in a session lock and calls into it.
//!
//! # Modules
//!
//! - [`board`] -- Grid state, gravity drops and line detection
//! - [`opponent`] -- Win/block/center heuristic for the AI seat
//! - [`error`] -- Board configuration errors

pub mod board;
pub mod error;
pub mod opponent;

pub use board::{Board, BoardDims, Cell};
pub use error::BoardError;
pub use opponent::select_move;
