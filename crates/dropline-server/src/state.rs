//! Shared application state for the HTTP and `WebSocket` handlers.

use std::sync::Arc;

use dropline_core::{Coordinator, DEFAULT_OUTBOUND_CAPACITY};
use dropline_db::PostgresPool;

/// State shared by every handler.
#[derive(Debug)]
pub struct AppState {
    /// The game coordinator every socket registers with.
    pub coordinator: Arc<Coordinator>,
    /// Leaderboard database, when configured.
    pub leaderboard: Option<PostgresPool>,
    /// Capacity of each connection's outbound queue.
    pub outbound_capacity: usize,
}

impl AppState {
    /// State with no leaderboard database and the default queue size.
    pub const fn new(coordinator: Arc<Coordinator>) -> Self {
        Self {
            coordinator,
            leaderboard: None,
            outbound_capacity: DEFAULT_OUTBOUND_CAPACITY,
        }
    }

    /// Serve the leaderboard from `pool`.
    #[must_use]
    pub fn with_leaderboard(mut self, pool: PostgresPool) -> Self {
        self.leaderboard = Some(pool);
        self
    }

    /// Override the outbound queue capacity.
    #[must_use]
    pub const fn with_outbound_capacity(mut self, capacity: usize) -> Self {
        self.outbound_capacity = capacity;
        self
    }
}
