//! Leaderboard sink backed by `PostgreSQL`.
//!
//! Each win is an upsert run on its own task. A failed write is logged
//! and forgotten.

use dropline_core::LeaderboardSink;
use dropline_db::{LeaderboardStore, PostgresPool};
use dropline_types::Username;
use tracing::{debug, warn};

/// Credits human winners in the `users` table.
pub struct PostgresLeaderboardSink {
    pool: PostgresPool,
}

impl PostgresLeaderboardSink {
    /// Create a sink writing through `pool`.
    pub const fn new(pool: PostgresPool) -> Self {
        Self { pool }
    }
}

impl LeaderboardSink for PostgresLeaderboardSink {
    fn record_win(&self, username: &Username) {
        let pool = self.pool.clone();
        let username = username.clone();
        tokio::spawn(async move {
            let store = LeaderboardStore::new(pool.pool());
            match store.increment_win(username.as_str()).await {
                Ok(()) => debug!(player = %username, "leaderboard win recorded"),
                Err(e) => warn!(player = %username, error = %e, "failed to record leaderboard win"),
            }
        });
    }
}
