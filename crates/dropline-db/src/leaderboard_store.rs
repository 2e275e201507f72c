//! Win counts per username.
//!
//! Only human winners are ever written; the AI never appears here.

use serde::Serialize;
use sqlx::PgPool;

use crate::error::DbError;

/// Number of rows served by the public leaderboard.
pub const LEADERBOARD_SIZE: i64 = 10;

/// Operations on the `users` table.
pub struct LeaderboardStore<'a> {
    pool: &'a PgPool,
}

impl<'a> LeaderboardStore<'a> {
    /// Create a store bound to a connection pool.
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Add one win for `username`, creating the row on first win.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the upsert fails.
    pub async fn increment_win(&self, username: &str) -> Result<(), DbError> {
        sqlx::query(
            r"INSERT INTO users (username, wins)
              VALUES ($1, 1)
              ON CONFLICT (username) DO UPDATE SET wins = users.wins + 1",
        )
        .bind(username)
        .execute(self.pool)
        .await?;
        Ok(())
    }

    /// The `limit` players with the most wins, best first.
    ///
    /// Ties are broken by username so the order is stable.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the query fails.
    pub async fn top(&self, limit: i64) -> Result<Vec<LeaderboardRow>, DbError> {
        let rows = sqlx::query_as::<_, LeaderboardRow>(
            r"SELECT username, wins FROM users
              ORDER BY wins DESC, username ASC
              LIMIT $1",
        )
        .bind(limit)
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }

    /// Wins recorded for one player, if any.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the query fails.
    pub async fn wins_of(&self, username: &str) -> Result<Option<i32>, DbError> {
        let row: Option<(i32,)> = sqlx::query_as("SELECT wins FROM users WHERE username = $1")
            .bind(username)
            .fetch_optional(self.pool)
            .await?;
        Ok(row.map(|(wins,)| wins))
    }
}

/// One leaderboard line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct LeaderboardRow {
    /// Player name.
    pub username: String,
    /// Games won.
    pub wins: i32,
}
