//! REST endpoint handlers.
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET` | `/api/leaderboard` | Top players by wins |
//! | `GET` | `/api/status` | Live counts and lifetime counters |
//! | `GET` | `/health` | Liveness probe |

use std::sync::Arc;

use axum::Json;
use axum::extract::{Query, State};
use dropline_core::StatsSnapshot;
use dropline_db::{LEADERBOARD_SIZE, LeaderboardRow, LeaderboardStore};
use tracing::warn;

use crate::error::ApiError;
use crate::state::AppState;

/// Largest `limit` accepted by `GET /api/leaderboard`.
const MAX_LEADERBOARD_LIMIT: i64 = 100;

/// Query parameters for `GET /api/leaderboard`.
#[derive(Debug, serde::Deserialize)]
pub struct LeaderboardQuery {
    /// Number of rows to return (default 10, at most 100).
    pub limit: Option<i64>,
}

/// Top players by wins, best first.
///
/// Returns an empty list when no database is configured or the query
/// fails; the leaderboard is best-effort and never an error for clients.
///
/// # Errors
///
/// Returns [`ApiError::InvalidQuery`] if `limit` is out of range.
pub async fn leaderboard(
    State(state): State<Arc<AppState>>,
    Query(query): Query<LeaderboardQuery>,
) -> Result<Json<Vec<LeaderboardRow>>, ApiError> {
    let limit = query.limit.unwrap_or(LEADERBOARD_SIZE);
    if !(1..=MAX_LEADERBOARD_LIMIT).contains(&limit) {
        return Err(ApiError::InvalidQuery(format!(
            "limit must be between 1 and {MAX_LEADERBOARD_LIMIT}"
        )));
    }

    let Some(pool) = state.leaderboard.as_ref() else {
        return Ok(Json(Vec::new()));
    };
    match LeaderboardStore::new(pool.pool()).top(limit).await {
        Ok(rows) => Ok(Json(rows)),
        Err(e) => {
            warn!(error = %e, "leaderboard query failed");
            Ok(Json(Vec::new()))
        }
    }
}

/// Live registry counts and lifetime game counters.
pub async fn status(State(state): State<Arc<AppState>>) -> Json<StatsSnapshot> {
    Json(state.coordinator.stats().await)
}

/// Liveness probe.
pub async fn health() -> &'static str {
    "ok"
}
