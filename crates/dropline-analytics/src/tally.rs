//! Running totals over finished games.

use dropline_types::{AnalyticsEvent, GameEnded, Winner};
use serde_json::Value;

use crate::error::AnalyticsError;

/// Live statistics across every event seen so far.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GameTally {
    /// Games seen.
    pub total_games: u64,
    /// Games won by `P1`.
    pub player_a_wins: u64,
    /// Games won by `P2`.
    pub player_b_wins: u64,
    /// Drawn games.
    pub draws: u64,
    total_duration_seconds: f64,
}

impl GameTally {
    /// Fold one finished game into the totals.
    pub fn record(&mut self, event: &GameEnded) {
        self.total_games = self.total_games.saturating_add(1);
        let bucket = match event.winner {
            Winner::PlayerA => &mut self.player_a_wins,
            Winner::PlayerB => &mut self.player_b_wins,
            Winner::Draw => &mut self.draws,
        };
        *bucket = bucket.saturating_add(1);
        if event.duration_seconds.is_finite() && event.duration_seconds >= 0.0 {
            self.total_duration_seconds += event.duration_seconds;
        }
    }

    /// Mean game length in seconds, once at least one game was seen.
    #[allow(clippy::cast_precision_loss)]
    pub fn mean_duration_seconds(&self) -> Option<f64> {
        (self.total_games > 0).then(|| self.total_duration_seconds / self.total_games as f64)
    }
}

/// Decode one message payload.
///
/// Returns `Ok(None)` for well-formed events of a type this consumer does
/// not track.
pub fn decode(payload: &[u8]) -> Result<Option<GameEnded>, AnalyticsError> {
    let value: Value = serde_json::from_slice(payload)?;
    if value.get("type").and_then(Value::as_str) != Some("GAME_ENDED") {
        return Ok(None);
    }
    let AnalyticsEvent::GameEnded(event) = serde_json::from_value(value)?;
    Ok(Some(event))
}
