//! Analytics events published when games end.
//!
//! The engine publishes these on NATS; the analytics consumer reads
//! them back. Both sides share this definition so the payload cannot
//! drift.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::Winner;
use crate::ids::GameId;

/// An event on the analytics stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(tag = "type")]
#[ts(export, export_to = "bindings/")]
pub enum AnalyticsEvent {
    /// A game reached its terminal state.
    #[serde(rename = "GAME_ENDED")]
    GameEnded(GameEnded),
}

/// Payload of a `GAME_ENDED` event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct GameEnded {
    /// The finished game.
    pub game_id: GameId,
    /// How the game ended.
    pub winner: Winner,
    /// Wall-clock seconds from pairing to the final state.
    pub duration_seconds: f64,
    /// When the event was produced.
    pub timestamp: DateTime<Utc>,
}

impl GameEnded {
    /// Build an event stamped with the current time.
    pub fn now(game_id: GameId, winner: Winner, duration_seconds: f64) -> Self {
        Self {
            game_id,
            winner,
            duration_seconds,
            timestamp: Utc::now(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn game_ended_is_tagged_and_flat() {
        let event = AnalyticsEvent::GameEnded(GameEnded::now(GameId::new(), Winner::Draw, 12.5));
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["type"], "GAME_ENDED");
        assert_eq!(value["winner"], "Draw");
        assert_eq!(value["duration_seconds"], 12.5);
        assert!(value["game_id"].is_string());
    }

    #[test]
    fn game_ended_parses_back() {
        let event = AnalyticsEvent::GameEnded(GameEnded::now(GameId::new(), Winner::PlayerA, 3.0));
        let bytes = serde_json::to_vec(&event).unwrap();
        let parsed: AnalyticsEvent = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(parsed, event);
    }
}
