//! Messages exchanged with game clients over the `WebSocket`.
//!
//! Every frame is a JSON object with a `type` tag. Field spellings match
//! what the browser client reads (`gameId`, `P1`/`P2`).

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::{Role, Winner};
use crate::ids::{GameId, Username};

/// A message sent by a client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(tag = "type", rename_all = "lowercase")]
#[ts(export, export_to = "bindings/")]
pub enum ClientMessage {
    /// Drop a disc into a column.
    Move {
        /// Zero-based column index. Older clients send `col`.
        #[serde(alias = "col")]
        column: i64,
    },
}

/// Why a game ended early.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum ForfeitReason {
    /// The other participant's connection closed mid-game.
    OpponentDisconnected,
}

/// A message pushed to a client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(tag = "type", rename_all = "lowercase")]
#[ts(export, export_to = "bindings/")]
pub enum ServerMessage {
    /// A game has been created and this client is seated.
    Start {
        /// The new game.
        #[serde(rename = "gameId")]
        game_id: GameId,
        /// The other participant (may be the AI).
        opponent: Username,
        /// Seat that moves first.
        turn: Role,
        /// Seat assigned to the recipient.
        you: Role,
    },
    /// A disc was placed.
    Update {
        /// The game the move belongs to.
        #[serde(rename = "gameId")]
        game_id: GameId,
        /// Row the disc landed in (0 is the top row).
        row: usize,
        /// Column the disc was dropped into.
        column: usize,
        /// Seat that made the move.
        player: Role,
        /// Seat to move next. Unchanged once the game is over.
        turn: Role,
        /// Set once the game is over.
        winner: Option<Winner>,
    },
    /// The game ended because a participant left.
    Forfeit {
        /// The abandoned game.
        #[serde(rename = "gameId")]
        game_id: GameId,
        /// The remaining participant's seat.
        winner: Winner,
        /// Why the game ended.
        reason: ForfeitReason,
    },
    /// A move or frame from this client was not applied.
    Rejected {
        /// Human-readable explanation.
        reason: String,
    },
    /// The connection was refused; the server closes it after this frame.
    Error {
        /// Human-readable explanation.
        message: String,
    },
}

impl ServerMessage {
    /// The message's `type` tag, for log fields.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Start { .. } => "start",
            Self::Update { .. } => "update",
            Self::Forfeit { .. } => "forfeit",
            Self::Rejected { .. } => "rejected",
            Self::Error { .. } => "error",
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn move_accepts_column_and_col() {
        let a: ClientMessage = serde_json::from_value(json!({"type": "move", "column": 3})).unwrap();
        let b: ClientMessage = serde_json::from_value(json!({"type": "move", "col": 3})).unwrap();
        assert_eq!(a, ClientMessage::Move { column: 3 });
        assert_eq!(a, b);
    }

    #[test]
    fn unknown_type_is_rejected() {
        let parsed = serde_json::from_value::<ClientMessage>(json!({"type": "chat", "text": "hi"}));
        assert!(parsed.is_err());
    }

    #[test]
    fn start_uses_client_field_names() {
        let game_id = GameId::new();
        let msg = ServerMessage::Start {
            game_id,
            opponent: Username::ai(),
            turn: Role::PlayerA,
            you: Role::PlayerA,
        };
        let value = serde_json::to_value(&msg).unwrap();
        assert_eq!(
            value,
            json!({
                "type": "start",
                "gameId": game_id.to_string(),
                "opponent": "Bot",
                "turn": "P1",
                "you": "P1",
            })
        );
    }

    #[test]
    fn update_serializes_null_winner_while_running() {
        let msg = ServerMessage::Update {
            game_id: GameId::new(),
            row: 5,
            column: 3,
            player: Role::PlayerA,
            turn: Role::PlayerB,
            winner: None,
        };
        let value = serde_json::to_value(&msg).unwrap();
        assert_eq!(value["type"], "update");
        assert_eq!(value["row"], 5);
        assert_eq!(value["player"], "P1");
        assert_eq!(value["turn"], "P2");
        assert!(value["winner"].is_null());
        assert_eq!(msg.kind(), "update");
    }

    #[test]
    fn forfeit_carries_reason() {
        let msg = ServerMessage::Forfeit {
            game_id: GameId::new(),
            winner: Winner::PlayerB,
            reason: ForfeitReason::OpponentDisconnected,
        };
        let value = serde_json::to_value(&msg).unwrap();
        assert_eq!(value["winner"], "P2");
        assert_eq!(value["reason"], "opponent_disconnected");
    }
}
