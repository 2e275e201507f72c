//! Enumeration types shared by the board engine, the coordinator and the
//! wire protocol.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// One of the two seats at the board.
///
/// `PlayerA` always moves first. On the wire the seats are spelled `P1`
/// and `P2`, which is what the browser client renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum Role {
    /// First player.
    #[serde(rename = "P1")]
    PlayerA,
    /// Second player.
    #[serde(rename = "P2")]
    PlayerB,
}

impl Role {
    /// The seat across the board from this one.
    pub const fn opponent(self) -> Self {
        match self {
            Self::PlayerA => Self::PlayerB,
            Self::PlayerB => Self::PlayerA,
        }
    }

    /// Wire spelling of the seat.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PlayerA => "P1",
            Self::PlayerB => "P2",
        }
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Final result of a game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum Winner {
    /// `PlayerA` connected four (or the opponent forfeited).
    #[serde(rename = "P1")]
    PlayerA,
    /// `PlayerB` connected four (or the opponent forfeited).
    #[serde(rename = "P2")]
    PlayerB,
    /// The board filled up with no line.
    Draw,
}

impl Winner {
    /// The winning seat, or `None` for a draw.
    pub const fn role(self) -> Option<Role> {
        match self {
            Self::PlayerA => Some(Role::PlayerA),
            Self::PlayerB => Some(Role::PlayerB),
            Self::Draw => None,
        }
    }

    /// Wire spelling of the result.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PlayerA => "P1",
            Self::PlayerB => "P2",
            Self::Draw => "Draw",
        }
    }
}

impl From<Role> for Winner {
    fn from(role: Role) -> Self {
        match role {
            Role::PlayerA => Self::PlayerA,
            Role::PlayerB => Self::PlayerB,
        }
    }
}

impl core::fmt::Display for Winner {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle of a game session.
///
/// Transitions only move forward: `Waiting -> Playing -> Finished`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum GameStatus {
    /// Created with one participant, waiting for the second.
    Waiting,
    /// Both seats bound, moves are accepted.
    Playing,
    /// Won, drawn or forfeited. Terminal.
    Finished,
}
