//! Outbound collaborator seams: analytics stream and leaderboard.
//!
//! Both are fire-and-forget. The coordinator calls them synchronously at
//! the end of a game and never looks at the outcome; implementations
//! that need I/O spawn their own task and log failures. A broken sink
//! can therefore never fail or stall game play.

use dropline_types::{GameEnded, Username};

/// Receives one event per finished game.
pub trait AnalyticsSink: Send + Sync {
    /// Record that a game ended. Must not block.
    fn game_ended(&self, event: GameEnded);
}

/// Receives win increments for human winners.
pub trait LeaderboardSink: Send + Sync {
    /// Credit `username` with one win. Must not block.
    fn record_win(&self, username: &Username);
}

/// Sink that discards everything.
///
/// Used when analytics or the leaderboard database is not configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSink;

impl AnalyticsSink for NoopSink {
    fn game_ended(&self, _event: GameEnded) {}
}

impl LeaderboardSink for NoopSink {
    fn record_win(&self, _username: &Username) {}
}
