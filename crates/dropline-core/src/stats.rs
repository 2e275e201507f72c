//! Lifecycle counters for the coordinator.
//!
//! Plain atomics so end-of-game bookkeeping never takes a lock. Read
//! together with live registry counts via
//! [`Coordinator::stats`](crate::coordinator::Coordinator::stats).

use std::sync::atomic::{AtomicU64, Ordering};

use dropline_types::Winner;
use serde::Serialize;

/// Monotonic counters updated as games start and end.
#[derive(Debug, Default)]
pub struct GameCounters {
    games_started: AtomicU64,
    ai_games_started: AtomicU64,
    games_finished: AtomicU64,
    player_a_wins: AtomicU64,
    player_b_wins: AtomicU64,
    draws: AtomicU64,
    forfeits: AtomicU64,
}

impl GameCounters {
    /// Count a newly paired game.
    pub fn record_start(&self, against_ai: bool) {
        self.games_started.fetch_add(1, Ordering::Relaxed);
        if against_ai {
            self.ai_games_started.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Count a finished game and its result.
    pub fn record_finish(&self, winner: Winner, forfeit: bool) {
        self.games_finished.fetch_add(1, Ordering::Relaxed);
        let bucket = match winner {
            Winner::PlayerA => &self.player_a_wins,
            Winner::PlayerB => &self.player_b_wins,
            Winner::Draw => &self.draws,
        };
        bucket.fetch_add(1, Ordering::Relaxed);
        if forfeit {
            self.forfeits.fetch_add(1, Ordering::Relaxed);
        }
    }
}

/// Point-in-time view of coordinator activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatsSnapshot {
    /// Live registered connections.
    pub connected_players: usize,
    /// Entries in the waiting queue (may include stale entries).
    pub waiting_players: usize,
    /// Sessions not yet retired.
    pub active_games: usize,
    /// Games paired since startup.
    pub games_started: u64,
    /// Games paired against the AI since startup.
    pub ai_games_started: u64,
    /// Games finished since startup.
    pub games_finished: u64,
    /// Games won by `P1`.
    pub player_a_wins: u64,
    /// Games won by `P2`.
    pub player_b_wins: u64,
    /// Drawn games.
    pub draws: u64,
    /// Games ended by a disconnect.
    pub forfeits: u64,
}

impl StatsSnapshot {
    /// Combine live counts with the counters.
    pub fn new(connected_players: usize, waiting_players: usize, active_games: usize, counters: &GameCounters) -> Self {
        Self {
            connected_players,
            waiting_players,
            active_games,
            games_started: counters.games_started.load(Ordering::Relaxed),
            ai_games_started: counters.ai_games_started.load(Ordering::Relaxed),
            games_finished: counters.games_finished.load(Ordering::Relaxed),
            player_a_wins: counters.player_a_wins.load(Ordering::Relaxed),
            player_b_wins: counters.player_b_wins.load(Ordering::Relaxed),
            draws: counters.draws.load(Ordering::Relaxed),
            forfeits: counters.forfeits.load(Ordering::Relaxed),
        }
    }
}
