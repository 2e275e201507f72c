//! Connection registry owner, matchmaking and game lifecycle.
//!
//! The [`Coordinator`] is the only entry point the transport layer talks
//! to. It owns the [`Registry`] lock and the per-game [`Session`] locks.
//!
//! Lock ordering is always session first, then registry. Paths that start
//! from the registry (register, matchmaking timeout, unregister) release
//! it before touching a session, and freshly built sessions are prepared
//! in full before they become reachable, so no path ever waits on a
//! session lock while holding the registry.

use std::sync::Arc;
use std::time::Duration;

use dropline_board::{BoardDims, select_move};
use dropline_types::{
    ConnectionId, ForfeitReason, GameEnded, GameId, GameStatus, Role, ServerMessage, Username,
    Winner,
};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::config::{ConfigError, DroplineConfig};
use crate::error::CoordinatorError;
use crate::outbound::Outbound;
use crate::registry::Registry;
use crate::session::{MoveApplied, Session, SessionState};
use crate::sinks::{AnalyticsSink, LeaderboardSink};
use crate::stats::{GameCounters, StatsSnapshot};

/// Default wait before a lone player is paired with the AI.
pub const DEFAULT_MATCHMAKING_TIMEOUT: Duration = Duration::from_secs(10);

/// Default pause before the AI answers a move.
pub const DEFAULT_AI_THINK_DELAY: Duration = Duration::from_millis(500);

/// Timing and geometry used by the coordinator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoordinatorSettings {
    /// How long a player waits for a human peer before getting the AI.
    pub matchmaking_timeout: Duration,
    /// Pause between a human move and the AI's reply.
    pub ai_think_delay: Duration,
    /// Board geometry for new games.
    pub board: BoardDims,
}

impl CoordinatorSettings {
    /// Derive settings from loaded configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Board`] if the board section is invalid.
    pub fn from_config(config: &DroplineConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            matchmaking_timeout: config.matchmaking.timeout(),
            ai_think_delay: config.matchmaking.ai_think_delay(),
            board: config.board.dims()?,
        })
    }
}

impl Default for CoordinatorSettings {
    fn default() -> Self {
        Self {
            matchmaking_timeout: DEFAULT_MATCHMAKING_TIMEOUT,
            ai_think_delay: DEFAULT_AI_THINK_DELAY,
            board: BoardDims::STANDARD,
        }
    }
}

/// Pairs players, routes moves and retires finished games.
///
/// Shared as `Arc<Coordinator>`; the matchmaking timer and AI replies run
/// on tasks that hold their own clone.
pub struct Coordinator {
    registry: Mutex<Registry>,
    settings: CoordinatorSettings,
    analytics: Arc<dyn AnalyticsSink>,
    leaderboard: Arc<dyn LeaderboardSink>,
    counters: GameCounters,
}

impl std::fmt::Debug for Coordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Coordinator")
            .field("settings", &self.settings)
            .field("counters", &self.counters)
            .finish_non_exhaustive()
    }
}

impl Coordinator {
    /// Create a coordinator over an empty registry.
    pub fn new(
        registry: Registry,
        settings: CoordinatorSettings,
        analytics: Arc<dyn AnalyticsSink>,
        leaderboard: Arc<dyn LeaderboardSink>,
    ) -> Self {
        Self {
            registry: Mutex::new(registry),
            settings,
            analytics,
            leaderboard,
            counters: GameCounters::default(),
        }
    }

    /// Active settings.
    pub const fn settings(&self) -> &CoordinatorSettings {
        &self.settings
    }

    /// Register a connection and pair it.
    ///
    /// If a peer is waiting the two are seated immediately, the newcomer
    /// as `P1`. Otherwise the connection joins the waiting queue and a
    /// timer is armed that pairs it with the AI.
    ///
    /// # Errors
    ///
    /// - [`CoordinatorError::ReservedIdentity`] for the AI's name
    /// - [`CoordinatorError::IdentityInUse`] if the name is already live
    /// - [`CoordinatorError::WaitingQueueFull`] if the queue is at capacity
    pub async fn register(
        self: &Arc<Self>,
        name: Username,
        outbound: Outbound,
    ) -> Result<ConnectionId, CoordinatorError> {
        if name.is_ai() {
            return Err(CoordinatorError::ReservedIdentity(name));
        }
        let connection = ConnectionId::new();
        let mut registry = self.registry.lock().await;
        registry.insert_client(name.clone(), connection, outbound)?;
        info!(player = %name, %connection, "player registered");

        if let Some(peer) = registry.pop_waiting_peer() {
            let game_id = self.open_session(&mut registry, name.clone(), peer.name.clone());
            info!(%game_id, player_a = %name, player_b = %peer.name, "players matched");
            return Ok(connection);
        }

        if let Err(e) = registry.enqueue(name.clone(), connection) {
            registry.remove_client(&name, connection);
            warn!(player = %name, "waiting queue full, refusing connection");
            return Err(e);
        }
        drop(registry);

        debug!(player = %name, %connection, "waiting for opponent");
        self.arm_matchmaking_timer(name, connection);
        Ok(connection)
    }

    fn arm_matchmaking_timer(self: &Arc<Self>, name: Username, connection: ConnectionId) {
        let coordinator = Arc::clone(self);
        let delay = self.settings.matchmaking_timeout;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            coordinator.matchmaking_timeout(&name, connection).await;
        });
    }

    /// Pair a still-waiting connection with the AI.
    ///
    /// Runs when the matchmaking timer fires. Does nothing if the
    /// connection has gone away, was replaced, or was paired meanwhile.
    /// Returns the new game's id when a game was created.
    pub async fn matchmaking_timeout(
        &self,
        name: &Username,
        connection: ConnectionId,
    ) -> Option<GameId> {
        let mut registry = self.registry.lock().await;
        if !registry.is_unmatched(name, connection) {
            debug!(player = %name, %connection, "matchmaking timer fired for settled connection");
            return None;
        }
        registry.remove_waiting(name, connection);
        let game_id = self.open_session(&mut registry, name.clone(), Username::ai());
        info!(%game_id, player = %name, "no opponent found, paired with AI");
        Some(game_id)
    }

    /// Build a session, make it reachable and announce it.
    ///
    /// The state is complete before insertion, so nobody can observe a
    /// half-seated game.
    fn open_session(
        &self,
        registry: &mut Registry,
        player_a: Username,
        player_b: Username,
    ) -> GameId {
        let id = GameId::new();
        let mut state = SessionState::new(id, self.settings.board, player_a.clone());
        state.join(player_b.clone());
        let turn = state.turn();
        let against_ai = player_b.is_ai();

        registry.insert_game(Arc::new(Session::new(state)), &[&player_a, &player_b]);
        self.counters.record_start(against_ai);

        let seats = [
            (&player_a, &player_b, Role::PlayerA),
            (&player_b, &player_a, Role::PlayerB),
        ];
        for (recipient, opponent, you) in seats {
            if recipient.is_ai() {
                continue;
            }
            let start = ServerMessage::Start {
                game_id: id,
                opponent: opponent.clone(),
                turn,
                you,
            };
            if let Err(e) = registry.deliver(recipient, start) {
                warn!(game_id = %id, player = %recipient, error = %e, "failed to deliver start");
            }
        }
        id
    }

    /// Remove a connection and forfeit its game if one is in progress.
    ///
    /// Only acts if `connection` is still the live connection for `name`,
    /// so it runs at most once per connection. Dropping the registry
    /// entry closes the connection's outbound queue. A waiting entry is
    /// left in the queue; pairing and the timer skip it as stale.
    pub async fn unregister(&self, name: &Username, connection: ConnectionId) {
        let session = {
            let mut registry = self.registry.lock().await;
            let Some(entry) = registry.remove_client(name, connection) else {
                debug!(player = %name, %connection, "unregister for unknown connection");
                return;
            };
            info!(player = %name, %connection, "player disconnected");
            entry.game.and_then(|game| {
                let session = registry.session(game);
                if session.is_none() {
                    warn!(game_id = %game, player = %name, "connection bound to unknown session");
                }
                session
            })
        };

        if let Some(session) = session {
            self.forfeit(&session, name).await;
        }
    }

    async fn forfeit(&self, session: &Session, leaver: &Username) {
        let mut state = session.lock().await;
        let Some(loser) = state.role_of(leaver) else {
            return;
        };
        let Some(winner) = state.forfeit(loser) else {
            debug!(game_id = %state.id(), "game already finished before disconnect");
            return;
        };

        let message = ServerMessage::Forfeit {
            game_id: state.id(),
            winner,
            reason: ForfeitReason::OpponentDisconnected,
        };
        {
            let mut registry = self.registry.lock().await;
            registry.broadcast_to_session(&state, &message);
            registry.retire(&state);
        }
        self.finish_game(session, &state, winner, true);
    }

    /// Apply a move from a registered connection.
    ///
    /// # Errors
    ///
    /// - [`CoordinatorError::NotRegistered`] if the connection is not live
    /// - [`CoordinatorError::NotInGame`] if it is not bound to a game
    /// - [`CoordinatorError::UnknownSession`] if the bound game vanished
    /// - [`CoordinatorError::NotParticipant`] if the name holds no seat
    /// - [`CoordinatorError::Move`] if the session rejects the move
    pub async fn handle_move(
        self: &Arc<Self>,
        name: &Username,
        connection: ConnectionId,
        column: i64,
    ) -> Result<MoveApplied, CoordinatorError> {
        let session = {
            let registry = self.registry.lock().await;
            let game = registry.game_of(name, connection)?;
            registry.session(game).ok_or_else(|| {
                warn!(game_id = %game, player = %name, "connection bound to unknown session");
                CoordinatorError::UnknownSession(game)
            })?
        };

        let mut state = session.lock().await;
        let role = state
            .role_of(name)
            .ok_or_else(|| CoordinatorError::NotParticipant(name.clone()))?;
        self.apply_move(&session, &mut state, role, column).await
    }

    /// Submit, broadcast and follow up on a move while holding the
    /// session lock.
    async fn apply_move(
        self: &Arc<Self>,
        session: &Arc<Session>,
        state: &mut SessionState,
        role: Role,
        column: i64,
    ) -> Result<MoveApplied, CoordinatorError> {
        let applied = state.submit_move(role, column)?;
        debug!(
            game_id = %state.id(),
            player = %role,
            row = applied.row,
            column = applied.column,
            "move applied"
        );

        let update = ServerMessage::Update {
            game_id: state.id(),
            row: applied.row,
            column: applied.column,
            player: applied.player,
            turn: applied.turn,
            winner: applied.winner,
        };
        {
            let mut registry = self.registry.lock().await;
            registry.broadcast_to_session(state, &update);
            if applied.winner.is_some() {
                registry.retire(state);
            }
        }

        if let Some(winner) = applied.winner {
            self.finish_game(session, state, winner, false);
        } else if state.is_ai_seat(applied.turn) {
            self.schedule_ai_move(Arc::clone(session));
        }
        Ok(applied)
    }

    fn schedule_ai_move(self: &Arc<Self>, session: Arc<Session>) {
        let coordinator = Arc::clone(self);
        let delay = self.settings.ai_think_delay;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            coordinator.play_ai_turn(&session).await;
        });
    }

    /// Make the AI's move if the game is still waiting on it.
    async fn play_ai_turn(self: &Arc<Self>, session: &Arc<Session>) {
        let mut state = session.lock().await;
        let seat = state.turn();
        if state.status() != GameStatus::Playing || !state.is_ai_seat(seat) {
            debug!(game_id = %session.id(), "AI turn no longer due");
            return;
        }
        let Some(column) = select_move(state.board(), seat, seat.opponent()) else {
            warn!(game_id = %session.id(), "AI found no playable column");
            return;
        };
        let Ok(column) = i64::try_from(column) else {
            return;
        };
        if let Err(e) = self.apply_move(session, &mut state, seat, column).await {
            warn!(game_id = %session.id(), error = %e, "AI move rejected");
        }
    }

    fn finish_game(&self, session: &Session, state: &SessionState, winner: Winner, forfeit: bool) {
        self.counters.record_finish(winner, forfeit);
        let duration_seconds = session.elapsed().as_secs_f64();
        info!(
            game_id = %state.id(),
            %winner,
            duration_seconds,
            forfeit,
            "game finished"
        );

        self.analytics
            .game_ended(GameEnded::now(state.id(), winner, duration_seconds));

        let human_winner = winner
            .role()
            .and_then(|role| state.player(role))
            .filter(|name| !name.is_ai());
        if let Some(name) = human_winner {
            self.leaderboard.record_win(name);
        }
    }

    /// Queue a message for a live connection.
    ///
    /// # Errors
    ///
    /// Returns [`CoordinatorError::NotRegistered`] if `connection` is not
    /// the live connection for `name`, or [`CoordinatorError::Delivery`]
    /// if its queue is full or closed.
    pub async fn notify(
        &self,
        name: &Username,
        connection: ConnectionId,
        message: ServerMessage,
    ) -> Result<(), CoordinatorError> {
        let registry = self.registry.lock().await;
        if !registry.is_registered(name, connection) {
            return Err(CoordinatorError::NotRegistered(name.clone()));
        }
        registry.deliver(name, message)
    }

    /// The game a live connection is currently seated in.
    pub async fn game_of(&self, name: &Username, connection: ConnectionId) -> Option<GameId> {
        self.registry.lock().await.game_of(name, connection).ok()
    }

    /// Look up a live session by id.
    pub async fn session(&self, id: GameId) -> Option<Arc<Session>> {
        self.registry.lock().await.session(id)
    }

    /// Snapshot of live counts and lifetime counters.
    pub async fn stats(&self) -> StatsSnapshot {
        let registry = self.registry.lock().await;
        StatsSnapshot::new(
            registry.connected(),
            registry.waiting(),
            registry.active_games(),
            &self.counters,
        )
    }
}
