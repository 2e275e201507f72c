//! Authoritative state of a single game.
//!
//! [`SessionState`] is the plain state machine: board, turn marker,
//! lifecycle and the two participants. [`Session`] wraps it in its own
//! lock so moves on one game are strictly serialized while different
//! games never contend with each other.
//!
//! Every validation in [`SessionState::submit_move`] runs before the
//! board is touched, so a rejected move leaves no trace.

use std::time::Duration;

use dropline_board::{Board, BoardDims};
use dropline_types::{GameId, GameStatus, Role, Username, Winner};
use tokio::sync::{Mutex, MutexGuard};
use tokio::time::Instant;

use crate::error::MoveError;

/// A successfully applied move, enough to broadcast a minimal diff.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveApplied {
    /// Row the disc landed in.
    pub row: usize,
    /// Column the disc was dropped into.
    pub column: usize,
    /// Seat that moved.
    pub player: Role,
    /// Seat to move next (unchanged when the move ended the game).
    pub turn: Role,
    /// Set when this move finished the game.
    pub winner: Option<Winner>,
}

/// Game state guarded by a [`Session`]'s lock.
#[derive(Debug, Clone)]
pub struct SessionState {
    id: GameId,
    board: Board,
    turn: Role,
    status: GameStatus,
    winner: Option<Winner>,
    player_a: Username,
    player_b: Option<Username>,
}

impl SessionState {
    /// Open a game with its first participant seated as `PlayerA`.
    pub fn new(id: GameId, dims: BoardDims, player_a: Username) -> Self {
        Self {
            id,
            board: Board::new(dims),
            turn: Role::PlayerA,
            status: GameStatus::Waiting,
            winner: None,
            player_a,
            player_b: None,
        }
    }

    /// Seat the second participant and start play.
    ///
    /// Only the first call has an effect; later calls are ignored.
    pub fn join(&mut self, player_b: Username) {
        if self.status != GameStatus::Waiting {
            return;
        }
        self.player_b = Some(player_b);
        self.status = GameStatus::Playing;
    }

    /// Validate and apply a move for `role`.
    ///
    /// On success the disc is placed and the game either finishes (win
    /// or full board) or passes the turn to the other seat.
    ///
    /// # Errors
    ///
    /// Checked in order: [`MoveError::NotActive`], [`MoveError::WrongTurn`],
    /// [`MoveError::InvalidColumn`], [`MoveError::ColumnFull`]. No state
    /// changes on any error.
    pub fn submit_move(&mut self, role: Role, column: i64) -> Result<MoveApplied, MoveError> {
        if self.status != GameStatus::Playing {
            return Err(MoveError::NotActive);
        }
        if role != self.turn {
            return Err(MoveError::WrongTurn { expected: self.turn });
        }
        let col = usize::try_from(column)
            .ok()
            .filter(|&c| c < self.board.columns())
            .ok_or(MoveError::InvalidColumn { column })?;
        let row = self
            .board
            .lowest_open_row(col)
            .ok_or(MoveError::ColumnFull { column: col })?;

        self.board.place(row, col, role);
        if self.board.check_win(row, col, role) {
            self.finish(Winner::from(role));
        } else if self.board.is_full() {
            self.finish(Winner::Draw);
        } else {
            self.turn = role.opponent();
        }

        Ok(MoveApplied {
            row,
            column: col,
            player: role,
            turn: self.turn,
            winner: self.winner,
        })
    }

    /// End a running game because `loser` left.
    ///
    /// Returns the recorded winner, or `None` if the game was not
    /// `Playing` (already finished games keep their result).
    pub fn forfeit(&mut self, loser: Role) -> Option<Winner> {
        if self.status != GameStatus::Playing {
            return None;
        }
        let winner = Winner::from(loser.opponent());
        self.finish(winner);
        Some(winner)
    }

    /// Seat occupied by `name`, if they play in this game.
    pub fn role_of(&self, name: &Username) -> Option<Role> {
        if *name == self.player_a {
            Some(Role::PlayerA)
        } else if self.player_b.as_ref() == Some(name) {
            Some(Role::PlayerB)
        } else {
            None
        }
    }

    /// Participant in `role`'s seat.
    pub const fn player(&self, role: Role) -> Option<&Username> {
        match role {
            Role::PlayerA => Some(&self.player_a),
            Role::PlayerB => self.player_b.as_ref(),
        }
    }

    /// Both seated participants, `PlayerA` first.
    pub fn participants(&self) -> impl Iterator<Item = (Role, &Username)> {
        [Role::PlayerA, Role::PlayerB]
            .into_iter()
            .filter_map(|role| self.player(role).map(|name| (role, name)))
    }

    /// Whether the participant in `role`'s seat is the AI.
    pub fn is_ai_seat(&self, role: Role) -> bool {
        self.player(role).is_some_and(Username::is_ai)
    }

    /// The game's id.
    pub const fn id(&self) -> GameId {
        self.id
    }

    /// Read-only view of the board.
    pub const fn board(&self) -> &Board {
        &self.board
    }

    /// Seat to move.
    pub const fn turn(&self) -> Role {
        self.turn
    }

    /// Lifecycle state.
    pub const fn status(&self) -> GameStatus {
        self.status
    }

    /// Result, once finished.
    pub const fn winner(&self) -> Option<Winner> {
        self.winner
    }

    fn finish(&mut self, winner: Winner) {
        self.status = GameStatus::Finished;
        self.winner = Some(winner);
    }
}

/// A game plus the lock that serializes every mutation of it.
#[derive(Debug)]
pub struct Session {
    id: GameId,
    started_at: Instant,
    state: Mutex<SessionState>,
}

impl Session {
    /// Wrap prepared state. The clock for the game's duration starts now.
    pub fn new(state: SessionState) -> Self {
        Self {
            id: state.id(),
            started_at: Instant::now(),
            state: Mutex::new(state),
        }
    }

    /// The game's id (readable without the lock).
    pub const fn id(&self) -> GameId {
        self.id
    }

    /// Time since the session was created.
    pub fn elapsed(&self) -> Duration {
        self.started_at.elapsed()
    }

    /// Acquire the session's exclusion boundary. Concurrent moves are
    /// linearized in acquisition order.
    pub async fn lock(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use super::*;

    fn name(s: &str) -> Username {
        Username::parse(s).unwrap()
    }

    fn playing() -> SessionState {
        let mut state = SessionState::new(GameId::new(), BoardDims::STANDARD, name("alice"));
        state.join(name("bob"));
        state
    }

    #[test]
    fn new_session_waits_for_second_player() {
        let mut state = SessionState::new(GameId::new(), BoardDims::STANDARD, name("alice"));
        assert_eq!(state.status(), GameStatus::Waiting);
        assert_eq!(state.submit_move(Role::PlayerA, 3), Err(MoveError::NotActive));
        assert_eq!(state.player(Role::PlayerB), None);
    }

    #[test]
    fn join_is_idempotent() {
        let mut state = playing();
        state.join(name("mallory"));
        assert_eq!(state.player(Role::PlayerB), Some(&name("bob")));
        assert_eq!(state.status(), GameStatus::Playing);
    }

    #[test]
    fn roles_resolve_by_name() {
        let state = playing();
        assert_eq!(state.role_of(&name("alice")), Some(Role::PlayerA));
        assert_eq!(state.role_of(&name("bob")), Some(Role::PlayerB));
        assert_eq!(state.role_of(&name("eve")), None);
        let seats: Vec<Role> = state.participants().map(|(role, _)| role).collect();
        assert_eq!(seats, vec![Role::PlayerA, Role::PlayerB]);
    }

    #[test]
    fn turn_alternates_strictly() {
        let mut state = playing();
        let mut expected = Role::PlayerA;
        for column in [0, 1, 2, 3, 4, 5, 6, 0, 1, 2] {
            assert_eq!(state.turn(), expected);
            let applied = state.submit_move(expected, column).unwrap();
            assert_eq!(applied.player, expected);
            assert_eq!(applied.turn, expected.opponent());
            assert_eq!(applied.winner, None);
            expected = expected.opponent();
        }
    }

    #[test]
    fn validation_order_and_no_partial_mutation() {
        let mut state = playing();
        let before = state.board().clone();
        assert_eq!(
            state.submit_move(Role::PlayerB, 3),
            Err(MoveError::WrongTurn { expected: Role::PlayerA })
        );
        assert_eq!(
            state.submit_move(Role::PlayerA, 7),
            Err(MoveError::InvalidColumn { column: 7 })
        );
        assert_eq!(
            state.submit_move(Role::PlayerA, -1),
            Err(MoveError::InvalidColumn { column: -1 })
        );
        assert_eq!(state.board(), &before);
        assert_eq!(state.turn(), Role::PlayerA);
    }

    #[test]
    fn full_column_is_rejected() {
        let mut state = playing();
        let mut role = Role::PlayerA;
        for _ in 0..6 {
            state.submit_move(role, 0).unwrap();
            role = role.opponent();
        }
        assert_eq!(
            state.submit_move(role, 0),
            Err(MoveError::ColumnFull { column: 0 })
        );
        assert_eq!(state.turn(), role);
    }

    #[test]
    fn four_in_column_three_wins_for_player_a() {
        let mut state = playing();
        let replies = [0, 1, 0];
        for reply in replies {
            state.submit_move(Role::PlayerA, 3).unwrap();
            state.submit_move(Role::PlayerB, reply).unwrap();
        }
        let applied = state.submit_move(Role::PlayerA, 3).unwrap();
        assert_eq!(applied.row, 2);
        assert_eq!(applied.winner, Some(Winner::PlayerA));
        assert_eq!(applied.turn, Role::PlayerA);
        assert_eq!(state.status(), GameStatus::Finished);
        assert_eq!(state.winner(), Some(Winner::PlayerA));
        assert_eq!(state.submit_move(Role::PlayerB, 4), Err(MoveError::NotActive));
    }

    #[test]
    fn filling_the_board_without_a_line_is_a_draw() {
        // Column pairs filled in the order below never line up four.
        let mut state = playing();
        let order = [0, 1, 0, 1, 0, 1, 1, 0, 1, 0, 1, 0, 2, 3, 2, 3, 2, 3, 3, 2, 3, 2, 3, 2, 4, 5, 4, 5, 4, 5, 5, 4, 5, 4, 5, 4, 6, 6, 6, 6, 6];
        let mut role = Role::PlayerA;
        for column in order {
            let applied = state.submit_move(role, column).unwrap();
            assert_eq!(applied.winner, None, "unexpected result at column {column}");
            role = role.opponent();
        }
        let last = state.submit_move(role, 6).unwrap();
        assert_eq!(last.winner, Some(Winner::Draw));
        assert_eq!(state.status(), GameStatus::Finished);
        assert!(state.board().is_full());
    }

    #[test]
    fn forfeit_only_ends_running_games() {
        let mut state = playing();
        assert_eq!(state.forfeit(Role::PlayerA), Some(Winner::PlayerB));
        assert_eq!(state.status(), GameStatus::Finished);
        assert_eq!(state.forfeit(Role::PlayerB), None);
        assert_eq!(state.winner(), Some(Winner::PlayerB));
    }

    #[tokio::test]
    async fn concurrent_moves_for_one_turn_slot_apply_once() {
        for _ in 0..50 {
            let session = Arc::new(Session::new(playing()));
            let a = Arc::clone(&session);
            let b = Arc::clone(&session);
            let first = tokio::spawn(async move { a.lock().await.submit_move(Role::PlayerA, 2) });
            let second = tokio::spawn(async move { b.lock().await.submit_move(Role::PlayerA, 4) });
            let results = [first.await.unwrap(), second.await.unwrap()];
            let ok = results.iter().filter(|r| r.is_ok()).count();
            assert_eq!(ok, 1);
            assert!(results.iter().any(|r| {
                *r == Err(MoveError::WrongTurn {
                    expected: Role::PlayerB,
                })
            }));
            assert_eq!(session.lock().await.turn(), Role::PlayerB);
        }
    }

    #[tokio::test]
    async fn session_join_through_lock() {
        let session = Session::new(SessionState::new(
            GameId::new(),
            BoardDims::STANDARD,
            name("alice"),
        ));
        session.lock().await.join(name("bob"));
        assert_eq!(session.lock().await.status(), GameStatus::Playing);
        assert_eq!(session.id(), session.lock().await.id());
    }
}
