//! Error types for session and coordinator operations.
//!
//! Move validation failures ([`MoveError`]) are terminal for a single
//! move attempt only: the session performs no partial mutation before
//! returning one. [`CoordinatorError`] wraps them together with registry
//! and lifecycle failures.

use dropline_types::{GameId, Role, Username};

/// Why a move was not applied to a session.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MoveError {
    /// The session is not in the `Playing` state.
    #[error("game is not active")]
    NotActive,

    /// It is the other seat's turn.
    #[error("not your turn (waiting for {expected})")]
    WrongTurn {
        /// Seat whose turn it is.
        expected: Role,
    },

    /// The column does not exist on this board.
    #[error("column {column} is out of range")]
    InvalidColumn {
        /// The requested column.
        column: i64,
    },

    /// The column has no empty cell left.
    #[error("column {column} is full")]
    ColumnFull {
        /// The requested column.
        column: usize,
    },
}

/// Why an outbound message could not be queued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum DeliveryError {
    /// The connection's queue is at capacity; the message was dropped.
    #[error("outbound queue is full")]
    QueueFull,

    /// The connection's writer has gone away.
    #[error("outbound queue is closed")]
    Closed,
}

/// Errors surfaced by [`Coordinator`](crate::coordinator::Coordinator) operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CoordinatorError {
    /// The move failed session validation.
    #[error(transparent)]
    Move(#[from] MoveError),

    /// Another live connection already uses this name.
    #[error("username {0} is already connected")]
    IdentityInUse(Username),

    /// The name is reserved for the AI participant.
    #[error("username {0} is reserved")]
    ReservedIdentity(Username),

    /// The waiting queue has no room for another player.
    #[error("matchmaking queue is full")]
    WaitingQueueFull,

    /// No live connection matches this name and connection id.
    #[error("{0} is not registered")]
    NotRegistered(Username),

    /// The connection is registered but not seated in a game.
    #[error("{0} is not in a game")]
    NotInGame(Username),

    /// The connection points at a game the registry does not hold.
    ///
    /// Only reachable through a lifecycle bug or a disconnect race.
    #[error("unknown session {0}")]
    UnknownSession(GameId),

    /// The submitting name is not one of the session's two participants.
    #[error("{0} is not a participant in this game")]
    NotParticipant(Username),

    /// The target of a direct message is no longer registered.
    #[error("{0} is unreachable")]
    PeerUnreachable(Username),

    /// The target's outbound queue refused the message.
    #[error("delivery failed: {0}")]
    Delivery(#[from] DeliveryError),
}
