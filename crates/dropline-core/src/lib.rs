//! Game coordination for the Dropline server.
//!
//! Everything between a decoded client frame and the outbound queues
//! lives here: per-game state machines, the connection registry,
//! matchmaking with an AI fallback, and end-of-game bookkeeping.
//!
//! # Modules
//!
//! - [`session`] -- Per-game state machine and its lock
//! - [`registry`] -- Connections, waiting queue and live sessions
//! - [`coordinator`] -- Matchmaking, move routing and game lifecycle
//! - [`outbound`] -- Bounded per-connection delivery queues
//! - [`sinks`] -- Analytics and leaderboard collaborator seams
//! - [`stats`] -- Lifecycle counters
//! - [`config`] -- YAML configuration with env overrides
//! - [`error`] -- Error types

pub mod config;
pub mod coordinator;
pub mod error;
pub mod outbound;
pub mod registry;
pub mod session;
pub mod sinks;
pub mod stats;

pub use config::{ConfigError, DroplineConfig};
pub use coordinator::{Coordinator, CoordinatorSettings};
pub use error::{CoordinatorError, DeliveryError, MoveError};
pub use outbound::{DEFAULT_OUTBOUND_CAPACITY, Outbound, OutboundReceiver, outbound_channel};
pub use registry::Registry;
pub use session::{MoveApplied, Session, SessionState};
pub use sinks::{AnalyticsSink, LeaderboardSink, NoopSink};
pub use stats::{GameCounters, StatsSnapshot};
