//! Configuration loading and typed config structures.
//!
//! The canonical configuration lives in `dropline-config.yaml` next to the
//! binary's working directory. Every field has a default, so an empty or
//! missing file yields a runnable server. Infrastructure URLs can be
//! overridden from the environment.

use std::path::Path;
use std::time::Duration;

use dropline_board::{BoardDims, BoardError};
use serde::Deserialize;

use crate::outbound::DEFAULT_OUTBOUND_CAPACITY;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// The board section describes an impossible board.
    #[error("invalid board config: {source}")]
    Board {
        /// The underlying validation error.
        #[from]
        source: BoardError,
    },

    /// An environment override could not be parsed.
    #[error("invalid environment override {name}: {message}")]
    Env {
        /// The variable name.
        name: &'static str,
        /// What was wrong with it.
        message: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level server configuration.
///
/// Mirrors the structure of `dropline-config.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct DroplineConfig {
    /// Listener settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Matchmaking and AI timing.
    #[serde(default)]
    pub matchmaking: MatchmakingConfig,

    /// Board geometry.
    #[serde(default)]
    pub board: BoardConfig,

    /// Database and message bus connection strings.
    #[serde(default)]
    pub infrastructure: InfrastructureConfig,

    /// Log filtering.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl DroplineConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// Environment variables override file values:
    /// - `DATABASE_URL` overrides `infrastructure.database_url`
    /// - `NATS_URL` overrides `infrastructure.nats_url`
    /// - `DROPLINE_PORT` overrides `server.port`
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Yaml`] if the content is not valid YAML, or
    /// [`ConfigError::Env`] if an override is malformed.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string, then apply env overrides.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML, or
    /// [`ConfigError::Env`] if an override is malformed.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let mut config: Self = if yaml.trim().is_empty() {
            Self::default()
        } else {
            serde_yml::from_str(yaml)?
        };
        config.apply_env_overrides()?;
        Ok(config)
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Ok(url) = std::env::var("DATABASE_URL") {
            self.infrastructure.database_url = Some(url);
        }
        if let Ok(url) = std::env::var("NATS_URL") {
            self.infrastructure.nats_url = Some(url);
        }
        if let Ok(port) = std::env::var("DROPLINE_PORT") {
            self.server.port = port.parse().map_err(|e| ConfigError::Env {
                name: "DROPLINE_PORT",
                message: format!("{e}"),
            })?;
        }
        Ok(())
    }
}

/// HTTP listener configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ServerConfig {
    /// Address to bind (e.g. `0.0.0.0`).
    #[serde(default = "default_host")]
    pub host: String,

    /// TCP port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Matchmaking, AI pacing and queue sizes.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MatchmakingConfig {
    /// How long a lone player waits before being paired with the AI.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Pause before the AI answers a move.
    #[serde(default = "default_ai_think_ms")]
    pub ai_think_ms: u64,

    /// Maximum entries in the waiting queue.
    #[serde(default = "default_waiting_capacity")]
    pub waiting_capacity: usize,

    /// Outbound queue depth per connection.
    #[serde(default = "default_outbound_capacity")]
    pub outbound_capacity: usize,
}

impl MatchmakingConfig {
    /// Matchmaking timeout as a [`Duration`].
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// AI thinking delay as a [`Duration`].
    pub const fn ai_think_delay(&self) -> Duration {
        Duration::from_millis(self.ai_think_ms)
    }
}

impl Default for MatchmakingConfig {
    fn default() -> Self {
        Self {
            timeout_ms: default_timeout_ms(),
            ai_think_ms: default_ai_think_ms(),
            waiting_capacity: default_waiting_capacity(),
            outbound_capacity: default_outbound_capacity(),
        }
    }
}

/// Board geometry as written in the config file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct BoardConfig {
    /// Number of rows.
    #[serde(default = "default_rows")]
    pub rows: usize,

    /// Number of columns.
    #[serde(default = "default_columns")]
    pub columns: usize,

    /// Discs in a line needed to win.
    #[serde(default = "default_connect")]
    pub connect: usize,
}

impl BoardConfig {
    /// Validate into [`BoardDims`].
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Board`] for impossible geometry.
    pub fn dims(&self) -> Result<BoardDims, ConfigError> {
        Ok(BoardDims::new(self.rows, self.columns, self.connect)?)
    }
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            rows: default_rows(),
            columns: default_columns(),
            connect: default_connect(),
        }
    }
}

/// External service connection settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct InfrastructureConfig {
    /// `PostgreSQL` URL for the leaderboard. Leaderboard is disabled when unset.
    #[serde(default)]
    pub database_url: Option<String>,

    /// Leaderboard pool size.
    #[serde(default = "default_database_max_connections")]
    pub database_max_connections: u32,

    /// Longest wait for a leaderboard connection.
    #[serde(default = "default_database_connect_timeout_ms")]
    pub database_connect_timeout_ms: u64,

    /// NATS URL for analytics. Analytics is disabled when unset.
    #[serde(default)]
    pub nats_url: Option<String>,

    /// Subject game-ended events are published on.
    #[serde(default = "default_analytics_subject")]
    pub analytics_subject: String,
}

impl Default for InfrastructureConfig {
    fn default() -> Self {
        Self {
            database_url: None,
            database_max_connections: default_database_max_connections(),
            database_connect_timeout_ms: default_database_connect_timeout_ms(),
            nats_url: None,
            analytics_subject: default_analytics_subject(),
        }
    }
}

impl InfrastructureConfig {
    /// Leaderboard connection timeout as a [`Duration`].
    pub const fn database_connect_timeout(&self) -> Duration {
        Duration::from_millis(self.database_connect_timeout_ms)
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Default `tracing` filter when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_host() -> String {
    String::from("0.0.0.0")
}

const fn default_port() -> u16 {
    8081
}

const fn default_timeout_ms() -> u64 {
    10_000
}

const fn default_ai_think_ms() -> u64 {
    500
}

const fn default_waiting_capacity() -> usize {
    100
}

const fn default_outbound_capacity() -> usize {
    DEFAULT_OUTBOUND_CAPACITY
}

const fn default_rows() -> usize {
    6
}

const fn default_columns() -> usize {
    7
}

const fn default_connect() -> usize {
    4
}

const fn default_database_max_connections() -> u32 {
    5
}

const fn default_database_connect_timeout_ms() -> u64 {
    5_000
}

fn default_analytics_subject() -> String {
    String::from("dropline.games.ended")
}

fn default_log_level() -> String {
    String::from("info")
}
