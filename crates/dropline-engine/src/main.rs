//! Game server binary for Dropline.
//!
//! Wires configuration, logging, the leaderboard database, the analytics
//! stream and the coordinator together, then serves HTTP and `WebSocket`
//! traffic until interrupted.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `dropline-config.yaml` (or defaults)
//! 2. Initialize structured logging (tracing)
//! 3. Connect to `PostgreSQL` for the leaderboard, if configured
//! 4. Connect to NATS for analytics, if configured
//! 5. Build the coordinator and HTTP state
//! 6. Serve until `Ctrl-C`

mod error;
mod leaderboard;
mod nats_analytics;

use std::path::PathBuf;
use std::sync::Arc;

use dropline_core::{
    AnalyticsSink, Coordinator, CoordinatorSettings, DroplineConfig, LeaderboardSink, NoopSink,
    Registry,
};
use dropline_db::{PostgresConfig, PostgresPool};
use dropline_server::{AppState, start_server};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::error::EngineError;
use crate::leaderboard::PostgresLeaderboardSink;
use crate::nats_analytics::NatsAnalyticsSink;

/// Default configuration file, relative to the working directory.
const CONFIG_FILE: &str = "dropline-config.yaml";

/// Application entry point.
///
/// # Errors
///
/// Returns an error if configuration is invalid or the server cannot
/// bind. Database and NATS outages only disable their features.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Load configuration.
    let config = load_config()?;

    // 2. Initialize structured logging. RUST_LOG wins over the config level.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.logging.level)),
        )
        .with_target(true)
        .init();

    info!("dropline-engine starting");

    let settings = CoordinatorSettings::from_config(&config)?;
    info!(
        host = %config.server.host,
        port = config.server.port,
        matchmaking_timeout_ms = config.matchmaking.timeout_ms,
        ai_think_ms = config.matchmaking.ai_think_ms,
        rows = settings.board.rows(),
        columns = settings.board.columns(),
        connect = settings.board.connect(),
        "Configuration loaded"
    );

    // 3. Leaderboard database.
    let pool = match config.infrastructure.database_url.as_deref() {
        Some(url) => match connect_leaderboard(&database_config(url, &config)).await {
            Ok(pool) => Some(pool),
            Err(e) => {
                warn!(error = %e, "leaderboard database unavailable, leaderboard disabled");
                None
            }
        },
        None => {
            info!("no database configured, leaderboard disabled");
            None
        }
    };
    let leaderboard: Arc<dyn LeaderboardSink> = match &pool {
        Some(pool) => Arc::new(PostgresLeaderboardSink::new(pool.clone())),
        None => Arc::new(NoopSink),
    };

    // 4. Analytics stream.
    let analytics: Arc<dyn AnalyticsSink> = match config.infrastructure.nats_url.as_deref() {
        Some(url) => {
            match NatsAnalyticsSink::connect(url, &config.infrastructure.analytics_subject).await {
                Ok(sink) => Arc::new(sink),
                Err(e) => {
                    warn!(error = %e, "analytics disabled");
                    Arc::new(NoopSink)
                }
            }
        }
        None => {
            info!("no NATS configured, analytics disabled");
            Arc::new(NoopSink)
        }
    };

    // 5. Coordinator and HTTP state.
    let coordinator = Arc::new(Coordinator::new(
        Registry::new(config.matchmaking.waiting_capacity),
        settings,
        analytics,
        leaderboard,
    ));
    let mut state =
        AppState::new(coordinator).with_outbound_capacity(config.matchmaking.outbound_capacity);
    if let Some(pool) = pool.clone() {
        state = state.with_leaderboard(pool);
    }

    // 6. Serve.
    start_server(&config.server, Arc::new(state))
        .await
        .map_err(EngineError::from)?;

    if let Some(pool) = pool {
        pool.close().await;
    }
    info!("dropline-engine shutdown complete");
    Ok(())
}

/// Load configuration from `DROPLINE_CONFIG` or `dropline-config.yaml`.
///
/// A missing file yields defaults; environment overrides still apply.
fn load_config() -> Result<DroplineConfig, EngineError> {
    let path = std::env::var("DROPLINE_CONFIG")
        .map_or_else(|_| PathBuf::from(CONFIG_FILE), PathBuf::from);
    if path.exists() {
        Ok(DroplineConfig::from_file(&path)?)
    } else {
        Ok(DroplineConfig::parse("")?)
    }
}

/// Pool settings for the leaderboard database at `url`.
fn database_config(url: &str, config: &DroplineConfig) -> PostgresConfig {
    PostgresConfig {
        url: url.to_owned(),
        max_connections: config.infrastructure.database_max_connections,
        acquire_timeout: config.infrastructure.database_connect_timeout(),
    }
}

/// Connect to the leaderboard database and bring its schema up to date.
async fn connect_leaderboard(config: &PostgresConfig) -> Result<PostgresPool, EngineError> {
    let pool = PostgresPool::connect(config).await?;
    pool.run_migrations().await?;
    Ok(pool)
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn database_pool_follows_infrastructure_config() {
        let mut config = DroplineConfig::default();
        config.infrastructure.database_max_connections = 9;
        config.infrastructure.database_connect_timeout_ms = 1_500;

        let pool = database_config("postgresql://localhost/dropline", &config);
        assert_eq!(pool.url, "postgresql://localhost/dropline");
        assert_eq!(pool.max_connections, 9);
        assert_eq!(pool.acquire_timeout, Duration::from_millis(1_500));
    }
}
