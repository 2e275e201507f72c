//! Analytics consumer for Dropline.
//!
//! Subscribes to the game-ended subject, folds each event into a running
//! tally and logs the live statistics. Bad payloads are logged and
//! skipped.

mod config;
mod error;
mod tally;

use futures::StreamExt as _;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::AnalyticsConfig;
use crate::error::AnalyticsError;
use crate::tally::GameTally;

/// Application entry point.
///
/// # Errors
///
/// Returns an error if NATS cannot be reached or the subscription fails.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    info!("dropline-analytics starting");

    let config = AnalyticsConfig::from_env();
    info!(nats_url = %config.nats_url, subject = %config.subject, "connecting to NATS");
    let client = async_nats::connect(&config.nats_url)
        .await
        .map_err(|e| AnalyticsError::Nats(format!("failed to connect to {}: {e}", config.nats_url)))?;
    let mut subscriber = client
        .subscribe(config.subject.clone())
        .await
        .map_err(|e| AnalyticsError::Nats(format!("failed to subscribe to {}: {e}", config.subject)))?;
    info!(subject = %config.subject, "subscribed to game events");

    let mut tally = GameTally::default();
    while let Some(message) = subscriber.next().await {
        match tally::decode(&message.payload) {
            Ok(Some(event)) => {
                tally.record(&event);
                info!(
                    game_id = %event.game_id,
                    winner = %event.winner,
                    duration_seconds = event.duration_seconds,
                    total_games = tally.total_games,
                    player_a_wins = tally.player_a_wins,
                    player_b_wins = tally.player_b_wins,
                    draws = tally.draws,
                    mean_duration_seconds = tally.mean_duration_seconds().unwrap_or_default(),
                    "game ended"
                );
            }
            Ok(None) => debug!("ignoring untracked event type"),
            Err(e) => warn!(error = %e, "skipping malformed analytics payload"),
        }
    }

    info!("subscription closed, dropline-analytics exiting");
    Ok(())
}
