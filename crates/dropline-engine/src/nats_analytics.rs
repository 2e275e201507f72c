//! Analytics sink that publishes game-ended events on NATS.
//!
//! The coordinator calls [`AnalyticsSink::game_ended`] synchronously at
//! the end of a game. Publishing happens on a spawned task; failures are
//! logged and never reach game play.

use dropline_core::AnalyticsSink;
use dropline_types::{AnalyticsEvent, GameEnded};
use tracing::{debug, info, warn};

use crate::error::EngineError;

/// Publishes `GAME_ENDED` events to a NATS subject.
pub struct NatsAnalyticsSink {
    client: async_nats::Client,
    subject: String,
}

impl NatsAnalyticsSink {
    /// Connect to a NATS server.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Nats`] if the connection cannot be established.
    pub async fn connect(url: &str, subject: &str) -> Result<Self, EngineError> {
        info!(url = url, subject = subject, "connecting to NATS for analytics");
        let client = async_nats::connect(url)
            .await
            .map_err(|e| EngineError::Nats {
                message: format!("failed to connect to {url}: {e}"),
            })?;
        info!("NATS analytics connection established");
        Ok(Self {
            client,
            subject: subject.to_owned(),
        })
    }
}

/// Serialize an event the way it goes on the wire.
pub fn encode_event(event: GameEnded) -> Result<Vec<u8>, serde_json::Error> {
    serde_json::to_vec(&AnalyticsEvent::GameEnded(event))
}

impl AnalyticsSink for NatsAnalyticsSink {
    fn game_ended(&self, event: GameEnded) {
        let game_id = event.game_id;
        let payload = match encode_event(event) {
            Ok(payload) => payload,
            Err(e) => {
                warn!(%game_id, error = %e, "failed to serialize analytics event");
                return;
            }
        };
        let client = self.client.clone();
        let subject = self.subject.clone();
        tokio::spawn(async move {
            match client.publish(subject.clone(), payload.into()).await {
                Ok(()) => debug!(%game_id, subject = subject, "analytics event published"),
                Err(e) => warn!(
                    %game_id,
                    subject = subject,
                    error = %e,
                    "failed to publish analytics event"
                ),
            }
        });
    }
}
