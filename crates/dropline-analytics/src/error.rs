//! Error types for the analytics consumer.

/// Errors that can occur while consuming analytics events.
#[derive(Debug, thiserror::Error)]
pub enum AnalyticsError {
    /// Failed to connect to or subscribe on the NATS server.
    #[error("NATS error: {0}")]
    Nats(String),

    /// A payload could not be decoded.
    #[error("decode error: {0}")]
    Decode(#[from] serde_json::Error),
}
