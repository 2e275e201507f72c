//! Per-connection outbound delivery queue.
//!
//! The coordinator never writes to a socket. It pushes [`ServerMessage`]s
//! into a bounded queue per connection; a writer task owned by the
//! transport drains the other end. Enqueueing never waits, so a slow
//! peer can only lose its own messages, never stall the coordinator.

use dropline_types::ServerMessage;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

use crate::error::DeliveryError;

/// Default queue depth per connection.
pub const DEFAULT_OUTBOUND_CAPACITY: usize = 256;

/// Sending half of a connection's outbound queue.
///
/// The registry holds this for as long as the connection is registered.
/// Dropping it on unregister closes the queue, which ends the writer.
#[derive(Debug, Clone)]
pub struct Outbound {
    tx: mpsc::Sender<ServerMessage>,
}

/// Receiving half, drained by the connection's writer task.
pub type OutboundReceiver = mpsc::Receiver<ServerMessage>;

/// Create a bounded outbound queue.
///
/// A capacity of zero is bumped to one.
pub fn outbound_channel(capacity: usize) -> (Outbound, OutboundReceiver) {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    (Outbound { tx }, rx)
}

impl Outbound {
    /// Queue a message without waiting.
    ///
    /// # Errors
    ///
    /// Returns [`DeliveryError::QueueFull`] when the peer is not keeping
    /// up (the message is dropped), or [`DeliveryError::Closed`] when the
    /// writer has exited.
    pub fn deliver(&self, message: ServerMessage) -> Result<(), DeliveryError> {
        self.tx.try_send(message).map_err(|e| match e {
            TrySendError::Full(_) => DeliveryError::QueueFull,
            TrySendError::Closed(_) => DeliveryError::Closed,
        })
    }
}
