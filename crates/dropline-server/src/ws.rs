//! Game `WebSocket` endpoint.
//!
//! Each socket is registered with the [`Coordinator`] under the
//! `username` query parameter (or a generated name). A writer task drains
//! the connection's outbound queue into the socket while the handler task
//! reads frames and forwards move intents. When the socket closes or
//! errors the connection is unregistered exactly once, which closes the
//! outbound queue and lets the writer finish.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::ws::{Message, WebSocket};
use axum::extract::{Query, State, WebSocketUpgrade};
use axum::response::IntoResponse;
use dropline_core::{Coordinator, OutboundReceiver, outbound_channel};
use dropline_types::{ClientMessage, ConnectionId, ServerMessage, Username};
use futures::stream::SplitSink;
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::state::AppState;

/// Pending pong replies per connection.
const PONG_QUEUE: usize = 8;

type Sink = SplitSink<WebSocket, Message>;

/// Query parameters for `GET /ws`.
#[derive(Debug, serde::Deserialize)]
pub struct WsQuery {
    /// Requested player name. Blank or missing yields a generated name.
    pub username: Option<String>,
}

/// Upgrade to a game `WebSocket`.
///
/// # Route
///
/// `GET /ws?username=<name>`
pub async fn ws_game(
    ws: WebSocketUpgrade,
    Query(query): Query<WsQuery>,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let name = query
        .username
        .as_deref()
        .and_then(Username::parse)
        .unwrap_or_else(Username::generated);
    ws.on_upgrade(move |socket| handle_socket(socket, state, name))
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>, name: Username) {
    let (mut sink, mut stream) = socket.split();
    let (outbound, rx) = outbound_channel(state.outbound_capacity);

    let connection = match state.coordinator.register(name.clone(), outbound).await {
        Ok(connection) => connection,
        Err(e) => {
            info!(player = %name, error = %e, "registration refused");
            refuse(&mut sink, e.to_string()).await;
            return;
        }
    };
    debug!(player = %name, %connection, "WebSocket client connected");

    let (pong_tx, pong_rx) = mpsc::channel(PONG_QUEUE);
    let writer = tokio::spawn(write_frames(sink, rx, pong_rx));

    while let Some(frame) = stream.next().await {
        match frame {
            Ok(Message::Text(text)) => {
                dispatch_text(&state.coordinator, &name, connection, text.as_str()).await;
            }
            Ok(Message::Ping(data)) => {
                if pong_tx.try_send(data).is_err() {
                    debug!(player = %name, "pong dropped");
                }
            }
            Ok(Message::Close(_)) => break,
            Ok(_) => {}
            Err(e) => {
                debug!(player = %name, error = %e, "WebSocket error");
                break;
            }
        }
    }

    state.coordinator.unregister(&name, connection).await;
    drop(pong_tx);
    if let Err(e) = writer.await {
        warn!(player = %name, error = %e, "WebSocket writer task failed");
    }
    debug!(player = %name, %connection, "WebSocket client disconnected");
}

/// Drain the outbound queue (and pong replies) into the socket until the
/// queue closes or the socket goes away.
async fn write_frames(
    mut sink: Sink,
    mut rx: OutboundReceiver,
    mut pongs: mpsc::Receiver<Bytes>,
) {
    loop {
        tokio::select! {
            message = rx.recv() => {
                let Some(message) = message else {
                    break;
                };
                let json = match serde_json::to_string(&message) {
                    Ok(json) => json,
                    Err(e) => {
                        warn!(kind = message.kind(), error = %e, "failed to serialize server message");
                        continue;
                    }
                };
                if sink.send(Message::Text(json.into())).await.is_err() {
                    debug!("WebSocket send failed");
                    return;
                }
            }
            Some(data) = pongs.recv() => {
                if sink.send(Message::Pong(data)).await.is_err() {
                    debug!("WebSocket pong failed");
                    return;
                }
            }
        }
    }
    if sink.close().await.is_err() {
        debug!("WebSocket close failed");
    }
}

/// Send a single `error` frame and close.
async fn refuse(sink: &mut Sink, message: String) {
    let frame = ServerMessage::Error { message };
    match serde_json::to_string(&frame) {
        Ok(json) => {
            if sink.send(Message::Text(json.into())).await.is_err() {
                debug!("WebSocket closed before refusal was sent");
            }
        }
        Err(e) => warn!(error = %e, "failed to serialize refusal"),
    }
    if sink.close().await.is_err() {
        debug!("WebSocket close failed");
    }
}

/// Handle one inbound text frame.
///
/// Moves go to the coordinator. A rejected move or a frame that does not
/// parse earns the sender a `rejected` notice; the game is untouched.
pub(crate) async fn dispatch_text(
    coordinator: &Arc<Coordinator>,
    name: &Username,
    connection: ConnectionId,
    text: &str,
) {
    let reason = match serde_json::from_str::<ClientMessage>(text) {
        Ok(ClientMessage::Move { column }) => {
            match coordinator.handle_move(name, connection, column).await {
                Ok(_) => return,
                Err(e) => {
                    debug!(player = %name, column, error = %e, "move rejected");
                    e.to_string()
                }
            }
        }
        Err(e) => {
            debug!(player = %name, error = %e, "ignoring malformed frame");
            format!("malformed message: {e}")
        }
    };

    let notice = ServerMessage::Rejected { reason };
    if let Err(e) = coordinator.notify(name, connection, notice).await {
        debug!(player = %name, error = %e, "rejection notice not delivered");
    }
}
