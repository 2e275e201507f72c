//! Axum router construction.
//!
//! Assembles the `WebSocket` endpoint and REST routes into a single
//! [`Router`] with CORS and HTTP tracing enabled.

use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;
use crate::ws;

/// Build the complete router.
///
/// - `GET /ws?username=<name>` -- game `WebSocket`
/// - `GET /api/leaderboard` -- top players
/// - `GET /api/status` -- coordinator stats
/// - `GET /health` -- liveness probe
///
/// CORS allows any origin so the browser client can be served from
/// elsewhere during development.
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/ws", get(ws::ws_game))
        .route("/api/leaderboard", get(handlers::leaderboard))
        .route("/api/status", get(handlers::status))
        .route("/health", get(handlers::health))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
