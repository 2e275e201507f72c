//! Integration tests for the HTTP endpoints.
//!
//! Tests drive the Axum `Router` directly via `tower::ServiceExt` without
//! starting a TCP server.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use dropline_core::{
    Coordinator, CoordinatorSettings, NoopSink, Registry, outbound_channel,
};
use dropline_server::{AppState, build_router};
use dropline_types::Username;
use serde_json::Value;
use tower::ServiceExt;

fn make_test_state() -> Arc<AppState> {
    let coordinator = Coordinator::new(
        Registry::default(),
        CoordinatorSettings::default(),
        Arc::new(NoopSink),
        Arc::new(NoopSink),
    );
    Arc::new(AppState::new(Arc::new(coordinator)))
}

async fn body_to_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn get(state: Arc<AppState>, uri: &str) -> axum::response::Response {
    build_router(state)
        .oneshot(Request::get(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

#[tokio::test]
async fn test_health_returns_ok() {
    let response = get(make_test_state(), "/health").await;
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(&bytes[..], b"ok");
}

#[tokio::test]
async fn test_leaderboard_without_database_is_empty() {
    let response = get(make_test_state(), "/api/leaderboard").await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json, serde_json::json!([]));
}

#[tokio::test]
async fn test_leaderboard_rejects_out_of_range_limit() {
    for uri in ["/api/leaderboard?limit=0", "/api/leaderboard?limit=1000"] {
        let response = get(make_test_state(), uri).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_to_json(response.into_body()).await;
        assert_eq!(json["status"], 400);
        assert!(json["error"].as_str().unwrap().contains("limit"));
    }
}

#[tokio::test]
async fn test_status_on_idle_server() {
    let response = get(make_test_state(), "/api/status").await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["connected_players"], 0);
    assert_eq!(json["active_games"], 0);
    assert_eq!(json["games_started"], 0);
}

#[tokio::test(start_paused = true)]
async fn test_status_reflects_registered_players() {
    let state = make_test_state();
    let (out_a, _rx_a) = outbound_channel(8);
    let (out_b, _rx_b) = outbound_channel(8);
    let (out_c, _rx_c) = outbound_channel(8);
    for (name, outbound) in [("alice", out_a), ("bob", out_b), ("carol", out_c)] {
        state
            .coordinator
            .register(Username::parse(name).unwrap(), outbound)
            .await
            .unwrap();
    }

    let response = get(Arc::clone(&state), "/api/status").await;
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["connected_players"], 3);
    assert_eq!(json["waiting_players"], 1);
    assert_eq!(json["active_games"], 1);
    assert_eq!(json["games_started"], 1);
}

#[tokio::test]
async fn test_ws_requires_upgrade() {
    let response = get(make_test_state(), "/ws?username=alice").await;
    assert!(response.status().is_client_error());
}

#[tokio::test]
async fn test_unknown_route_is_not_found() {
    let response = get(make_test_state(), "/api/nope").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
