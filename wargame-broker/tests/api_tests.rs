//! Integration tests for the wargame-broker relay API

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;
use wargame_broker::{create_router, RelayState};

fn test_app() -> (axum::Router, Arc<RelayState>) {
    let state = Arc::new(RelayState::new());
    (create_router(state.clone()), state)
}

async fn body_json(response: axum::response::Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

fn post_json(uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn sample_move(turn: u32) -> Value {
    json!({"from": {"row": 3, "col": 4}, "to": {"row": 2, "col": 4}, "turn": turn})
}

#[tokio::test]
async fn test_status_endpoint() {
    let (app, _) = test_app();

    let response = app.oneshot(get("/api/status")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
    assert_eq!(json["relayed"], 0);
    assert!(json["latest_turn"].is_null());
}

#[tokio::test]
async fn test_empty_slot() {
    let (app, _) = test_app();

    let response = app.oneshot(get("/")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["success"], true);
    assert!(json["data"].is_null());
}

#[tokio::test]
async fn test_post_echoes_and_stores() {
    let (app, state) = test_app();

    let response = app
        .clone()
        .oneshot(post_json("/", &sample_move(1)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["success"], true);
    assert_eq!(json["data"], sample_move(1));
    assert_eq!(state.latest.read().await.map(|mv| mv.turn), Some(1));

    let json = body_json(app.oneshot(get("/")).await.unwrap()).await;
    assert_eq!(json["data"], sample_move(1));
}

#[tokio::test]
async fn test_latest_move_wins() {
    let (app, _) = test_app();

    for turn in 1..=3 {
        app.clone()
            .oneshot(post_json("/", &sample_move(turn)))
            .await
            .unwrap();
    }

    let json = body_json(app.clone().oneshot(get("/")).await.unwrap()).await;
    assert_eq!(json["data"]["turn"], 3);

    let json = body_json(app.oneshot(get("/api/status")).await.unwrap()).await;
    assert_eq!(json["relayed"], 3);
    assert_eq!(json["latest_turn"], 3);
}

#[tokio::test]
async fn test_reset_clears_slot() {
    let (app, _) = test_app();

    app.clone()
        .oneshot(post_json("/", &sample_move(5)))
        .await
        .unwrap();

    let response = app
        .clone()
        .oneshot(post_json("/reset", &json!({})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(app.oneshot(get("/")).await.unwrap()).await;
    assert!(json["data"].is_null());
}

#[tokio::test]
async fn test_malformed_move_rejected() {
    let (app, state) = test_app();

    let response = app
        .oneshot(post_json("/", &json!({"from": "D4", "turn": 1})))
        .await
        .unwrap();
    assert!(response.status().is_client_error());
    assert!(state.latest.read().await.is_none());
}
