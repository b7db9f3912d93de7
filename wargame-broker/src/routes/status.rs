//! Status endpoint

use crate::state::RelayState;
use axum::{extract::State, Json};
use serde::Serialize;
use std::sync::Arc;

#[derive(Serialize)]
pub struct StatusResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub relayed: u64,
    pub latest_turn: Option<u32>,
}

pub async fn status_handler(State(state): State<Arc<RelayState>>) -> Json<StatusResponse> {
    let relayed = *state.relayed.read().await;
    let latest_turn = state.latest.read().await.map(|mv| mv.turn);
    Json(StatusResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        relayed,
        latest_turn,
    })
}
