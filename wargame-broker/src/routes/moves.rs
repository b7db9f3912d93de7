//! Move slot endpoints

use crate::state::RelayState;
use axum::{extract::State, Json};
use std::sync::Arc;
use wargame_core::{BrokerMove, BrokerReply};

/// Latest move, or null before the first post
pub async fn get_move(State(state): State<Arc<RelayState>>) -> Json<BrokerReply> {
    let latest = *state.latest.read().await;
    Json(BrokerReply {
        success: true,
        data: latest,
    })
}

/// Store a move and echo it back
pub async fn post_move(
    State(state): State<Arc<RelayState>>,
    Json(mv): Json<BrokerMove>,
) -> Json<BrokerReply> {
    *state.latest.write().await = Some(mv);
    *state.relayed.write().await += 1;

    tracing::debug!(turn = mv.turn, from = %mv.from, to = %mv.to, "move stored");

    Json(BrokerReply {
        success: true,
        data: Some(mv),
    })
}

/// Clear the slot for a new game
pub async fn reset(State(state): State<Arc<RelayState>>) -> Json<BrokerReply> {
    *state.latest.write().await = None;
    *state.relayed.write().await = 0;

    tracing::info!("relay reset");

    Json(BrokerReply {
        success: true,
        data: None,
    })
}
