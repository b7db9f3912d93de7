//! AI Wargame Broker - move relay between two game processes
//!
//! This crate provides both ends of the remote play channel:
//! - A small HTTP relay holding the latest posted move
//! - An HTTP client implementing the core `MoveBroker` trait

mod client;
mod routes;
mod state;

use axum::{routing::get, routing::post, Router};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

pub use client::HttpBroker;
pub use state::RelayState;

/// Relay configuration
#[derive(Clone, Debug)]
pub struct BrokerConfig {
    pub port: u16,
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self { port: 8001 }
    }
}

/// Create the router with all routes
pub fn create_router(state: Arc<RelayState>) -> Router {
    Router::new()
        // Status endpoint
        .route("/api/status", get(routes::status::status_handler))
        // Move slot
        .route(
            "/",
            get(routes::moves::get_move).post(routes::moves::post_move),
        )
        .route("/reset", post(routes::moves::reset))
        // Shared state
        .with_state(state)
        // Either game instance may run in a browser tab
        .layer(CorsLayer::permissive())
}

/// Start the relay on all interfaces
pub async fn run_server(config: BrokerConfig) -> anyhow::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    serve(listener).await
}

/// Serve the relay on an already bound listener
pub async fn serve(listener: tokio::net::TcpListener) -> anyhow::Result<()> {
    let state = Arc::new(RelayState::new());
    let router = create_router(state);

    tracing::info!("Wargame broker listening on http://{}", listener.local_addr()?);

    axum::serve(listener, router).await?;

    Ok(())
}
