//! Example to run the move relay standalone
//!
//! Run with: cargo run -p wargame-broker --example run_server

use wargame_broker::{run_server, BrokerConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    let config = BrokerConfig::default();

    println!("Starting wargame broker on port {}", config.port);
    println!("Point both games at http://localhost:{}/", config.port);

    run_server(config).await
}
