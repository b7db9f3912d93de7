//! Serve command - start the move broker relay
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: run() - orchestration
//! - Level 2: configure_relay(), start_relay()
//! - Level 3: (delegated to wargame-broker crate)
//! - Level 4: configuration validation

use anyhow::Result;
use clap::Args;

use wargame_broker::{run_server, BrokerConfig};

// ============================================================================
// COMMAND ARGUMENTS (Level 4 - Configuration)
// ============================================================================

#[derive(Args)]
pub struct ServeArgs {
    /// Port number to listen on
    #[arg(long, default_value = "8001")]
    pub port: u16,
}

// ============================================================================
// LEVEL 1 - ORCHESTRATION
// ============================================================================

/// Run serve command
///
/// This function reads like a table of contents:
/// 1. Configure relay
/// 2. Start relay (blocking)
pub fn run(args: ServeArgs) -> Result<()> {
    let config = configure_relay(&args)?;

    tracing::info!("Starting wargame broker on port {}", config.port);

    start_relay(config)
}

// ============================================================================
// LEVEL 2 - PHASES
// ============================================================================

/// Configure relay from command arguments
fn configure_relay(args: &ServeArgs) -> Result<BrokerConfig> {
    validate_port(args.port)?;

    Ok(BrokerConfig { port: args.port })
}

/// Start the relay (blocking)
fn start_relay(config: BrokerConfig) -> Result<()> {
    // Create tokio runtime for async server
    let runtime = tokio::runtime::Runtime::new()?;

    runtime.block_on(async { run_server(config).await })
}

// ============================================================================
// LEVEL 3 - STEPS
// ============================================================================

/// Port 0 would bind a random port the peers cannot know
fn validate_port(port: u16) -> Result<()> {
    if port == 0 {
        anyhow::bail!("Relay port must be non-zero");
    }
    Ok(())
}

// ============================================================================
// TESTS
// ============================================================================
