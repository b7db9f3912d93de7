//! AI Wargame CLI - Command-line interface
//!
//! Commands:
//! - play: Play one game (human, computer or remote peer on either side)
//! - serve: Start the move broker relay

mod console;
mod human;
mod play;
mod serve;
mod trace;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "wargame")]
#[command(about = "Two-player AI wargame on a square grid")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play a game
    Play(play::PlayArgs),
    /// Start the move broker relay
    Serve(serve::ServeArgs),
}

fn main() -> anyhow::Result<()> {
    // Logs go to stderr so they never interleave with the board
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Play(args) => play::run(args),
        Commands::Serve(args) => serve::run(args),
    }
}
