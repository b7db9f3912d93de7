//! Play command - run one live game
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: run() - orchestration
//! - Level 2: build_options(), build_observers(), play_game()
//! - Level 3: load_base_options(), apply_flags(), connect_broker()
//! - Level 4: game type mapping

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{ArgAction, Args, ValueEnum};

use wargame_broker::HttpBroker;
use wargame_core::{
    GameObserver, GameOptions, GameRunner, GameState, GameType, MinimaxAI, Player, RetryPolicy,
    Strategy,
};

use crate::console::Console;
use crate::human::Keyboard;
use crate::trace::Trace;

// ============================================================================
// COMMAND ARGUMENTS (Level 4 - Configuration)
// ============================================================================

/// Who plays which side
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum GameTypeArg {
    /// Computer against computer
    Auto,
    /// Human Attacker against the computer
    Attacker,
    /// Human Defender against the computer
    Defender,
    /// Human (or broker) on both sides
    Manual,
}

impl From<GameTypeArg> for GameType {
    fn from(arg: GameTypeArg) -> Self {
        match arg {
            GameTypeArg::Auto => GameType::CompVsComp,
            GameTypeArg::Attacker => GameType::AttackerVsComp,
            GameTypeArg::Defender => GameType::CompVsDefender,
            GameTypeArg::Manual => GameType::Manual,
        }
    }
}

#[derive(Args)]
pub struct PlayArgs {
    /// Who plays which side [default: auto, or the config file's game type]
    #[arg(long, value_enum)]
    pub game_type: Option<GameTypeArg>,

    /// Maximum search depth
    #[arg(long)]
    pub max_depth: Option<u32>,

    /// Maximum search time per move, in seconds
    #[arg(long)]
    pub max_time: Option<f64>,

    /// Enable alpha-beta pruning
    #[arg(long, action = ArgAction::Set)]
    pub alpha_beta: Option<bool>,

    /// Turn limit; the Defender wins when it is reached
    #[arg(long)]
    pub max_turns: Option<u32>,

    /// Board dimension
    #[arg(long)]
    pub dim: Option<u8>,

    /// Exchange moves with a remote peer through this broker URL
    #[arg(long, value_name = "URL")]
    pub broker: Option<String>,

    /// Computer plays uniformly random legal moves
    #[arg(long)]
    pub random: bool,

    /// Seed for move randomization
    #[arg(long)]
    pub seed: Option<u64>,

    /// JSON options file; flags override its values
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Do not write the game trace file
    #[arg(long)]
    pub no_trace: bool,
}

// ============================================================================
// LEVEL 1 - ORCHESTRATION
// ============================================================================

/// Run play command
///
/// This function reads like a table of contents:
/// 1. Build options from the config file and flags
/// 2. Set up console and trace output
/// 3. Play the game to the end
pub fn run(args: PlayArgs) -> Result<()> {
    let options = Arc::new(build_options(&args)?);
    let state = GameState::new(options.clone());

    tracing::info!(
        "Starting {:?} game on a {}x{} board (depth={}, alpha-beta={})",
        options.game_type,
        options.dim,
        options.dim,
        options.max_depth,
        options.alpha_beta
    );
    tracing::debug!(options = %serde_json::to_string(options.as_ref())?, "effective options");

    let mut observers = build_observers(&args, &options, &state)?;

    println!();
    print!("{}", state);

    let winner = play_game(state, &options, &mut observers)?;
    tracing::info!(%winner, "game finished");

    Ok(())
}

// ============================================================================
// LEVEL 2 - PHASES
// ============================================================================

/// Layer flags over the config file (or the defaults) and validate
fn build_options(args: &PlayArgs) -> Result<GameOptions> {
    let mut options = load_base_options(args.config.as_deref())?;
    apply_flags(&mut options, args);
    options.validate().context("Invalid game options")?;
    Ok(options)
}

/// Console output, plus the trace file unless disabled
fn build_observers(
    args: &PlayArgs,
    options: &GameOptions,
    initial: &GameState,
) -> Result<Vec<Box<dyn GameObserver>>> {
    let mut observers: Vec<Box<dyn GameObserver>> = vec![Box::new(Console::new(options))];
    if !args.no_trace {
        observers.push(Box::new(Trace::create(Path::new("."), options, initial)?));
    }
    Ok(observers)
}

/// Run the live game loop until a winner is known
fn play_game(
    state: GameState,
    options: &GameOptions,
    observer: &mut dyn GameObserver,
) -> Result<Player> {
    let ai = MinimaxAI::from_options(options);
    let mut runner = GameRunner::new(state, ai, observer);

    if let Some(url) = &options.broker {
        runner = runner.with_broker(Box::new(connect_broker(url)?), RetryPolicy::default());
    }

    let mut keyboard = Keyboard::stdin();
    Ok(runner.run(&mut keyboard)?)
}

// ============================================================================
// LEVEL 3 - STEPS
// ============================================================================

fn load_base_options(config: Option<&Path>) -> Result<GameOptions> {
    match config {
        Some(path) => GameOptions::load(path)
            .with_context(|| format!("Failed to load options: {}", path.display())),
        None => Ok(GameOptions {
            game_type: GameTypeArg::Auto.into(),
            ..Default::default()
        }),
    }
}

fn apply_flags(options: &mut GameOptions, args: &PlayArgs) {
    if let Some(game_type) = args.game_type {
        options.game_type = game_type.into();
    }
    if let Some(depth) = args.max_depth {
        options.max_depth = depth;
    }
    if let Some(secs) = args.max_time {
        options.max_time = Some(secs);
    }
    if let Some(alpha_beta) = args.alpha_beta {
        options.alpha_beta = alpha_beta;
    }
    if let Some(turns) = args.max_turns {
        options.max_turns = Some(turns);
    }
    if let Some(dim) = args.dim {
        options.dim = dim;
    }
    if let Some(url) = &args.broker {
        options.broker = Some(url.clone());
    }
    if args.random {
        options.strategy = Strategy::Random;
    }
    if let Some(seed) = args.seed {
        options.seed = Some(seed);
    }
}

fn connect_broker(url: &str) -> Result<HttpBroker> {
    tracing::info!("Exchanging moves through broker at {}", url);
    HttpBroker::new(url).with_context(|| format!("Failed to set up broker client for {}", url))
}

// ============================================================================
// TESTS
// ============================================================================
