//! Game trace file
//!
//! Plain-text record of one game: the settings, every executed move, the
//! board after each turn and the result.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use wargame_core::{GameObserver, GameOptions, GameState, IllegalMove, Move, Outcome, Player};

/// Trace file name for a set of options
pub fn file_name(options: &GameOptions) -> String {
    format!(
        "gametrace-{}-{}-{}.txt",
        options.alpha_beta,
        options
            .max_time
            .map_or_else(|| "none".to_string(), |t| t.to_string()),
        options
            .max_turns
            .map_or_else(|| "none".to_string(), |t| t.to_string())
    )
}

/// Observer writing the trace
pub struct Trace<W: Write> {
    out: W,
}

impl Trace<BufWriter<File>> {
    /// Create (truncate) the trace file in `dir`
    pub fn create(dir: &Path, options: &GameOptions, initial: &GameState) -> Result<Self> {
        let path = dir.join(file_name(options));
        let file = File::create(&path)
            .with_context(|| format!("Failed to create trace file: {}", path.display()))?;
        tracing::info!("Writing game trace to {}", path.display());
        Ok(Self::new(BufWriter::new(file), options, initial)?)
    }
}

impl<W: Write> Trace<W> {
    /// Write the header and the opening board
    pub fn new(mut out: W, options: &GameOptions, initial: &GameState) -> std::io::Result<Self> {
        writeln!(out, "Game started {}", chrono::Local::now().format("%Y-%m-%d %H:%M:%S"))?;
        writeln!(out, "Game set to {} turns", opt_to_string(options.max_turns))?;
        writeln!(out, "Game set to {} sec per turn", opt_to_string(options.max_time))?;
        writeln!(out, "{:?}", options.game_type)?;
        writeln!(out, "alpha-beta is {}", options.alpha_beta)?;
        writeln!(out)?;
        write!(out, "{}", initial)?;
        out.flush()?;
        Ok(Self { out })
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    /// Trace failures never stop the game
    fn record(&mut self, text: std::fmt::Arguments<'_>) {
        if let Err(e) = self.out.write_fmt(text).and_then(|_| self.out.flush()) {
            tracing::warn!(error = %e, "failed to write game trace");
        }
    }
}

fn opt_to_string<T: ToString>(value: Option<T>) -> String {
    value.map_or_else(|| "unlimited".to_string(), |v| v.to_string())
}

impl<W: Write> GameObserver for Trace<W> {
    fn move_applied(&mut self, player: Player, outcome: &Outcome) {
        self.record(format_args!("{}: {}\n", player, outcome));
    }

    fn move_rejected(&mut self, player: Player, mv: Move, reason: &IllegalMove) {
        self.record(format_args!(
            "{} tried {}: The move is not valid! Try again. ({})\n",
            player, mv, reason
        ));
    }

    fn turn_advanced(&mut self, state: &GameState) {
        self.record(format_args!("\n{}", state));
    }

    fn game_over(&mut self, winner: Player, turns: u32) {
        self.record(format_args!("{} wins in {} turns\n", winner, turns));
    }
}
