//! Game options - board, search and match configuration

use crate::error::ConfigError;
use crate::eval::Heuristics;
use crate::unit::{CombatTables, Player};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Smallest board the fixed deployment fits on
pub const MIN_DIM: u8 = 4;

/// Largest board the column notation can address
pub const MAX_DIM: u8 = 16;

/// Who controls each side
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameType {
    /// Human (or broker) on both sides
    Manual,
    /// Human Attacker, computer Defender
    AttackerVsComp,
    /// Computer Attacker, human Defender
    CompVsDefender,
    /// Computer on both sides
    CompVsComp,
}

impl GameType {
    pub fn is_computer(self, player: Player) -> bool {
        match self {
            GameType::Manual => false,
            GameType::AttackerVsComp => player == Player::Defender,
            GameType::CompVsDefender => player == Player::Attacker,
            GameType::CompVsComp => true,
        }
    }
}

/// How the computer picks its moves
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Strategy {
    /// Depth- and time-bounded minimax
    Minimax,
    /// Uniformly random legal move
    Random,
}

/// Process-wide options, shared immutably by every state clone
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct GameOptions {
    pub dim: u8,
    pub max_depth: u32,
    /// Search time ceiling in seconds (None = unbounded)
    pub max_time: Option<f64>,
    pub alpha_beta: bool,
    pub max_turns: Option<u32>,
    pub randomize_moves: bool,
    pub seed: Option<u64>,
    pub strategy: Strategy,
    pub game_type: GameType,
    pub broker: Option<String>,
    pub heuristics: Heuristics,
    pub tables: CombatTables,
}

impl Default for GameOptions {
    fn default() -> Self {
        Self {
            dim: 5,
            max_depth: 4,
            max_time: Some(5.0),
            alpha_beta: true,
            max_turns: Some(100),
            randomize_moves: true,
            seed: None,
            strategy: Strategy::Minimax,
            game_type: GameType::Manual,
            broker: None,
            heuristics: Heuristics::default(),
            tables: CombatTables::default(),
        }
    }
}

impl GameOptions {
    /// Load options from a JSON file; missing fields take their defaults
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let options: GameOptions = serde_json::from_str(&content)?;
        options.validate()?;
        Ok(options)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(MIN_DIM..=MAX_DIM).contains(&self.dim) {
            return Err(ConfigError::Dimension(self.dim));
        }
        if self.max_depth == 0 {
            return Err(ConfigError::ZeroDepth);
        }
        if let Some(secs) = self.max_time {
            if secs <= 0.0 || Duration::try_from_secs_f64(secs).is_err() {
                return Err(ConfigError::TimeBudget(secs));
            }
        }
        Ok(())
    }

    /// Search time ceiling. A ceiling no `Duration` can hold is unbounded.
    pub fn time_budget(&self) -> Option<Duration> {
        self.max_time
            .and_then(|secs| Duration::try_from_secs_f64(secs).ok())
    }
}
