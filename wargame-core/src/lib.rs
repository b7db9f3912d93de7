//! AI Wargame Core - Game engine and AI
//!
//! This crate provides the core game logic for the wargame:
//! - Board geometry (square grid, letter rows and hex-digit columns)
//! - Unit types, health and the damage/repair tables
//! - Game state, move legality and move resolution
//! - Transition evaluation with configurable weights
//! - CPU minimax AI with optional alpha-beta pruning
//! - Live game loop with event hooks and a remote move broker

pub mod coord;
pub mod unit;
pub mod game;
pub mod eval;
pub mod ai;
pub mod options;
pub mod events;
pub mod broker;
pub mod runner;
pub mod error;

// Re-exports for convenient access
pub use coord::{Coord, Move};
pub use unit::{CombatTables, Player, Unit, UnitType, MAX_HEALTH};
pub use game::{Action, Board, Effect, GameState, Outcome};
pub use eval::{evaluate, Heuristics, Transition, MAX_HEURISTIC_SCORE, MIN_HEURISTIC_SCORE};
pub use ai::{MinimaxAI, SearchResult, SearchStats};
pub use options::{GameOptions, GameType, Strategy};
pub use events::{EventLog, GameEvent, GameObserver, NullObserver, TracingObserver};
pub use broker::{BrokerMove, BrokerReply, BrokerSource, MemoryBroker, MoveBroker, RetryPolicy};
pub use runner::{GameRunner, MoveSource, ScriptedSource};
pub use error::{BrokerError, ConfigError, IllegalMove, RunnerError, SearchError, SourceError};
