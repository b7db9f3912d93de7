//! Error types

use crate::coord::{Coord, Move};
use crate::unit::{Player, UnitType};
use std::time::Duration;
use thiserror::Error;

/// Why a submitted move was rejected. Rejection never mutates state.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum IllegalMove {
    #[error("{0} is off the board")]
    OutOfBounds(Coord),
    #[error("no unit at {0}")]
    NoUnit(Coord),
    #[error("the unit at {at} belongs to the {owner}")]
    NotYourUnit { at: Coord, owner: Player },
    #[error("{dst} is not adjacent to {src}")]
    NotAdjacent { src: Coord, dst: Coord },
    #[error("{actor} cannot repair {target}")]
    CannotRepair { actor: UnitType, target: UnitType },
    #[error("the unit at {0} is already at full health")]
    FullHealth(Coord),
    #[error("{unit} at {at} is engaged by an adjacent enemy and cannot move")]
    Engaged { unit: UnitType, at: Coord },
    #[error("{unit} can only advance toward the opponent")]
    WrongDirection { unit: UnitType },
}

/// Search failures
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum SearchError {
    #[error("no legal moves for the {player}")]
    NoLegalMoves { player: Player },
    #[error("the game is already over")]
    GameOver,
}

/// Invalid game options
#[derive(Clone, Debug, PartialEq, Error)]
pub enum ConfigError {
    #[error("board dimension {0} is outside 4..=16")]
    Dimension(u8),
    #[error("search depth must be at least 1")]
    ZeroDepth,
    #[error("time budget must be a positive number of seconds a Duration can hold, got {0}")]
    TimeBudget(f64),
}

/// Broker transport and payload failures (always transient)
#[derive(Debug, Error)]
pub enum BrokerError {
    #[error("broker transport failure: {0}")]
    Transport(String),
    #[error("broker answered with status {0}")]
    Status(u16),
    #[error("malformed broker payload: {0}")]
    Decode(String),
    #[error("broker did not echo the submitted move")]
    Mismatch,
}

/// Failure to obtain a move from a human or remote source
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("move input closed")]
    Closed,
    #[error("no move received after {attempts} attempts over {elapsed:?}")]
    Exhausted { attempts: u32, elapsed: Duration },
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Live game loop failures
#[derive(Debug, Error)]
pub enum RunnerError {
    #[error(transparent)]
    Search(#[from] SearchError),
    #[error(transparent)]
    Source(#[from] SourceError),
    #[error("search chose {mv}, which the rules reject: {reason}")]
    IllegalSearchMove { mv: Move, reason: IllegalMove },
}
