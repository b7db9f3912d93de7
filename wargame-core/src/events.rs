//! Game event hooks
//!
//! The game loop reports what happens through a [`GameObserver`]. Every hook
//! has an empty default so observers only implement what they care about.

use crate::ai::{SearchResult, SearchStats};
use crate::coord::Move;
use crate::error::IllegalMove;
use crate::game::{GameState, Outcome};
use crate::unit::Player;

/// Receives game loop events
pub trait GameObserver {
    /// A move passed validation and was executed
    fn move_applied(&mut self, _player: Player, _outcome: &Outcome) {}

    /// A human or remote move failed validation; the state is unchanged
    fn move_rejected(&mut self, _player: Player, _mv: Move, _reason: &IllegalMove) {}

    /// The computer finished searching for its move
    fn search_completed(&mut self, _player: Player, _result: &SearchResult, _stats: &SearchStats) {}

    /// The turn counter advanced; `state` is the new position
    fn turn_advanced(&mut self, _state: &GameState) {}

    fn game_over(&mut self, _winner: Player, _turns: u32) {}
}

/// Observer that drops every event
pub struct NullObserver;

impl GameObserver for NullObserver {}

/// Observer that forwards events to `tracing`
pub struct TracingObserver;

impl GameObserver for TracingObserver {
    fn move_applied(&mut self, player: Player, outcome: &Outcome) {
        tracing::info!(%player, action = ?outcome.action(), "{}", outcome);
    }

    fn move_rejected(&mut self, player: Player, mv: Move, reason: &IllegalMove) {
        tracing::warn!(%player, %mv, %reason, "move rejected");
    }

    fn search_completed(&mut self, player: Player, result: &SearchResult, stats: &SearchStats) {
        tracing::debug!(
            %player,
            score = result.score,
            total_evaluations = stats.total_evaluations(),
            "search stats"
        );
    }

    fn turn_advanced(&mut self, state: &GameState) {
        tracing::debug!(turn = state.turns_played(), next = %state.next_player(), "turn advanced");
    }

    fn game_over(&mut self, winner: Player, turns: u32) {
        tracing::info!(%winner, turns, "game over");
    }
}

/// Fan events out to several observers in order
impl GameObserver for Vec<Box<dyn GameObserver>> {
    fn move_applied(&mut self, player: Player, outcome: &Outcome) {
        for observer in self.iter_mut() {
            observer.move_applied(player, outcome);
        }
    }

    fn move_rejected(&mut self, player: Player, mv: Move, reason: &IllegalMove) {
        for observer in self.iter_mut() {
            observer.move_rejected(player, mv, reason);
        }
    }

    fn search_completed(&mut self, player: Player, result: &SearchResult, stats: &SearchStats) {
        for observer in self.iter_mut() {
            observer.search_completed(player, result, stats);
        }
    }

    fn turn_advanced(&mut self, state: &GameState) {
        for observer in self.iter_mut() {
            observer.turn_advanced(state);
        }
    }

    fn game_over(&mut self, winner: Player, turns: u32) {
        for observer in self.iter_mut() {
            observer.game_over(winner, turns);
        }
    }
}

/// Recorded event, for replay and tests
#[derive(Clone, Debug, PartialEq)]
pub enum GameEvent {
    MoveApplied { player: Player, outcome: Outcome },
    MoveRejected { player: Player, mv: Move, reason: IllegalMove },
    SearchCompleted { player: Player, mv: Move, score: i32 },
    TurnAdvanced { turns_played: u32, next_player: Player },
    GameOver { winner: Player, turns: u32 },
}

/// Observer that keeps every event in memory
#[derive(Clone, Debug, Default)]
pub struct EventLog {
    pub events: Vec<GameEvent>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Executed moves, in order
    pub fn moves(&self) -> impl Iterator<Item = &Outcome> {
        self.events.iter().filter_map(|event| match event {
            GameEvent::MoveApplied { outcome, .. } => Some(outcome),
            _ => None,
        })
    }

    pub fn winner(&self) -> Option<Player> {
        self.events.iter().rev().find_map(|event| match event {
            GameEvent::GameOver { winner, .. } => Some(*winner),
            _ => None,
        })
    }
}

impl GameObserver for EventLog {
    fn move_applied(&mut self, player: Player, outcome: &Outcome) {
        self.events.push(GameEvent::MoveApplied { player, outcome: *outcome });
    }

    fn move_rejected(&mut self, player: Player, mv: Move, reason: &IllegalMove) {
        self.events.push(GameEvent::MoveRejected {
            player,
            mv,
            reason: reason.clone(),
        });
    }

    fn search_completed(&mut self, player: Player, result: &SearchResult, _stats: &SearchStats) {
        self.events.push(GameEvent::SearchCompleted {
            player,
            mv: result.mv,
            score: result.score,
        });
    }

    fn turn_advanced(&mut self, state: &GameState) {
        self.events.push(GameEvent::TurnAdvanced {
            turns_played: state.turns_played(),
            next_player: state.next_player(),
        });
    }

    fn game_over(&mut self, winner: Player, turns: u32) {
        self.events.push(GameEvent::GameOver { winner, turns });
    }
}
