//! Live game loop
//!
//! Drives one game from the opening to a winner. Each side is played by the
//! search engine, a local [`MoveSource`] (keyboard, script) or, when a broker
//! is attached, the remote peer.

use crate::ai::MinimaxAI;
use crate::broker::{publish, BrokerSource, MoveBroker, RetryPolicy};
use crate::coord::Move;
use crate::error::{IllegalMove, RunnerError, SourceError};
use crate::events::GameObserver;
use crate::game::{GameState, Outcome};
use crate::unit::Player;
use std::collections::VecDeque;

/// Supplier of moves for a non-computer side
pub trait MoveSource {
    fn next_move(&mut self, state: &GameState) -> Result<Move, SourceError>;

    /// Called when the last move failed validation; the next call retries
    fn rejected(&mut self, _mv: Move, _reason: &IllegalMove) {}
}

/// Plays a fixed list of moves, then reports the input as closed
#[derive(Clone, Debug, Default)]
pub struct ScriptedSource {
    moves: VecDeque<Move>,
}

impl ScriptedSource {
    pub fn new(moves: impl IntoIterator<Item = Move>) -> Self {
        Self {
            moves: moves.into_iter().collect(),
        }
    }

    pub fn remaining(&self) -> usize {
        self.moves.len()
    }
}

impl MoveSource for ScriptedSource {
    fn next_move(&mut self, _state: &GameState) -> Result<Move, SourceError> {
        self.moves.pop_front().ok_or(SourceError::Closed)
    }
}

/// Owns a live game and plays it turn by turn
pub struct GameRunner<'o> {
    state: GameState,
    ai: MinimaxAI,
    observer: &'o mut dyn GameObserver,
    broker: Option<(Box<dyn MoveBroker>, RetryPolicy)>,
    history: Vec<Move>,
}

impl<'o> GameRunner<'o> {
    pub fn new(state: GameState, ai: MinimaxAI, observer: &'o mut dyn GameObserver) -> Self {
        Self {
            state,
            ai,
            observer,
            broker: None,
            history: Vec::new(),
        }
    }

    /// Exchange moves with a remote peer. The non-computer side is then
    /// read from the broker instead of the local source.
    pub fn with_broker(mut self, broker: Box<dyn MoveBroker>, policy: RetryPolicy) -> Self {
        self.broker = Some((broker, policy));
        self
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn ai(&self) -> &MinimaxAI {
        &self.ai
    }

    /// Moves executed so far
    pub fn history(&self) -> &[Move] {
        &self.history
    }

    /// Play until someone wins
    pub fn run(&mut self, local: &mut dyn MoveSource) -> Result<Player, RunnerError> {
        tracing::info!(
            game_type = ?self.state.options().game_type,
            dim = self.state.dim(),
            broker = self.broker.is_some(),
            "game started"
        );
        loop {
            if let Some(winner) = self.play_turn(local)? {
                return Ok(winner);
            }
        }
    }

    /// Play one turn. Returns the winner instead when the game is over.
    pub fn play_turn(&mut self, local: &mut dyn MoveSource) -> Result<Option<Player>, RunnerError> {
        if let Some(winner) = self.state.has_winner() {
            self.observer.game_over(winner, self.state.turns_played());
            return Ok(Some(winner));
        }

        let player = self.state.next_player();
        if self.state.options().game_type.is_computer(player) {
            self.computer_turn(player)?;
        } else {
            self.source_turn(player, local)?;
        }
        Ok(None)
    }

    fn computer_turn(&mut self, player: Player) -> Result<(), RunnerError> {
        let result = self.ai.suggest_move(&self.state)?;
        self.observer.search_completed(player, &result, self.ai.stats());

        let mv = result.mv;
        let outcome = self
            .state
            .perform_move(mv)
            .map_err(|reason| RunnerError::IllegalSearchMove { mv, reason })?;
        self.finish_move(player, outcome);

        if let Some((broker, _)) = self.broker.as_mut() {
            publish(&mut **broker, mv, self.state.turns_played());
        }
        Ok(())
    }

    fn source_turn(&mut self, player: Player, local: &mut dyn MoveSource) -> Result<(), RunnerError> {
        let Self {
            state,
            broker,
            observer,
            ..
        } = &mut *self;

        let mut remote;
        let source: &mut dyn MoveSource = match broker.as_mut() {
            Some((broker, policy)) => {
                remote = BrokerSource::new(&mut **broker, policy);
                &mut remote
            }
            None => local,
        };

        let outcome = loop {
            let mv = source.next_move(state)?;
            match state.perform_move(mv) {
                Ok(outcome) => break outcome,
                Err(reason) => {
                    observer.move_rejected(player, mv, &reason);
                    source.rejected(mv, &reason);
                }
            }
        };
        self.finish_move(player, outcome);
        Ok(())
    }

    fn finish_move(&mut self, player: Player, outcome: Outcome) {
        self.observer.move_applied(player, &outcome);
        self.history.push(outcome.mv);
        self.state.next_turn();
        self.observer.turn_advanced(&self.state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::broker::{BrokerMove, MemoryBroker};
    use crate::coord::Coord;
    use crate::events::{EventLog, GameEvent};
    use crate::options::{GameOptions, GameType};
    use std::sync::Arc;
    use std::time::Duration;

    fn c(row: i8, col: i8) -> Coord {
        Coord::new(row, col)
    }

    fn options(game_type: GameType, max_turns: Option<u32>) -> GameOptions {
        GameOptions {
            game_type,
            max_turns,
            max_depth: 2,
            max_time: None,
            seed: Some(11),
            ..Default::default()
        }
    }

    #[test]
    fn test_computer_game_reaches_a_winner() {
        let options = options(GameType::CompVsComp, Some(12));
        let ai = MinimaxAI::from_options(&options);
        let mut log = EventLog::new();
        let mut runner = GameRunner::new(GameState::new(Arc::new(options)), ai, &mut log);

        let winner = runner.run(&mut ScriptedSource::default()).unwrap();
        assert!(runner.state().is_finished());
        assert!(runner.history().len() <= 12);
        assert!(runner.ai().stats().total_evaluations() > 0);
        drop(runner);
        assert_eq!(log.winner(), Some(winner));
    }

    #[test]
    fn test_rejected_move_is_retried() {
        let options = options(GameType::Manual, Some(2));
        let ai = MinimaxAI::from_options(&options);
        let mut log = EventLog::new();
        let mut runner = GameRunner::new(GameState::new(Arc::new(options)), ai, &mut log);
        let mut script = ScriptedSource::new([
            Move::new(c(0, 0), c(0, 0)),
            Move::new(c(2, 4), c(1, 4)),
            Move::new(c(1, 1), c(1, 2)),
        ]);

        // Turn limit reached with both AIs alive: the Defender wins
        let winner = runner.run(&mut script).unwrap();
        assert_eq!(winner, Player::Defender);
        assert_eq!(script.remaining(), 0);
        assert_eq!(runner.history().len(), 2);
        drop(runner);
        assert!(matches!(
            log.events[0],
            GameEvent::MoveRejected {
                reason: IllegalMove::NotYourUnit { .. },
                ..
            }
        ));
    }

    #[test]
    fn test_closed_source_stops_the_game() {
        let options = options(GameType::Manual, None);
        let ai = MinimaxAI::from_options(&options);
        let mut log = EventLog::new();
        let mut runner = GameRunner::new(GameState::new(Arc::new(options)), ai, &mut log);

        let err = runner.run(&mut ScriptedSource::default()).unwrap_err();
        assert!(matches!(err, RunnerError::Source(SourceError::Closed)));
        assert_eq!(runner.state().turns_played(), 0);
    }

    #[test]
    fn test_broker_feeds_remote_side() {
        let options = options(GameType::AttackerVsComp, None);
        let ai = MinimaxAI::from_options(&options);
        let mut broker = MemoryBroker::new();
        broker
            .submit(&BrokerMove::new(Move::new(c(2, 4), c(1, 4)), 1))
            .unwrap();
        let policy = RetryPolicy {
            delay: Duration::from_millis(1),
            max_attempts: Some(3),
        };

        let mut log = EventLog::new();
        let mut runner = GameRunner::new(GameState::new(Arc::new(options)), ai, &mut log)
            .with_broker(Box::new(broker), policy);

        // The remote Attacker moves, the computer answers, then nothing new arrives
        let err = runner.run(&mut ScriptedSource::default()).unwrap_err();
        assert!(matches!(
            err,
            RunnerError::Source(SourceError::Exhausted { attempts: 3, .. })
        ));
        assert_eq!(runner.history().len(), 2);
        assert_eq!(runner.history()[0], Move::new(c(2, 4), c(1, 4)));
    }
}
