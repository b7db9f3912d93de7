//! Move broker interface
//!
//! A broker relays moves between two game processes. Each side posts the
//! moves it plays and polls for the opponent's. Payloads carry the turn
//! number so a stale move is never replayed.

use crate::coord::{Coord, Move};
use crate::error::{BrokerError, IllegalMove, SourceError};
use crate::game::GameState;
use crate::runner::MoveSource;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// Move as exchanged with the broker
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrokerMove {
    pub from: Coord,
    pub to: Coord,
    /// Turns played once this move has been applied
    pub turn: u32,
}

impl BrokerMove {
    pub fn new(mv: Move, turn: u32) -> Self {
        Self {
            from: mv.src,
            to: mv.dst,
            turn,
        }
    }

    pub fn to_move(self) -> Move {
        Move::new(self.from, self.to)
    }
}

/// Broker response envelope
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrokerReply {
    pub success: bool,
    #[serde(default)]
    pub data: Option<BrokerMove>,
}

/// Move relay transport
pub trait MoveBroker {
    /// Publish a move. The broker must echo it back.
    fn submit(&mut self, mv: &BrokerMove) -> Result<(), BrokerError>;

    /// Latest move held by the broker, if any
    fn poll(&mut self) -> Result<Option<BrokerMove>, BrokerError>;
}

/// How long to keep polling for a remote move
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    pub delay: Duration,
    /// None polls forever
    pub max_attempts: Option<u32>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            delay: Duration::from_millis(100),
            max_attempts: None,
        }
    }
}

/// Publish a move; failures are logged and otherwise ignored.
///
/// Returns whether the broker acknowledged the move.
pub fn publish(broker: &mut dyn MoveBroker, mv: Move, turn: u32) -> bool {
    match broker.submit(&BrokerMove::new(mv, turn)) {
        Ok(()) => {
            tracing::debug!(%mv, turn, "move published");
            true
        }
        Err(e) => {
            tracing::warn!(%mv, turn, error = %e, "broker rejected move");
            false
        }
    }
}

/// Poll until the broker holds the move for `expected_turn`.
///
/// Moves for any other turn and transport errors are skipped. Gives up
/// only when the policy's attempt limit is reached.
pub fn await_move(
    broker: &mut dyn MoveBroker,
    policy: &RetryPolicy,
    expected_turn: u32,
) -> Result<Move, SourceError> {
    let started = Instant::now();
    let mut attempts = 0u32;

    loop {
        attempts += 1;
        match broker.poll() {
            Ok(Some(remote)) if remote.turn == expected_turn => {
                tracing::debug!(mv = %remote.to_move(), turn = remote.turn, "remote move received");
                return Ok(remote.to_move());
            }
            Ok(Some(remote)) => {
                tracing::trace!(turn = remote.turn, expected_turn, "stale broker move");
            }
            Ok(None) => {}
            Err(e) => tracing::warn!(error = %e, "broker poll failed"),
        }

        if policy.max_attempts.is_some_and(|max| attempts >= max) {
            return Err(SourceError::Exhausted {
                attempts,
                elapsed: started.elapsed(),
            });
        }
        std::thread::sleep(policy.delay);
    }
}

/// Remote opponent fed by a broker
pub struct BrokerSource<'a> {
    broker: &'a mut dyn MoveBroker,
    policy: &'a RetryPolicy,
}

impl<'a> BrokerSource<'a> {
    pub fn new(broker: &'a mut dyn MoveBroker, policy: &'a RetryPolicy) -> Self {
        Self { broker, policy }
    }
}

impl MoveSource for BrokerSource<'_> {
    fn next_move(&mut self, state: &GameState) -> Result<Move, SourceError> {
        await_move(&mut *self.broker, self.policy, state.turns_played() + 1)
    }

    fn rejected(&mut self, mv: Move, reason: &IllegalMove) {
        tracing::warn!(%mv, %reason, "remote move rejected, polling again");
        std::thread::sleep(self.policy.delay);
    }
}

/// In-process broker holding the latest move
#[derive(Clone, Debug, Default)]
pub struct MemoryBroker {
    latest: Option<BrokerMove>,
}

impl MemoryBroker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn latest(&self) -> Option<BrokerMove> {
        self.latest
    }
}

impl MoveBroker for MemoryBroker {
    fn submit(&mut self, mv: &BrokerMove) -> Result<(), BrokerError> {
        self.latest = Some(*mv);
        Ok(())
    }

    fn poll(&mut self) -> Result<Option<BrokerMove>, BrokerError> {
        Ok(self.latest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;

    /// Broker replaying canned poll results
    struct Scripted {
        polls: VecDeque<Result<Option<BrokerMove>, BrokerError>>,
        submitted: Vec<BrokerMove>,
    }

    impl MoveBroker for Scripted {
        fn submit(&mut self, mv: &BrokerMove) -> Result<(), BrokerError> {
            self.submitted.push(*mv);
            Err(BrokerError::Mismatch)
        }

        fn poll(&mut self) -> Result<Option<BrokerMove>, BrokerError> {
            self.polls.pop_front().unwrap_or(Ok(None))
        }
    }

    fn quick(max_attempts: u32) -> RetryPolicy {
        RetryPolicy {
            delay: Duration::from_millis(1),
            max_attempts: Some(max_attempts),
        }
    }

    fn mv() -> Move {
        Move::new(Coord::new(1, 0), Coord::new(2, 0))
    }

    #[test]
    fn test_wire_format() {
        let json = serde_json::to_value(BrokerMove::new(mv(), 3)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"from": {"row": 1, "col": 0}, "to": {"row": 2, "col": 0}, "turn": 3})
        );

        let reply: BrokerReply = serde_json::from_str(r#"{"success": true}"#).unwrap();
        assert_eq!(reply.data, None);
    }

    #[test]
    fn test_await_skips_stale_and_errors() {
        let mut broker = Scripted {
            polls: VecDeque::from(vec![
                Ok(None),
                Ok(Some(BrokerMove::new(Move::new(Coord::new(3, 4), Coord::new(2, 4)), 1))),
                Err(BrokerError::Transport("connection refused".into())),
                Ok(Some(BrokerMove::new(mv(), 2))),
            ]),
            submitted: Vec::new(),
        };
        let got = await_move(&mut broker, &quick(10), 2).unwrap();
        assert_eq!(got, mv());
    }

    #[test]
    fn test_await_gives_up() {
        let mut broker = MemoryBroker::new();
        let err = await_move(&mut broker, &quick(3), 1).unwrap_err();
        assert!(matches!(err, SourceError::Exhausted { attempts: 3, .. }));
    }

    #[test]
    fn test_publish_failure_is_not_fatal() {
        let mut broker = Scripted {
            polls: VecDeque::new(),
            submitted: Vec::new(),
        };
        assert!(!publish(&mut broker, mv(), 5));
        assert_eq!(broker.submitted, vec![BrokerMove::new(mv(), 5)]);

        let mut memory = MemoryBroker::new();
        assert!(publish(&mut memory, mv(), 5));
        assert_eq!(memory.latest().map(|m| m.turn), Some(5));
    }
}
