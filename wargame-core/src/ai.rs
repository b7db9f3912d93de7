//! CPU minimax search with optional alpha-beta pruning

use crate::coord::Move;
use crate::error::SearchError;
use crate::eval::{evaluate, Heuristics, Transition, MAX_HEURISTIC_SCORE, MIN_HEURISTIC_SCORE};
use crate::game::GameState;
use crate::options::{GameOptions, Strategy};
use crate::unit::Player;
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use std::collections::BTreeMap;
use std::time::{Duration, Instant};

// ============================================================================
// CONSTANTS
// ============================================================================

/// Seed used when the options do not name one
const DEFAULT_SEED: u64 = 42;

// ============================================================================
// STATISTICS
// ============================================================================

/// Search statistics accumulated over a whole game
#[derive(Clone, Debug, Default)]
pub struct SearchStats {
    /// Leaf evaluations keyed by ply distance from the root
    pub evaluations_per_depth: BTreeMap<u32, u64>,
    /// Wall-clock seconds spent searching
    pub total_seconds: f64,
}

impl SearchStats {
    pub fn total_evaluations(&self) -> u64 {
        self.evaluations_per_depth.values().sum()
    }

    /// Evaluations per second over all searches so far
    pub fn throughput(&self) -> Option<f64> {
        if self.total_seconds > 0.0 {
            Some(self.total_evaluations() as f64 / self.total_seconds)
        } else {
            None
        }
    }

    fn merge(&mut self, evaluations: &BTreeMap<u32, u64>, elapsed: Duration) {
        for (&depth, &count) in evaluations {
            *self.evaluations_per_depth.entry(depth).or_insert(0) += count;
        }
        self.total_seconds += elapsed.as_secs_f64();
    }
}

/// Chosen move and how it was found
#[derive(Clone, Debug, PartialEq)]
pub struct SearchResult {
    pub mv: Move,
    /// Root score (positive favours the Attacker)
    pub score: i32,
    pub elapsed: Duration,
    /// Leaf evaluations performed by this search
    pub evaluations: u64,
    /// Mean ply of those evaluations
    pub average_depth: f32,
}

// ============================================================================
// MINIMAX AI
// ============================================================================

/// Computer player
pub struct MinimaxAI {
    pub max_depth: u32,
    pub max_time: Option<Duration>,
    pub alpha_beta: bool,
    pub randomize_moves: bool,
    pub strategy: Strategy,
    pub heuristics: Heuristics,
    rng: ChaCha8Rng,
    stats: SearchStats,
}

impl MinimaxAI {
    pub fn new(max_depth: u32, max_time: Option<Duration>, alpha_beta: bool) -> Self {
        Self {
            max_depth,
            max_time,
            alpha_beta,
            randomize_moves: false,
            strategy: Strategy::Minimax,
            heuristics: Heuristics::default(),
            rng: ChaCha8Rng::seed_from_u64(DEFAULT_SEED),
            stats: SearchStats::default(),
        }
    }

    pub fn from_options(options: &GameOptions) -> Self {
        Self {
            max_depth: options.max_depth,
            max_time: options.time_budget(),
            alpha_beta: options.alpha_beta,
            randomize_moves: options.randomize_moves,
            strategy: options.strategy,
            heuristics: options.heuristics.clone(),
            rng: ChaCha8Rng::seed_from_u64(options.seed.unwrap_or(DEFAULT_SEED)),
            stats: SearchStats::default(),
        }
    }

    pub fn stats(&self) -> &SearchStats {
        &self.stats
    }

    /// Pick a move with the configured strategy
    pub fn suggest_move(&mut self, state: &GameState) -> Result<SearchResult, SearchError> {
        match self.strategy {
            Strategy::Minimax => self.search(state),
            Strategy::Random => self.random_move(state),
        }
    }

    /// Depth- and time-bounded minimax from the current position
    pub fn search(&mut self, state: &GameState) -> Result<SearchResult, SearchError> {
        if state.is_finished() {
            return Err(SearchError::GameOver);
        }

        let started = Instant::now();
        let maximizing = state.next_player() == Player::Attacker;
        let mut search = Search {
            heuristics: &self.heuristics,
            alpha_beta: self.alpha_beta,
            randomize: self.randomize_moves,
            started,
            budget: self.max_time,
            rng: &mut self.rng,
            evaluations: BTreeMap::new(),
        };

        let (score, best) = search.minimax(
            state,
            None,
            self.max_depth.max(1),
            0,
            maximizing,
            MIN_HEURISTIC_SCORE,
            MAX_HEURISTIC_SCORE,
        );
        let evaluations = search.evaluations;
        let elapsed = started.elapsed();

        let mv = best.ok_or(SearchError::NoLegalMoves {
            player: state.next_player(),
        })?;

        self.stats.merge(&evaluations, elapsed);
        let total: u64 = evaluations.values().sum();
        let weighted: u64 = evaluations.iter().map(|(&d, &n)| d as u64 * n).sum();
        let average_depth = if total > 0 {
            weighted as f32 / total as f32
        } else {
            0.0
        };

        tracing::info!(
            player = %state.next_player(),
            %mv,
            score,
            evaluations = total,
            average_depth,
            elapsed_ms = elapsed.as_millis() as u64,
            "search complete"
        );

        Ok(SearchResult {
            mv,
            score,
            elapsed,
            evaluations: total,
            average_depth,
        })
    }

    /// Uniformly random legal move
    pub fn random_move(&mut self, state: &GameState) -> Result<SearchResult, SearchError> {
        if state.is_finished() {
            return Err(SearchError::GameOver);
        }
        let started = Instant::now();
        let moves = state.move_candidates();
        let mv = *moves.choose(&mut self.rng).ok_or(SearchError::NoLegalMoves {
            player: state.next_player(),
        })?;
        let elapsed = started.elapsed();
        self.stats.total_seconds += elapsed.as_secs_f64();

        Ok(SearchResult {
            mv,
            score: 0,
            elapsed,
            evaluations: 0,
            average_depth: 0.0,
        })
    }
}

// ============================================================================
// MINIMAX
// ============================================================================

/// Per-search scratch state
struct Search<'a> {
    heuristics: &'a Heuristics,
    alpha_beta: bool,
    randomize: bool,
    started: Instant,
    budget: Option<Duration>,
    rng: &'a mut ChaCha8Rng,
    evaluations: BTreeMap<u32, u64>,
}

impl Search<'_> {
    fn out_of_time(&self) -> bool {
        self.budget
            .is_some_and(|budget| self.started.elapsed() >= budget)
    }

    fn candidates(&mut self, state: &GameState) -> Vec<Move> {
        let mut moves = state.move_candidates();
        if self.randomize {
            moves.shuffle(&mut *self.rng);
        }
        moves
    }

    fn leaf(&mut self, prev: &GameState, mv: Move, state: &GameState, ply: u32) -> i32 {
        *self.evaluations.entry(ply).or_insert(0) += 1;
        evaluate(&Transition::new(prev, mv, state), self.heuristics)
    }

    /// Returns the node score and the best move found at this node.
    ///
    /// `parent` is the state and move that produced `state`; leaves score
    /// that transition. The deadline is checked before every sibling after
    /// the first, so every node returns a real score.
    #[allow(clippy::too_many_arguments)]
    fn minimax(
        &mut self,
        state: &GameState,
        parent: Option<(&GameState, Move)>,
        depth: u32,
        ply: u32,
        maximizing: bool,
        mut alpha: i32,
        mut beta: i32,
    ) -> (i32, Option<Move>) {
        if depth == 0 || state.is_finished() {
            if let Some((prev, mv)) = parent {
                return (self.leaf(prev, mv, state, ply), None);
            }
        }

        let moves = self.candidates(state);
        if moves.is_empty() {
            let score = parent.map_or(0, |(prev, mv)| self.leaf(prev, mv, state, ply));
            return (score, None);
        }

        let mut best_score = if maximizing {
            MIN_HEURISTIC_SCORE
        } else {
            MAX_HEURISTIC_SCORE
        };
        let mut best_move = None;

        for mv in moves {
            if best_move.is_some() && self.out_of_time() {
                break;
            }

            let mut child = state.clone();
            if child.perform_move(mv).is_err() {
                continue;
            }
            child.next_turn();

            let (score, _) = self.minimax(
                &child,
                Some((state, mv)),
                depth.saturating_sub(1),
                ply + 1,
                !maximizing,
                alpha,
                beta,
            );

            let improves = if maximizing {
                score > best_score
            } else {
                score < best_score
            };
            if best_move.is_none() || improves {
                best_score = score;
                best_move = Some(mv);
            }

            if self.alpha_beta {
                if maximizing {
                    alpha = alpha.max(score);
                } else {
                    beta = beta.min(score);
                }
                if beta <= alpha {
                    break;
                }
            }
        }

        (best_score, best_move)
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coord::Coord;
    use crate::unit::{Unit, UnitType};
    use std::sync::Arc;

    fn c(row: i8, col: i8) -> Coord {
        Coord::new(row, col)
    }

    fn opening() -> GameState {
        GameState::new(Arc::new(GameOptions::default()))
    }

    #[test]
    fn test_ai_returns_legal_move() {
        let game = opening();
        let mut ai = MinimaxAI::new(2, None, true);
        let result = ai.search(&game).unwrap();
        assert!(game.is_valid_move(result.mv));
        assert!(result.evaluations > 0);
        assert!(result.average_depth > 0.0);
    }

    #[test]
    fn test_defender_search_returns_legal_move() {
        let game = opening().with_next_player(Player::Defender);
        let mut ai = MinimaxAI::new(2, None, true);
        let result = ai.search(&game).unwrap();
        assert_eq!(game.next_player(), Player::Defender);
        assert!(game.is_valid_move(result.mv));
    }

    #[test]
    fn test_ai_kills_exposed_ai() {
        let units = vec![
            (c(0, 0), Unit::with_health(Player::Defender, UnitType::AI, 3)),
            (c(0, 1), Unit::new(Player::Attacker, UnitType::Virus)),
            (c(4, 4), Unit::new(Player::Attacker, UnitType::AI)),
        ];
        let game = GameState::from_units(Arc::new(GameOptions::default()), &units);
        let mut ai = MinimaxAI::new(2, None, true);
        let result = ai.search(&game).unwrap();
        assert_eq!(result.mv, Move::new(c(0, 1), c(0, 0)));
        assert!(result.score > 100_000);
    }

    #[test]
    fn test_alpha_beta_matches_minimax() {
        let game = opening();
        for depth in 1..=3 {
            let plain = MinimaxAI::new(depth, None, false).search(&game).unwrap();
            let pruned = MinimaxAI::new(depth, None, true).search(&game).unwrap();
            assert_eq!(plain.score, pruned.score, "depth {}", depth);
            assert!(pruned.evaluations <= plain.evaluations);
        }
    }

    #[test]
    fn test_time_budget_still_returns_move() {
        let game = opening();
        let budget = Duration::from_millis(1);
        let mut ai = MinimaxAI::new(8, Some(budget), true);
        let result = ai.search(&game).unwrap();
        assert!(game.is_valid_move(result.mv));
        assert!(result.elapsed < budget + Duration::from_secs(1));
    }

    #[test]
    fn test_unrepresentable_time_budget_is_unbounded() {
        let options = GameOptions { max_time: Some(1e300), ..Default::default() };
        let ai = MinimaxAI::from_options(&options);
        assert_eq!(ai.max_time, None);
    }

    #[test]
    fn test_search_on_finished_game() {
        let units = vec![(c(4, 4), Unit::new(Player::Attacker, UnitType::AI))];
        let game = GameState::from_units(Arc::new(GameOptions::default()), &units);
        let mut ai = MinimaxAI::new(2, None, true);
        assert_eq!(ai.search(&game), Err(SearchError::GameOver));
    }

    #[test]
    fn test_stats_accumulate() {
        let game = opening();
        let mut ai = MinimaxAI::new(2, None, true);
        let first = ai.search(&game).unwrap();
        let second = ai.search(&game).unwrap();
        assert_eq!(ai.stats().total_evaluations(), first.evaluations + second.evaluations);
        assert!(ai.stats().evaluations_per_depth.contains_key(&2));
        assert!(ai.stats().total_seconds >= 0.0);
    }

    #[test]
    fn test_seeded_randomized_search_is_reproducible() {
        let game = opening();
        let options = GameOptions {
            randomize_moves: true,
            max_time: None,
            max_depth: 2,
            seed: Some(7),
            ..Default::default()
        };
        let a = MinimaxAI::from_options(&options).search(&game).unwrap();
        let b = MinimaxAI::from_options(&options).search(&game).unwrap();
        assert_eq!(a.mv, b.mv);
        assert_eq!(a.score, b.score);
    }

    #[test]
    fn test_random_strategy() {
        let game = opening();
        let options = GameOptions {
            strategy: Strategy::Random,
            seed: Some(3),
            ..Default::default()
        };
        let mut ai = MinimaxAI::from_options(&options);
        for _ in 0..10 {
            let result = ai.suggest_move(&game).unwrap();
            assert!(game.is_valid_move(result.mv));
            assert_eq!(result.evaluations, 0);
        }
    }
}
