//! Transition evaluation
//!
//! Scores are signed from a fixed point of view: positive favours the
//! Attacker, negative the Defender. A score combines the material left on
//! the resulting board with a tactical term for the action that produced it.

use crate::coord::Move;
use crate::game::{Action, GameState};
use crate::unit::{MAX_HEALTH, UNIT_TYPE_COUNT};
use serde::{Deserialize, Serialize};

/// Upper sentinel: a forced win for the Attacker. Never produced by scoring.
pub const MAX_HEURISTIC_SCORE: i32 = 2_000_000_000;

/// Lower sentinel: a forced win for the Defender. Never produced by scoring.
pub const MIN_HEURISTIC_SCORE: i32 = -2_000_000_000;

/// Heuristic weights for transition evaluation
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Heuristics {
    /// Material value of each unit type (UnitType order)
    pub unit_values: [i32; UNIT_TYPE_COUNT],
    /// Added for the winner of a decided state
    pub win_bonus: i32,
    /// Base incentive for moving each unit type
    pub move_base: [i32; UNIT_TYPE_COUNT],
    /// Penalty per cell between a moved unit and the nearest enemy AI
    pub distance_weight: i32,
    /// Base incentive for attacking with each unit type
    pub attack_base: [i32; UNIT_TYPE_COUNT],
    /// Bonus per point of table damage dealt by an attack
    pub attack_damage_weight: i32,
    /// Bonus when an attack destroys its target
    pub kill_bonus: i32,
    /// Base incentive for a repair
    pub repair_base: i32,
    /// Bonus per missing health point of the repaired unit
    pub repair_missing_weight: i32,
    /// Weight of a self-destruct, counted against the acting side
    pub self_destruct_weight: i32,
}

impl Default for Heuristics {
    fn default() -> Self {
        Self {
            //           AI    Tech Virus Program Firewall
            unit_values: [9999, 3, 3, 3, 3],
            win_bonus: 1_000_000,
            move_base: [50, 50, 80, 60, 70],
            distance_weight: 1,
            attack_base: [84, 80, 86, 85, 81],
            attack_damage_weight: 2,
            kill_bonus: 10,
            repair_base: 80,
            repair_missing_weight: 2,
            self_destruct_weight: 300,
        }
    }
}

/// A candidate move together with the states on either side of it
#[derive(Clone, Copy, Debug)]
pub struct Transition<'a> {
    pub prev: &'a GameState,
    pub mv: Move,
    pub action: Action,
    pub next: &'a GameState,
}

impl<'a> Transition<'a> {
    pub fn new(prev: &'a GameState, mv: Move, next: &'a GameState) -> Self {
        Self {
            prev,
            mv,
            action: prev.determine_action(mv),
            next,
        }
    }
}

/// Score a transition. Always strictly inside the sentinel bounds.
pub fn evaluate(transition: &Transition<'_>, heuristics: &Heuristics) -> i32 {
    let score = material(transition.next, heuristics) + tactical(transition, heuristics);
    score.clamp(MIN_HEURISTIC_SCORE as i64 + 1, MAX_HEURISTIC_SCORE as i64 - 1) as i32
}

/// Material balance of a position, plus the win bonus once decided
pub fn material(state: &GameState, heuristics: &Heuristics) -> i64 {
    let units: i64 = state
        .board()
        .units()
        .map(|(_, unit)| {
            unit.player.sign() as i64 * heuristics.unit_values[unit.unit_type.index()] as i64
        })
        .sum();

    let decided = state
        .has_winner()
        .map_or(0, |winner| winner.sign() as i64 * heuristics.win_bonus as i64);

    units + decided
}

/// Value of the action itself, signed toward the side that took it
fn tactical(transition: &Transition<'_>, heuristics: &Heuristics) -> i64 {
    let Transition { prev, mv, action, .. } = *transition;
    let Some(actor) = prev.get(mv.src) else {
        return 0;
    };
    let sign = actor.player.sign() as i64;
    let actor_idx = actor.unit_type.index();

    let value = match action {
        Action::Move => {
            let distance = prev
                .ai_position(actor.player.opponent())
                .map_or(0, |ai| mv.dst.distance_to(ai));
            heuristics.move_base[actor_idx] as i64 - heuristics.distance_weight as i64 * distance as i64
        }
        Action::Attack => match prev.get(mv.dst) {
            Some(target) => {
                let tables = &prev.options().tables;
                let base = tables.base_damage(actor.unit_type, target.unit_type) as i64;
                let lethal = tables.damage_amount(actor, target) >= target.health;
                heuristics.attack_base[actor_idx] as i64
                    + heuristics.attack_damage_weight as i64 * base
                    + if lethal { heuristics.kill_bonus as i64 } else { 0 }
            }
            None => 0,
        },
        Action::Repair => match prev.get(mv.dst) {
            Some(target) => {
                let missing = MAX_HEALTH.saturating_sub(target.health) as i64;
                heuristics.repair_base as i64 + heuristics.repair_missing_weight as i64 * missing
            }
            None => 0,
        },
        // Counted against the side that blows itself up
        Action::SelfDestruct => -(heuristics.self_destruct_weight as i64),
    };

    sign * value
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coord::Coord;
    use crate::options::GameOptions;
    use crate::unit::{Player, Unit, UnitType};
    use std::sync::Arc;

    fn c(row: i8, col: i8) -> Coord {
        Coord::new(row, col)
    }

    fn position(extra: &[(Coord, Unit)]) -> GameState {
        let mut units = vec![
            (c(0, 0), Unit::new(Player::Defender, UnitType::AI)),
            (c(4, 4), Unit::new(Player::Attacker, UnitType::AI)),
        ];
        units.extend_from_slice(extra);
        GameState::from_units(Arc::new(GameOptions::default()), &units)
    }

    fn score(state: &GameState, mv: Move) -> i32 {
        let (next, _) = state.apply_move(mv).unwrap();
        evaluate(&Transition::new(state, mv, &next), &Heuristics::default())
    }

    /// Tactical term only, from the acting side's point of view
    fn tactical_for(state: &GameState, mv: Move) -> i64 {
        let (next, _) = state.apply_move(mv).unwrap();
        let t = Transition::new(state, mv, &next);
        let actor = state.get(mv.src).unwrap().player;
        actor.sign() as i64 * tactical(&t, &Heuristics::default())
    }

    #[test]
    fn test_move_prefers_closing_distance() {
        let game = position(&[(c(2, 2), Unit::new(Player::Attacker, UnitType::Virus))]);
        let toward = score(&game, Move::new(c(2, 2), c(1, 2)));
        let away = score(&game, Move::new(c(2, 2), c(3, 2)));
        assert!(toward > away, "{} should beat {}", toward, away);
    }

    #[test]
    fn test_move_type_ordering() {
        let mover = |unit_type| {
            let game = position(&[(c(2, 2), Unit::new(Player::Attacker, unit_type))]);
            tactical_for(&game, Move::new(c(2, 2), c(1, 2)))
        };
        let virus = mover(UnitType::Virus);
        let firewall = mover(UnitType::Firewall);
        let program = mover(UnitType::Program);
        let tech = mover(UnitType::Tech);
        assert!(virus > firewall);
        assert!(firewall > program);
        assert!(program > tech);
    }

    #[test]
    fn test_attack_prefers_weak_targets() {
        let attack = |target| {
            let game = position(&[
                (c(2, 2), Unit::new(Player::Attacker, UnitType::Virus)),
                (c(1, 2), Unit::new(Player::Defender, target)),
            ]);
            tactical_for(&game, Move::new(c(2, 2), c(1, 2)))
        };
        assert!(attack(UnitType::Tech) > attack(UnitType::Firewall));
        assert!(attack(UnitType::Program) > attack(UnitType::Firewall));
    }

    #[test]
    fn test_attack_sign_mirrors_side() {
        let game = position(&[
            (c(2, 2), Unit::new(Player::Attacker, UnitType::Virus)),
            (c(1, 2), Unit::new(Player::Defender, UnitType::Tech)),
        ]);
        let (next, _) = game.apply_move(Move::new(c(2, 2), c(1, 2))).unwrap();
        let by_attacker = tactical(
            &Transition::new(&game, Move::new(c(2, 2), c(1, 2)), &next),
            &Heuristics::default(),
        );
        assert!(by_attacker > 0);

        let game = game.with_next_player(Player::Defender);
        let (next, _) = game.apply_move(Move::new(c(1, 2), c(2, 2))).unwrap();
        let by_defender = tactical(
            &Transition::new(&game, Move::new(c(1, 2), c(2, 2)), &next),
            &Heuristics::default(),
        );
        assert!(by_defender < 0);
    }

    #[test]
    fn test_repair_prefers_low_health() {
        let repair = |health| {
            let game = position(&[
                (c(1, 0), Unit::new(Player::Defender, UnitType::Tech)),
                (c(2, 0), Unit::with_health(Player::Defender, UnitType::Firewall, health)),
            ])
            .with_next_player(Player::Defender);
            let mv = Move::new(c(1, 0), c(2, 0));
            let (next, _) = game.apply_move(mv).unwrap();
            tactical(&Transition::new(&game, mv, &next), &Heuristics::default())
        };
        // Defender repairs score negative; lower health is better for the Defender
        assert!(repair(2) < repair(8));
        assert!(repair(8) < 0);
    }

    #[test]
    fn test_self_destruct_counts_against_actor() {
        let game = position(&[(c(2, 2), Unit::new(Player::Attacker, UnitType::Virus))]);
        assert!(tactical_for(&game, Move::new(c(2, 2), c(2, 2))) < 0);
        let move_score = tactical_for(&game, Move::new(c(2, 2), c(1, 2)));
        let blast_score = tactical_for(&game, Move::new(c(2, 2), c(2, 2)));
        assert!(move_score - blast_score >= 300);
    }

    #[test]
    fn test_ai_loss_dominates() {
        // Attacker AI self-destructs: the Defender must be heavily favoured
        let game = position(&[(c(2, 2), Unit::new(Player::Attacker, UnitType::Virus))]);
        let s = score(&game, Move::new(c(4, 4), c(4, 4)));
        assert!(s < -100_000);
        assert!(s > MIN_HEURISTIC_SCORE);
    }

    #[test]
    fn test_symmetric_material() {
        let game = GameState::new(Arc::new(GameOptions::default()));
        assert_eq!(material(&game, &Heuristics::default()), 0);
    }

    #[test]
    fn test_scores_stay_inside_sentinels() {
        let heuristics = Heuristics {
            win_bonus: i32::MAX,
            unit_values: [i32::MAX; UNIT_TYPE_COUNT],
            ..Default::default()
        };
        let game = position(&[]);
        let mv = Move::new(c(4, 4), c(4, 4));
        let (next, _) = game.apply_move(mv).unwrap();
        let s = evaluate(&Transition::new(&game, mv, &next), &heuristics);
        assert!(s > MIN_HEURISTIC_SCORE && s < MAX_HEURISTIC_SCORE);
    }
}
