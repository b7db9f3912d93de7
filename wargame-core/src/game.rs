//! Game state, move legality and move resolution

use crate::coord::{col_label, row_label, Coord, Move};
use crate::error::IllegalMove;
use crate::options::GameOptions;
use crate::unit::{Player, Unit, UnitType, MAX_HEALTH};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

// ============================================================================
// CONSTANTS
// ============================================================================

/// Damage dealt to every unit around a self-destructing unit
const SPLASH_DAMAGE: i32 = 2;

/// Radius of the self-destruct blast (square box, diagonals included)
const SPLASH_RADIUS: i8 = 1;

// ============================================================================
// CORE TYPES
// ============================================================================

/// What a move does, decided by the occupancy of its two cells
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    Move,
    Attack,
    Repair,
    SelfDestruct,
}

/// Result of executing a move
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Effect {
    Moved,
    Attacked { to_target: u8, to_source: u8 },
    Repaired { amount: u8 },
    SelfDestructed { affected: usize, total_damage: u32 },
}

/// A successfully executed move; `Display` gives the trace description
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Outcome {
    pub mv: Move,
    pub effect: Effect,
}

impl Outcome {
    pub fn action(&self) -> Action {
        match self.effect {
            Effect::Moved => Action::Move,
            Effect::Attacked { .. } => Action::Attack,
            Effect::Repaired { .. } => Action::Repair,
            Effect::SelfDestructed { .. } => Action::SelfDestruct,
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Move { src, dst } = self.mv;
        match self.effect {
            Effect::Moved => write!(f, "move from {} to {}", src, dst),
            Effect::Attacked { to_target, to_source } => write!(
                f,
                "attack from {} to {}: combat damage to source = {}, to target = {}",
                src, dst, to_source, to_target
            ),
            Effect::Repaired { amount } => write!(
                f,
                "repair from {} to {}: repaired {} health points",
                src, dst, amount
            ),
            Effect::SelfDestructed { affected, total_damage } => write!(
                f,
                "self-destruct at {} deals {} total damage to {} units",
                src, total_damage, affected
            ),
        }
    }
}

// ============================================================================
// BOARD
// ============================================================================

/// Dense `dim x dim` grid of optional units
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Board {
    dim: u8,
    cells: Vec<Option<Unit>>,
}

impl Board {
    pub fn new(dim: u8) -> Self {
        Self {
            dim,
            cells: vec![None; dim as usize * dim as usize],
        }
    }

    pub fn dim(&self) -> u8 {
        self.dim
    }

    fn index(&self, coord: Coord) -> Option<usize> {
        if coord.is_valid(self.dim) {
            Some(coord.row as usize * self.dim as usize + coord.col as usize)
        } else {
            None
        }
    }

    pub fn get(&self, coord: Coord) -> Option<&Unit> {
        self.index(coord).and_then(|i| self.cells[i].as_ref())
    }

    fn get_mut(&mut self, coord: Coord) -> Option<&mut Unit> {
        self.index(coord).and_then(|i| self.cells[i].as_mut())
    }

    /// Place or clear a cell; off-board coordinates are ignored
    fn set(&mut self, coord: Coord, unit: Option<Unit>) {
        if let Some(i) = self.index(coord) {
            self.cells[i] = unit;
        }
    }

    fn take(&mut self, coord: Coord) -> Option<Unit> {
        self.index(coord).and_then(|i| self.cells[i].take())
    }

    /// Occupied cells in row-major order
    pub fn units(&self) -> impl Iterator<Item = (Coord, &Unit)> + '_ {
        let dim = self.dim as usize;
        self.cells.iter().enumerate().filter_map(move |(i, cell)| {
            cell.as_ref()
                .map(|unit| (Coord::new((i / dim) as i8, (i % dim) as i8), unit))
        })
    }
}

// ============================================================================
// GAME STATE
// ============================================================================

/// Game state. Cloning deep-copies the board and shares the options.
#[derive(Clone, Debug)]
pub struct GameState {
    board: Board,
    next_player: Player,
    turns_played: u32,
    attacker_has_ai: bool,
    defender_has_ai: bool,
    options: Arc<GameOptions>,
}

impl GameState {
    // ========================================================================
    // CONSTRUCTORS
    // ========================================================================

    /// Standard opening: Defender clustered on A0, Attacker on the far corner
    pub fn new(options: Arc<GameOptions>) -> Self {
        let md = options.dim as i8 - 1;
        let d = Player::Defender;
        let a = Player::Attacker;
        let units = [
            (Coord::new(0, 0), Unit::new(d, UnitType::AI)),
            (Coord::new(1, 0), Unit::new(d, UnitType::Tech)),
            (Coord::new(0, 1), Unit::new(d, UnitType::Tech)),
            (Coord::new(2, 0), Unit::new(d, UnitType::Firewall)),
            (Coord::new(0, 2), Unit::new(d, UnitType::Firewall)),
            (Coord::new(1, 1), Unit::new(d, UnitType::Program)),
            (Coord::new(md, md), Unit::new(a, UnitType::AI)),
            (Coord::new(md - 1, md), Unit::new(a, UnitType::Virus)),
            (Coord::new(md, md - 1), Unit::new(a, UnitType::Virus)),
            (Coord::new(md - 2, md), Unit::new(a, UnitType::Program)),
            (Coord::new(md, md - 2), Unit::new(a, UnitType::Program)),
            (Coord::new(md - 1, md - 1), Unit::new(a, UnitType::Firewall)),
        ];
        Self::from_units(options, &units)
    }

    /// Custom position, Attacker to move. Off-board placements are dropped.
    pub fn from_units(options: Arc<GameOptions>, units: &[(Coord, Unit)]) -> Self {
        let mut board = Board::new(options.dim);
        for &(coord, unit) in units {
            board.set(coord, Some(unit));
        }

        let has_ai = |player: Player| {
            board
                .units()
                .any(|(_, u)| u.player == player && u.unit_type == UnitType::AI)
        };
        let attacker_has_ai = has_ai(Player::Attacker);
        let defender_has_ai = has_ai(Player::Defender);

        Self {
            board,
            next_player: Player::Attacker,
            turns_played: 0,
            attacker_has_ai,
            defender_has_ai,
            options,
        }
    }

    /// Set the side to move (position setup)
    pub fn with_next_player(mut self, player: Player) -> Self {
        self.next_player = player;
        self
    }

    /// Set the turn counter (position setup)
    pub fn with_turns_played(mut self, turns: u32) -> Self {
        self.turns_played = turns;
        self
    }

    // ========================================================================
    // ACCESSORS
    // ========================================================================

    pub fn options(&self) -> &Arc<GameOptions> {
        &self.options
    }

    pub fn dim(&self) -> u8 {
        self.board.dim()
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn next_player(&self) -> Player {
        self.next_player
    }

    pub fn turns_played(&self) -> u32 {
        self.turns_played
    }

    pub fn is_valid_coord(&self, coord: Coord) -> bool {
        coord.is_valid(self.dim())
    }

    pub fn get(&self, coord: Coord) -> Option<&Unit> {
        self.board.get(coord)
    }

    pub fn is_empty(&self, coord: Coord) -> bool {
        self.board.get(coord).is_none()
    }

    pub fn has_ai(&self, player: Player) -> bool {
        match player {
            Player::Attacker => self.attacker_has_ai,
            Player::Defender => self.defender_has_ai,
        }
    }

    /// Units of one player in row-major order
    pub fn player_units(&self, player: Player) -> impl Iterator<Item = (Coord, Unit)> + '_ {
        self.board
            .units()
            .filter(move |(_, unit)| unit.player == player)
            .map(|(coord, unit)| (coord, *unit))
    }

    /// Location of a player's AI, if it is still on the board
    pub fn ai_position(&self, player: Player) -> Option<Coord> {
        self.player_units(player)
            .find(|(_, unit)| unit.unit_type == UnitType::AI)
            .map(|(coord, _)| coord)
    }

    // ========================================================================
    // TERMINATION
    // ========================================================================

    /// Winner, if the game is over.
    ///
    /// Reaching the turn limit hands the win to the Defender regardless of
    /// material. Otherwise a side wins once the opposing AI is gone; if
    /// both AIs are gone the Attacker's loss is checked first.
    pub fn has_winner(&self) -> Option<Player> {
        if let Some(max_turns) = self.options.max_turns {
            if self.turns_played >= max_turns {
                return Some(Player::Defender);
            }
        }
        match (self.attacker_has_ai, self.defender_has_ai) {
            (true, true) => None,
            (true, false) => Some(Player::Attacker),
            (false, _) => Some(Player::Defender),
        }
    }

    pub fn is_finished(&self) -> bool {
        self.has_winner().is_some()
    }

    /// Hand the move to the other player
    pub fn next_turn(&mut self) {
        self.next_player = self.next_player.opponent();
        self.turns_played += 1;
    }

    // ========================================================================
    // MOVE CLASSIFICATION AND LEGALITY
    // ========================================================================

    /// Classify a move from cell occupancy alone (no legality check)
    pub fn determine_action(&self, mv: Move) -> Action {
        if mv.is_self_target() {
            return Action::SelfDestruct;
        }
        match self.get(mv.dst) {
            None => Action::Move,
            Some(target) => {
                let same_side = self.get(mv.src).map(|u| u.player) == Some(target.player);
                if same_side {
                    Action::Repair
                } else {
                    Action::Attack
                }
            }
        }
    }

    pub fn is_valid_move(&self, mv: Move) -> bool {
        self.validate_move(mv).is_ok()
    }

    /// Check a move for the player to move, returning its action
    pub fn validate_move(&self, mv: Move) -> Result<Action, IllegalMove> {
        let Move { src, dst } = mv;
        if !self.is_valid_coord(src) {
            return Err(IllegalMove::OutOfBounds(src));
        }
        if !self.is_valid_coord(dst) {
            return Err(IllegalMove::OutOfBounds(dst));
        }

        let unit = *self.get(src).ok_or(IllegalMove::NoUnit(src))?;
        if unit.player != self.next_player {
            return Err(IllegalMove::NotYourUnit { at: src, owner: unit.player });
        }

        if mv.is_self_target() {
            return Ok(Action::SelfDestruct);
        }
        if !src.is_adjacent(dst) {
            return Err(IllegalMove::NotAdjacent { src, dst });
        }

        match self.get(dst) {
            Some(target) if target.player == unit.player => {
                if self.options.tables.base_repair(unit.unit_type, target.unit_type) == 0 {
                    return Err(IllegalMove::CannotRepair {
                        actor: unit.unit_type,
                        target: target.unit_type,
                    });
                }
                if target.health >= MAX_HEALTH {
                    return Err(IllegalMove::FullHealth(dst));
                }
                Ok(Action::Repair)
            }
            Some(_) => Ok(Action::Attack),
            None => {
                self.check_movement(src, dst, &unit)?;
                Ok(Action::Move)
            }
        }
    }

    /// Engagement lock and direction of advance for AI, Firewall and Program
    fn check_movement(&self, src: Coord, dst: Coord, unit: &Unit) -> Result<(), IllegalMove> {
        if !unit.unit_type.is_restricted_mover() {
            return Ok(());
        }

        if self.is_engaged(src, unit.player) {
            return Err(IllegalMove::Engaged { unit: unit.unit_type, at: src });
        }

        let d_row = dst.row - src.row;
        let d_col = dst.col - src.col;
        let retreating = match unit.player {
            Player::Attacker => d_row > 0 || d_col > 0,
            Player::Defender => d_row < 0 || d_col < 0,
        };
        if retreating {
            return Err(IllegalMove::WrongDirection { unit: unit.unit_type });
        }
        Ok(())
    }

    /// Whether an enemy of `player` sits orthogonally next to `coord`
    pub fn is_engaged(&self, coord: Coord, player: Player) -> bool {
        coord
            .iter_adjacent()
            .filter_map(|c| self.get(c))
            .any(|u| u.player != player)
    }

    /// Legal moves for the player to move: for each unit in row-major
    /// order, its legal neighbours (up, left, down, right) then itself
    pub fn move_candidates(&self) -> Vec<Move> {
        let mut moves = Vec::new();
        for (src, _) in self.player_units(self.next_player) {
            for dst in src.iter_adjacent() {
                let mv = Move::new(src, dst);
                if self.is_valid_move(mv) {
                    moves.push(mv);
                }
            }
            moves.push(Move::new(src, src));
        }
        moves
    }

    // ========================================================================
    // APPLY MOVE
    // ========================================================================

    /// Validate then execute a move. The turn is not advanced.
    pub fn perform_move(&mut self, mv: Move) -> Result<Outcome, IllegalMove> {
        let action = self.validate_move(mv)?;
        let effect = match action {
            Action::Move => self.perform_movement(mv),
            Action::Attack => self.perform_attack(mv),
            Action::Repair => self.perform_repair(mv),
            Action::SelfDestruct => self.perform_self_destruct(mv.src),
        };
        Ok(Outcome { mv, effect })
    }

    /// Apply a move, returning the resulting state (clone to mutate)
    pub fn apply_move(&self, mv: Move) -> Result<(Self, Outcome), IllegalMove> {
        let mut next = self.clone();
        let outcome = next.perform_move(mv)?;
        next.next_turn();
        Ok((next, outcome))
    }

    fn perform_movement(&mut self, mv: Move) -> Effect {
        let unit = self.board.take(mv.src);
        self.board.set(mv.dst, unit);
        Effect::Moved
    }

    /// Both units hit each other at once, using pre-attack values
    fn perform_attack(&mut self, mv: Move) -> Effect {
        let (to_target, to_source) = match (self.board.get(mv.src), self.board.get(mv.dst)) {
            (Some(source), Some(target)) => {
                let tables = &self.options.tables;
                (
                    tables.damage_amount(source, target),
                    tables.damage_amount(target, source),
                )
            }
            _ => (0, 0),
        };

        self.mod_health(mv.dst, -(to_target as i32));
        self.mod_health(mv.src, -(to_source as i32));
        self.remove_dead(mv.src);
        self.remove_dead(mv.dst);

        Effect::Attacked { to_target, to_source }
    }

    fn perform_repair(&mut self, mv: Move) -> Effect {
        let amount = match (self.board.get(mv.src), self.board.get(mv.dst)) {
            (Some(source), Some(target)) => self.options.tables.repair_amount(source, target),
            _ => 0,
        };
        self.mod_health(mv.dst, amount as i32);
        Effect::Repaired { amount }
    }

    fn perform_self_destruct(&mut self, at: Coord) -> Effect {
        self.mod_health(at, -(MAX_HEALTH as i32));
        self.remove_dead(at);

        let mut affected = 0;
        let mut total_damage = 0;
        for coord in at.iter_range(SPLASH_RADIUS).filter(|&c| c != at) {
            if self.get(coord).is_some() {
                affected += 1;
                total_damage += (-self.mod_health(coord, -SPLASH_DAMAGE)) as u32;
            }
        }
        for coord in at.iter_range(SPLASH_RADIUS) {
            self.remove_dead(coord);
        }

        Effect::SelfDestructed { affected, total_damage }
    }

    /// Change a unit's health, returning the change actually applied
    fn mod_health(&mut self, coord: Coord, delta: i32) -> i32 {
        self.board
            .get_mut(coord)
            .map_or(0, |unit| unit.mod_health(delta))
    }

    /// Clear a dead unit from the board, tracking AI loss
    fn remove_dead(&mut self, coord: Coord) {
        let dead = self.board.get(coord).is_some_and(|u| !u.is_alive());
        if !dead {
            return;
        }
        if let Some(unit) = self.board.take(coord) {
            if unit.unit_type == UnitType::AI {
                match unit.player {
                    Player::Attacker => self.attacker_has_ai = false,
                    Player::Defender => self.defender_has_ai = false,
                }
            }
        }
    }
}

impl fmt::Display for GameState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let dim = self.dim() as i8;
        writeln!(f, "Next player: {}", self.next_player)?;
        writeln!(f, "Turns played: {}", self.turns_played)?;
        write!(f, "\n   ")?;
        for col in 0..dim {
            write!(f, "{:^3} ", col_label(col))?;
        }
        writeln!(f)?;
        for row in 0..dim {
            write!(f, "{}: ", row_label(row))?;
            for col in 0..dim {
                match self.get(Coord::new(row, col)) {
                    Some(unit) => write!(f, "{:^3} ", unit.to_string())?,
                    None => write!(f, " .  ")?,
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

// ============================================================================
// TESTS
// ============================================================================
