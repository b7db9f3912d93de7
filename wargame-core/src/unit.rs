//! Unit types, players and the damage/repair tables

use serde::{Deserialize, Serialize};
use std::fmt;

/// Highest health a unit can have
pub const MAX_HEALTH: u8 = 9;

/// Number of unit types (rows/columns of the interaction tables)
pub const UNIT_TYPE_COUNT: usize = 5;

/// Interaction table indexed by (acting type, target type)
pub type InteractionTable = [[u8; UNIT_TYPE_COUNT]; UNIT_TYPE_COUNT];

/// The two sides
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Player {
    Attacker = 0,
    Defender = 1,
}

impl Player {
    pub fn opponent(self) -> Self {
        match self {
            Player::Attacker => Player::Defender,
            Player::Defender => Player::Attacker,
        }
    }

    /// +1 for the Attacker, -1 for the Defender (score sign convention)
    pub fn sign(self) -> i32 {
        match self {
            Player::Attacker => 1,
            Player::Defender => -1,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Player::Attacker => "Attacker",
            Player::Defender => "Defender",
        }
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Unit type; discriminant is the index into the interaction tables
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnitType {
    AI = 0,
    Tech = 1,
    Virus = 2,
    Program = 3,
    Firewall = 4,
}

impl UnitType {
    pub const ALL: [UnitType; UNIT_TYPE_COUNT] = [
        UnitType::AI,
        UnitType::Tech,
        UnitType::Virus,
        UnitType::Program,
        UnitType::Firewall,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    /// AI, Firewall and Program are held in place by adjacent enemies and
    /// may only advance toward the opponent
    pub fn is_restricted_mover(self) -> bool {
        matches!(self, UnitType::AI | UnitType::Firewall | UnitType::Program)
    }

    pub fn name(self) -> &'static str {
        match self {
            UnitType::AI => "AI",
            UnitType::Tech => "Tech",
            UnitType::Virus => "Virus",
            UnitType::Program => "Program",
            UnitType::Firewall => "Firewall",
        }
    }
}

impl fmt::Display for UnitType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A unit on the board
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Unit {
    pub player: Player,
    pub unit_type: UnitType,
    pub health: u8,
}

impl Unit {
    /// Full-health unit
    pub fn new(player: Player, unit_type: UnitType) -> Self {
        Self {
            player,
            unit_type,
            health: MAX_HEALTH,
        }
    }

    pub fn with_health(player: Player, unit_type: UnitType, health: u8) -> Self {
        Self {
            player,
            unit_type,
            health: health.min(MAX_HEALTH),
        }
    }

    pub fn is_alive(&self) -> bool {
        self.health > 0
    }

    /// Apply a signed health change, clamped to [0, MAX_HEALTH].
    ///
    /// Returns the change actually applied.
    pub fn mod_health(&mut self, delta: i32) -> i32 {
        let before = self.health as i32;
        let after = (before + delta).clamp(0, MAX_HEALTH as i32);
        self.health = after as u8;
        after - before
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let p = self.player.name().chars().next().unwrap_or('?').to_ascii_lowercase();
        let t = self.unit_type.name().chars().next().unwrap_or('?');
        write!(f, "{}{}{}", p, t, self.health)
    }
}

/// Fixed damage and repair tables.
///
/// Rows are the acting type, columns the target type, both in
/// [`UnitType`] discriminant order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombatTables {
    pub damage: InteractionTable,
    pub repair: InteractionTable,
}

impl Default for CombatTables {
    fn default() -> Self {
        Self {
            damage: [
                [3, 3, 3, 3, 1], // AI
                [1, 1, 6, 1, 1], // Tech
                [9, 6, 1, 6, 1], // Virus
                [3, 3, 3, 3, 1], // Program
                [1, 1, 1, 1, 1], // Firewall
            ],
            repair: [
                [0, 1, 1, 0, 0], // AI
                [3, 0, 0, 3, 3], // Tech
                [0, 0, 0, 0, 0], // Virus
                [0, 0, 0, 0, 0], // Program
                [0, 0, 0, 0, 0], // Firewall
            ],
        }
    }
}

impl CombatTables {
    /// Raw damage table entry
    pub fn base_damage(&self, actor: UnitType, target: UnitType) -> u8 {
        self.damage[actor.index()][target.index()]
    }

    /// Raw repair table entry
    pub fn base_repair(&self, actor: UnitType, target: UnitType) -> u8 {
        self.repair[actor.index()][target.index()]
    }

    /// Damage `actor` deals to `target`, never more than the target has left
    pub fn damage_amount(&self, actor: &Unit, target: &Unit) -> u8 {
        self.base_damage(actor.unit_type, target.unit_type)
            .min(target.health)
    }

    /// Health `actor` restores to `target`, never past MAX_HEALTH
    pub fn repair_amount(&self, actor: &Unit, target: &Unit) -> u8 {
        self.base_repair(actor.unit_type, target.unit_type)
            .min(MAX_HEALTH.saturating_sub(target.health))
    }
}
