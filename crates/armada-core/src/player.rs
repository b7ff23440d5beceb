//! Players and their per-player adjustment hooks.
//!
//! Cached specification instances are shared by every player, so
//! player-specific effects are applied at read time through
//! [`PlayerModifiers`] rather than by mutating the catalog. All factors
//! default to one, making the default modifiers an exact pass-through;
//! species traits and empire policies scale them later.

use serde::{Deserialize, Serialize};

use crate::fixed::Fixed64;
use crate::spec::EquipmentSpec;

/// Stable player identifier, assigned at session setup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlayerId(pub u32);

/// Playable species. Traits hang off the modifiers, not the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Species {
    Terran,
    Voidborn,
    Mechanoid,
}

/// Multiplicative read-time adjustments. A factor of one leaves the
/// underlying value untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerModifiers {
    pub research_cost_factor: Fixed64,
    pub reload_period_factor: Fixed64,
    pub weapon_range_factor: Fixed64,
    pub construction_cost_factor: Fixed64,
}

impl Default for PlayerModifiers {
    fn default() -> Self {
        Self {
            research_cost_factor: Fixed64::from_num(1),
            reload_period_factor: Fixed64::from_num(1),
            weapon_range_factor: Fixed64::from_num(1),
            construction_cost_factor: Fixed64::from_num(1),
        }
    }
}

impl PlayerModifiers {
    /// Research cost as this player sees it.
    pub fn research_cost(&self, base: Fixed64) -> Fixed64 {
        base * self.research_cost_factor
    }

    /// Weapon reload period as this player sees it. Non-weapons pass
    /// through unchanged.
    pub fn reload_period(&self, spec: &EquipmentSpec, base: Fixed64) -> Fixed64 {
        if spec.category().is_weapon() {
            base * self.reload_period_factor
        } else {
            base
        }
    }

    /// Effective weapon range as this player sees it. The base distance
    /// comes from combat resolution; non-weapons pass through unchanged.
    pub fn weapon_range(&self, spec: &EquipmentSpec, base: Fixed64) -> Fixed64 {
        if spec.category().is_weapon() {
            base * self.weapon_range_factor
        } else {
            base
        }
    }

    /// Construction cost as this player sees it.
    pub fn construction_cost(&self, spec: &EquipmentSpec) -> Fixed64 {
        spec.common.construction_cost * self.construction_cost_factor
    }
}

/// One participant in a session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub species: Species,
    pub modifiers: PlayerModifiers,
}

impl Player {
    pub fn new(id: PlayerId, name: impl Into<String>, species: Species) -> Self {
        Self {
            id,
            name: name.into(),
            species,
            modifiers: PlayerModifiers::default(),
        }
    }
}

// ===========================================================================
// Tests
// ===========================================================================
