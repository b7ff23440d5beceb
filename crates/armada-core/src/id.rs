//! Identity types: equipment categories, improvement levels, and the
//! composite keys that address cached specification instances.

use serde::{Deserialize, Serialize};
use slotmap::new_key_type;

use crate::spec::SpecError;

new_key_type! {
    /// Identifies one cached specification instance in the factory/cache.
    /// Handles are the "shared, non-owning reference" consumers hold.
    pub struct SpecHandle;
}

// ---------------------------------------------------------------------------
// Equipment categories
// ---------------------------------------------------------------------------

/// Discriminant selecting which specification shape applies.
///
/// `None` is a sentinel for "no category" and is never valid inside a
/// constructed [`SpecId`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EquipmentCategory {
    None,
    BeamWeapon,
    ProjectileWeapon,
    MissileWeapon,
    AssaultWeapon,
    ShipHull,
    FacilityHull,
    Sensor,
    ActiveCountermeasure,
    PassiveCountermeasure,
    ShieldGenerator,
    FtlDampener,
    Engine,
    FleetCommand,
    StarbaseCommand,
    SettlementCommand,
}

impl EquipmentCategory {
    /// Every non-sentinel category, in the fixed order population uses.
    pub const CONCRETE: [EquipmentCategory; 15] = [
        EquipmentCategory::BeamWeapon,
        EquipmentCategory::ProjectileWeapon,
        EquipmentCategory::MissileWeapon,
        EquipmentCategory::AssaultWeapon,
        EquipmentCategory::ShipHull,
        EquipmentCategory::FacilityHull,
        EquipmentCategory::Sensor,
        EquipmentCategory::ActiveCountermeasure,
        EquipmentCategory::PassiveCountermeasure,
        EquipmentCategory::ShieldGenerator,
        EquipmentCategory::FtlDampener,
        EquipmentCategory::Engine,
        EquipmentCategory::FleetCommand,
        EquipmentCategory::StarbaseCommand,
        EquipmentCategory::SettlementCommand,
    ];

    /// Iterate every concrete (non-`None`) category in declaration order.
    pub fn concrete() -> impl Iterator<Item = EquipmentCategory> {
        Self::CONCRETE.into_iter()
    }

    /// Whether this category is one of the weapon shapes.
    pub fn is_weapon(self) -> bool {
        matches!(
            self,
            EquipmentCategory::BeamWeapon
                | EquipmentCategory::ProjectileWeapon
                | EquipmentCategory::MissileWeapon
                | EquipmentCategory::AssaultWeapon
        )
    }

    /// Whether this category is one of the hull shapes.
    pub fn is_hull(self) -> bool {
        matches!(
            self,
            EquipmentCategory::ShipHull | EquipmentCategory::FacilityHull
        )
    }
}

// ---------------------------------------------------------------------------
// Improvement levels
// ---------------------------------------------------------------------------

/// Ordinal tier of technological advancement for a category.
///
/// `None` is the "no level" sentinel and is rejected by key construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImprovementLevel {
    None,
    One,
    Two,
    Three,
    Four,
    Five,
}

impl ImprovementLevel {
    /// Every non-sentinel level, lowest first.
    pub const CONCRETE: [ImprovementLevel; 5] = [
        ImprovementLevel::One,
        ImprovementLevel::Two,
        ImprovementLevel::Three,
        ImprovementLevel::Four,
        ImprovementLevel::Five,
    ];

    /// Iterate every concrete (non-`None`) level, lowest first.
    pub fn concrete() -> impl Iterator<Item = ImprovementLevel> {
        Self::CONCRETE.into_iter()
    }

    /// Numeric rank used by the stat formulas. `None` ranks 0, `One` ranks 1.
    pub fn rank(self) -> u32 {
        match self {
            ImprovementLevel::None => 0,
            ImprovementLevel::One => 1,
            ImprovementLevel::Two => 2,
            ImprovementLevel::Three => 3,
            ImprovementLevel::Four => 4,
            ImprovementLevel::Five => 5,
        }
    }
}

// ---------------------------------------------------------------------------
// Range categories
// ---------------------------------------------------------------------------

/// Engagement range band for ranged equipment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RangeCategory {
    None,
    Short,
    Medium,
    Long,
}

impl RangeCategory {
    pub const CONCRETE: [RangeCategory; 3] = [
        RangeCategory::Short,
        RangeCategory::Medium,
        RangeCategory::Long,
    ];

    pub fn concrete() -> impl Iterator<Item = RangeCategory> {
        Self::CONCRETE.into_iter()
    }

    /// Display prefix used in generated instance names.
    pub fn label(self) -> &'static str {
        match self {
            RangeCategory::None => "Undefined",
            RangeCategory::Short => "Short-Range",
            RangeCategory::Medium => "Medium-Range",
            RangeCategory::Long => "Long-Range",
        }
    }
}

// ---------------------------------------------------------------------------
// Composite specification key
// ---------------------------------------------------------------------------

/// Value-equality composite key addressing one cache slot: two keys are
/// equal iff both category and level are equal. Neither component may be
/// the `None` sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SpecId {
    pub category: EquipmentCategory,
    pub level: ImprovementLevel,
}

impl SpecId {
    /// Construct a key, rejecting the `None` sentinel on either component.
    pub fn new(category: EquipmentCategory, level: ImprovementLevel) -> Result<Self, SpecError> {
        if category == EquipmentCategory::None || level == ImprovementLevel::None {
            return Err(SpecError::InvalidKey { category, level });
        }
        Ok(Self { category, level })
    }
}

// ---------------------------------------------------------------------------
// Capability keys
// ---------------------------------------------------------------------------

/// Non-equipment capability stats a technology can unlock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    None,
    DamageControl,
    Logistics,
    Astrogation,
    Training,
}

/// Composite key for a capability stat at an improvement level. Same
/// sentinel rules as [`SpecId`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CapabilityId {
    pub capability: Capability,
    pub level: ImprovementLevel,
}

impl CapabilityId {
    pub fn new(capability: Capability, level: ImprovementLevel) -> Result<Self, SpecError> {
        if capability == Capability::None || level == ImprovementLevel::None {
            return Err(SpecError::InvalidCapabilityKey { capability, level });
        }
        Ok(Self { capability, level })
    }
}

// ===========================================================================
// Tests
// ===========================================================================
