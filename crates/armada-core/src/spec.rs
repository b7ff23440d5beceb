//! The specification catalog: the variant family of equipment
//! specifications and their construction contracts.
//!
//! The original deep inheritance chain (image stat -> equipment stat ->
//! ranged equipment -> weapon -> projectile weapon -> missile/assault) is
//! flattened into a tagged union: shared fields live in [`SpecCommon`],
//! category-specific fields in the matching [`SpecBody`] variant. "Is-a
//! ranged equipment" queries become pattern matches on the body.
//!
//! Every concrete specification is immutable after construction. Numeric
//! fields are validated when the instance is built; violations fail with
//! [`SpecError`] rather than clamping. Values that are legal but
//! implausible produce [`SpecWarning`] diagnostics instead.

use serde::{Deserialize, Serialize};

use crate::fixed::{Fixed64, f64_to_fixed64};
use crate::id::{Capability, EquipmentCategory, ImprovementLevel, RangeCategory, SpecId};

// ---------------------------------------------------------------------------
// Errors and warnings
// ---------------------------------------------------------------------------

/// Construction-time validation failures. Fatal to the instance being built.
#[derive(Debug, Clone, thiserror::Error)]
pub enum SpecError {
    #[error("invalid specification '{name}': {reason}")]
    InvalidSpecification { name: String, reason: String },

    #[error("invalid key: ({category:?}, {level:?}) contains an undefined component")]
    InvalidKey {
        category: EquipmentCategory,
        level: ImprovementLevel,
    },

    #[error("invalid capability key: ({capability:?}, {level:?}) contains an undefined component")]
    InvalidCapabilityKey {
        capability: Capability,
        level: ImprovementLevel,
    },
}

/// A non-fatal diagnostic for a value that is legal but implausible.
/// Surfaced to the caller; never blocks construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecWarning {
    /// Name of the specification the warning applies to.
    pub spec: String,
    /// The field that triggered the warning.
    pub field: &'static str,
    /// Human-readable detail.
    pub detail: String,
}

// Plausibility ceilings for warn-only diagnostics. Inaccuracy is measured
// in degrees of deviation, reload period in seconds.
const PLAUSIBLE_INACCURACY_MAX: f64 = 45.0;
const PLAUSIBLE_RELOAD_MAX: f64 = 600.0;

// ---------------------------------------------------------------------------
// Shared payloads
// ---------------------------------------------------------------------------

/// Reference to an image in a sprite atlas.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRef {
    pub atlas: String,
    pub filename: String,
}

/// Fields shared by every equipment specification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpecCommon {
    pub name: String,
    pub image: ImageRef,
    pub description: String,
    /// Physical size in slot units.
    pub size: Fixed64,
    pub mass: Fixed64,
    pub power_requirement: Fixed64,
    pub construction_cost: Fixed64,
    pub upkeep: Fixed64,
    /// Hit points this piece of equipment contributes to its mount.
    pub hit_points: u32,
    pub damageable: bool,
    pub level: ImprovementLevel,
}

/// Stats shared by every weapon shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeaponStats {
    /// Strength of the delivery vehicle carrying the weapon's effect.
    pub delivery_strength: Fixed64,
    /// Seconds between shots.
    pub reload_period: Fixed64,
    pub damage_potential: Fixed64,
}

/// Physical profile of a projectile weapon's ordnance. Every field must be
/// strictly positive.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrdnanceProfile {
    pub speed: Fixed64,
    pub mass: Fixed64,
    pub drag: Fixed64,
}

/// Steering profile for self-guided ordnance (missiles, assault vehicles).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuidanceProfile {
    /// Degrees per second the ordnance can turn.
    pub turn_rate: Fixed64,
    /// Seconds between course updates.
    pub course_update_period: Fixed64,
    /// Degrees of steering deviation per course update.
    pub steering_inaccuracy: Fixed64,
}

/// Stats shared by ship and facility hulls.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HullStats {
    pub max_hit_points: u32,
    pub damage_mitigation: Fixed64,
    pub length: Fixed64,
    pub width: Fixed64,
    pub height: Fixed64,
}

// ---------------------------------------------------------------------------
// Sub-dimension enumerations
// ---------------------------------------------------------------------------

/// Which command seat a command module serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CommandStation {
    Fleet,
    Starbase,
    Settlement,
}

impl CommandStation {
    pub fn category(self) -> EquipmentCategory {
        match self {
            CommandStation::Fleet => EquipmentCategory::FleetCommand,
            CommandStation::Starbase => EquipmentCategory::StarbaseCommand,
            CommandStation::Settlement => EquipmentCategory::SettlementCommand,
        }
    }
}

/// Ship hull shapes. Availability widens with improvement level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShipHullShape {
    Frigate,
    Destroyer,
    Cruiser,
    Carrier,
    Dreadnought,
}

impl ShipHullShape {
    pub const ALL: [ShipHullShape; 5] = [
        ShipHullShape::Frigate,
        ShipHullShape::Destroyer,
        ShipHullShape::Cruiser,
        ShipHullShape::Carrier,
        ShipHullShape::Dreadnought,
    ];

    pub fn display_name(self) -> &'static str {
        match self {
            ShipHullShape::Frigate => "Frigate",
            ShipHullShape::Destroyer => "Destroyer",
            ShipHullShape::Cruiser => "Cruiser",
            ShipHullShape::Carrier => "Carrier",
            ShipHullShape::Dreadnought => "Dreadnought",
        }
    }

    /// The lowest improvement level at which this shape exists.
    pub fn minimum_level(self) -> ImprovementLevel {
        match self {
            ShipHullShape::Frigate | ShipHullShape::Destroyer => ImprovementLevel::One,
            ShipHullShape::Cruiser => ImprovementLevel::Two,
            ShipHullShape::Carrier => ImprovementLevel::Three,
            ShipHullShape::Dreadnought => ImprovementLevel::Four,
        }
    }

    pub fn available_at(self, level: ImprovementLevel) -> bool {
        level.rank() >= self.minimum_level().rank()
    }
}

/// Facility hull shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FacilityHullShape {
    Outpost,
    Laboratory,
    Foundry,
    Habitat,
}

impl FacilityHullShape {
    pub const ALL: [FacilityHullShape; 4] = [
        FacilityHullShape::Outpost,
        FacilityHullShape::Laboratory,
        FacilityHullShape::Foundry,
        FacilityHullShape::Habitat,
    ];

    pub fn display_name(self) -> &'static str {
        match self {
            FacilityHullShape::Outpost => "Outpost",
            FacilityHullShape::Laboratory => "Laboratory",
            FacilityHullShape::Foundry => "Foundry",
            FacilityHullShape::Habitat => "Habitat",
        }
    }

    pub fn minimum_level(self) -> ImprovementLevel {
        match self {
            FacilityHullShape::Outpost | FacilityHullShape::Laboratory => ImprovementLevel::One,
            FacilityHullShape::Foundry => ImprovementLevel::Two,
            FacilityHullShape::Habitat => ImprovementLevel::Three,
        }
    }

    pub fn available_at(self, level: ImprovementLevel) -> bool {
        level.rank() >= self.minimum_level().rank()
    }
}

// ---------------------------------------------------------------------------
// The variant body
// ---------------------------------------------------------------------------

/// Category-specific payload of a specification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum SpecBody {
    BeamWeapon {
        range: RangeCategory,
        weapon: WeaponStats,
        /// Seconds the beam stays on target once fired.
        firing_duration: Fixed64,
        /// Degrees of aim deviation at launch.
        launch_inaccuracy: Fixed64,
    },
    ProjectileWeapon {
        range: RangeCategory,
        weapon: WeaponStats,
        ordnance: OrdnanceProfile,
    },
    MissileWeapon {
        range: RangeCategory,
        weapon: WeaponStats,
        ordnance: OrdnanceProfile,
        guidance: GuidanceProfile,
    },
    AssaultWeapon {
        range: RangeCategory,
        weapon: WeaponStats,
        ordnance: OrdnanceProfile,
        guidance: GuidanceProfile,
    },
    ShipHull {
        shape: ShipHullShape,
        hull: HullStats,
        drag: Fixed64,
        science_yield: Fixed64,
        culture_yield: Fixed64,
        income_yield: Fixed64,
    },
    FacilityHull {
        shape: FacilityHullShape,
        hull: HullStats,
        food_yield: Fixed64,
        production_yield: Fixed64,
    },
    Sensor {
        range: RangeCategory,
        detection_strength: Fixed64,
    },
    ActiveCountermeasure {
        range: RangeCategory,
        intercept_strength: Fixed64,
        intercept_accuracy: Fixed64,
    },
    PassiveCountermeasure {
        damage_mitigation: Fixed64,
    },
    ShieldGenerator {
        maximum_charge: Fixed64,
        trickle_rate: Fixed64,
    },
    FtlDampener {
        range: RangeCategory,
        field_strength: Fixed64,
    },
    Engine {
        propulsion_power: Fixed64,
        max_turn_rate: Fixed64,
    },
    CommandModule {
        station: CommandStation,
        max_staff_effectiveness: Fixed64,
    },
}

impl SpecBody {
    /// The category tag this body shape corresponds to.
    pub fn category(&self) -> EquipmentCategory {
        match self {
            SpecBody::BeamWeapon { .. } => EquipmentCategory::BeamWeapon,
            SpecBody::ProjectileWeapon { .. } => EquipmentCategory::ProjectileWeapon,
            SpecBody::MissileWeapon { .. } => EquipmentCategory::MissileWeapon,
            SpecBody::AssaultWeapon { .. } => EquipmentCategory::AssaultWeapon,
            SpecBody::ShipHull { .. } => EquipmentCategory::ShipHull,
            SpecBody::FacilityHull { .. } => EquipmentCategory::FacilityHull,
            SpecBody::Sensor { .. } => EquipmentCategory::Sensor,
            SpecBody::ActiveCountermeasure { .. } => EquipmentCategory::ActiveCountermeasure,
            SpecBody::PassiveCountermeasure { .. } => EquipmentCategory::PassiveCountermeasure,
            SpecBody::ShieldGenerator { .. } => EquipmentCategory::ShieldGenerator,
            SpecBody::FtlDampener { .. } => EquipmentCategory::FtlDampener,
            SpecBody::Engine { .. } => EquipmentCategory::Engine,
            SpecBody::CommandModule { station, .. } => station.category(),
        }
    }

    /// The range band, for body shapes that carry one.
    pub fn range(&self) -> Option<RangeCategory> {
        match self {
            SpecBody::BeamWeapon { range, .. }
            | SpecBody::ProjectileWeapon { range, .. }
            | SpecBody::MissileWeapon { range, .. }
            | SpecBody::AssaultWeapon { range, .. }
            | SpecBody::Sensor { range, .. }
            | SpecBody::ActiveCountermeasure { range, .. }
            | SpecBody::FtlDampener { range, .. } => Some(*range),
            _ => None,
        }
    }

    /// The weapon stats, for weapon shapes.
    pub fn weapon(&self) -> Option<&WeaponStats> {
        match self {
            SpecBody::BeamWeapon { weapon, .. }
            | SpecBody::ProjectileWeapon { weapon, .. }
            | SpecBody::MissileWeapon { weapon, .. }
            | SpecBody::AssaultWeapon { weapon, .. } => Some(weapon),
            _ => None,
        }
    }

    /// The ordnance profile, for projectile-launching shapes.
    pub fn ordnance(&self) -> Option<&OrdnanceProfile> {
        match self {
            SpecBody::ProjectileWeapon { ordnance, .. }
            | SpecBody::MissileWeapon { ordnance, .. }
            | SpecBody::AssaultWeapon { ordnance, .. } => Some(ordnance),
            _ => None,
        }
    }

    fn guidance(&self) -> Option<&GuidanceProfile> {
        match self {
            SpecBody::MissileWeapon { guidance, .. }
            | SpecBody::AssaultWeapon { guidance, .. } => Some(guidance),
            _ => None,
        }
    }

    fn hull(&self) -> Option<&HullStats> {
        match self {
            SpecBody::ShipHull { hull, .. } | SpecBody::FacilityHull { hull, .. } => Some(hull),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// The specification
// ---------------------------------------------------------------------------

/// One immutable equipment specification. Built once by the factory,
/// cached, and handed to consumers as a shared reference. There are no
/// `&mut self` methods; the factory's single-instancing makes reference
/// identity the equality consumers need.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EquipmentSpec {
    pub common: SpecCommon,
    pub body: SpecBody,
}

impl EquipmentSpec {
    /// Validate and construct a specification. Returns the instance plus
    /// any warn-only diagnostics. Validation failures are fatal to the
    /// instance; nothing is clamped.
    pub fn new(
        common: SpecCommon,
        body: SpecBody,
    ) -> Result<(EquipmentSpec, Vec<SpecWarning>), SpecError> {
        let mut warnings = Vec::new();
        validate(&common, &body, &mut warnings)?;
        Ok((EquipmentSpec { common, body }, warnings))
    }

    pub fn name(&self) -> &str {
        &self.common.name
    }

    pub fn category(&self) -> EquipmentCategory {
        self.body.category()
    }

    pub fn level(&self) -> ImprovementLevel {
        self.common.level
    }

    /// The composite cache key addressing this instance's slot.
    pub fn id(&self) -> SpecId {
        SpecId {
            category: self.category(),
            level: self.common.level,
        }
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate(
    common: &SpecCommon,
    body: &SpecBody,
    warnings: &mut Vec<SpecWarning>,
) -> Result<(), SpecError> {
    let fail = |reason: String| SpecError::InvalidSpecification {
        name: common.name.clone(),
        reason,
    };

    if common.level == ImprovementLevel::None {
        return Err(fail("improvement level is the undefined sentinel".into()));
    }

    for (field, value) in [
        ("size", common.size),
        ("mass", common.mass),
        ("power_requirement", common.power_requirement),
        ("construction_cost", common.construction_cost),
        ("upkeep", common.upkeep),
    ] {
        if value < Fixed64::ZERO {
            return Err(fail(format!("{field} is negative ({value})")));
        }
    }

    if body.range() == Some(RangeCategory::None) {
        return Err(fail("range category is the undefined sentinel".into()));
    }

    if let Some(weapon) = body.weapon() {
        for (field, value) in [
            ("delivery_strength", weapon.delivery_strength),
            ("reload_period", weapon.reload_period),
            ("damage_potential", weapon.damage_potential),
        ] {
            if value < Fixed64::ZERO {
                return Err(fail(format!("{field} is negative ({value})")));
            }
        }
        if weapon.reload_period > f64_to_fixed64(PLAUSIBLE_RELOAD_MAX) {
            warnings.push(SpecWarning {
                spec: common.name.clone(),
                field: "reload_period",
                detail: format!(
                    "{} seconds exceeds the plausible maximum of {PLAUSIBLE_RELOAD_MAX}",
                    weapon.reload_period
                ),
            });
        }
    }

    // Ordnance physics must be strictly positive; zero speed, mass, or drag
    // makes the flight model degenerate.
    if let Some(ordnance) = body.ordnance() {
        for (field, value) in [
            ("ordnance speed", ordnance.speed),
            ("ordnance mass", ordnance.mass),
            ("ordnance drag", ordnance.drag),
        ] {
            if value <= Fixed64::ZERO {
                return Err(fail(format!("{field} must be strictly positive ({value})")));
            }
        }
    }

    if let Some(guidance) = body.guidance() {
        for (field, value) in [
            ("turn_rate", guidance.turn_rate),
            ("course_update_period", guidance.course_update_period),
            ("steering_inaccuracy", guidance.steering_inaccuracy),
        ] {
            if value < Fixed64::ZERO {
                return Err(fail(format!("{field} is negative ({value})")));
            }
        }
        if guidance.steering_inaccuracy > f64_to_fixed64(PLAUSIBLE_INACCURACY_MAX) {
            warnings.push(SpecWarning {
                spec: common.name.clone(),
                field: "steering_inaccuracy",
                detail: format!(
                    "{} degrees exceeds the plausible maximum of {PLAUSIBLE_INACCURACY_MAX}",
                    guidance.steering_inaccuracy
                ),
            });
        }
    }

    if let SpecBody::BeamWeapon {
        firing_duration,
        launch_inaccuracy,
        ..
    } = body
    {
        if *firing_duration < Fixed64::ZERO {
            return Err(fail(format!("firing_duration is negative ({firing_duration})")));
        }
        if *launch_inaccuracy < Fixed64::ZERO {
            return Err(fail(format!("launch_inaccuracy is negative ({launch_inaccuracy})")));
        }
        if *launch_inaccuracy > f64_to_fixed64(PLAUSIBLE_INACCURACY_MAX) {
            warnings.push(SpecWarning {
                spec: common.name.clone(),
                field: "launch_inaccuracy",
                detail: format!(
                    "{launch_inaccuracy} degrees exceeds the plausible maximum of {PLAUSIBLE_INACCURACY_MAX}"
                ),
            });
        }
    }

    if let Some(hull) = body.hull() {
        for (field, value) in [
            ("damage_mitigation", hull.damage_mitigation),
            ("length", hull.length),
            ("width", hull.width),
            ("height", hull.height),
        ] {
            if value < Fixed64::ZERO {
                return Err(fail(format!("{field} is negative ({value})")));
            }
        }
    }

    // Remaining per-variant stats. Weapon payloads are already covered
    // through the accessors above.
    let body_stats: Vec<(&'static str, Fixed64)> = match body {
        SpecBody::Sensor {
            detection_strength, ..
        } => vec![("detection_strength", *detection_strength)],
        SpecBody::ActiveCountermeasure {
            intercept_strength,
            intercept_accuracy,
            ..
        } => vec![
            ("intercept_strength", *intercept_strength),
            ("intercept_accuracy", *intercept_accuracy),
        ],
        SpecBody::PassiveCountermeasure { damage_mitigation } => {
            vec![("damage_mitigation", *damage_mitigation)]
        }
        SpecBody::ShieldGenerator {
            maximum_charge,
            trickle_rate,
        } => vec![
            ("maximum_charge", *maximum_charge),
            ("trickle_rate", *trickle_rate),
        ],
        SpecBody::FtlDampener { field_strength, .. } => {
            vec![("field_strength", *field_strength)]
        }
        SpecBody::Engine {
            propulsion_power,
            max_turn_rate,
        } => vec![
            ("propulsion_power", *propulsion_power),
            ("max_turn_rate", *max_turn_rate),
        ],
        SpecBody::CommandModule {
            max_staff_effectiveness,
            ..
        } => vec![("max_staff_effectiveness", *max_staff_effectiveness)],
        SpecBody::ShipHull {
            drag,
            science_yield,
            culture_yield,
            income_yield,
            ..
        } => vec![
            ("drag", *drag),
            ("science_yield", *science_yield),
            ("culture_yield", *culture_yield),
            ("income_yield", *income_yield),
        ],
        SpecBody::FacilityHull {
            food_yield,
            production_yield,
            ..
        } => vec![
            ("food_yield", *food_yield),
            ("production_yield", *production_yield),
        ],
        SpecBody::BeamWeapon { .. }
        | SpecBody::ProjectileWeapon { .. }
        | SpecBody::MissileWeapon { .. }
        | SpecBody::AssaultWeapon { .. } => Vec::new(),
    };
    for (field, value) in body_stats {
        if value < Fixed64::ZERO {
            return Err(fail(format!("{field} is negative ({value})")));
        }
    }

    Ok(())
}

// ===========================================================================
// Tests
// ===========================================================================
