//! Instance generators: one pure function per equipment category.
//!
//! The factory/cache calls [`generate`] once per (category, level) key
//! during population. Each generator derives its stats from the level's
//! ordinal rank plus bounded jitter from the injected [`SimRng`], so the
//! full catalog is a pure function of the population seed.
//!
//! Cardinality per key:
//! - weapon categories produce one instance per range band (three total)
//! - hull categories produce one instance per shape available at the level
//! - FTL dampeners exist only from level three upward
//! - every other category produces exactly one instance

use crate::cache::CacheError;
use crate::fixed::{Fixed64, f64_to_fixed64};
use crate::id::{EquipmentCategory, ImprovementLevel, RangeCategory};
use crate::rng::SimRng;
use crate::spec::{
    CommandStation, EquipmentSpec, FacilityHullShape, GuidanceProfile, HullStats, ImageRef,
    OrdnanceProfile, ShipHullShape, SpecBody, SpecCommon, SpecWarning, WeaponStats,
};

/// Output of one generator run: the canonical instances for a single
/// (category, level) key, plus any warn-only diagnostics raised while
/// constructing them.
#[derive(Debug, Default)]
pub struct Generated {
    pub specs: Vec<EquipmentSpec>,
    pub warnings: Vec<SpecWarning>,
}

impl Generated {
    fn push(&mut self, built: (EquipmentSpec, Vec<SpecWarning>)) {
        let (spec, mut warnings) = built;
        self.specs.push(spec);
        self.warnings.append(&mut warnings);
    }
}

/// Run the generator for one (category, level) key.
pub fn generate(
    category: EquipmentCategory,
    level: ImprovementLevel,
    rng: &mut SimRng,
) -> Result<Generated, CacheError> {
    let mut out = Generated::default();
    match category {
        EquipmentCategory::None => return Err(CacheError::UnsupportedCategory),
        EquipmentCategory::BeamWeapon => {
            for range in RangeCategory::concrete() {
                out.push(beam_weapon(level, range, rng)?);
            }
        }
        EquipmentCategory::ProjectileWeapon => {
            for range in RangeCategory::concrete() {
                out.push(projectile_weapon(level, range, rng)?);
            }
        }
        EquipmentCategory::MissileWeapon => {
            for range in RangeCategory::concrete() {
                out.push(guided_weapon(level, range, rng, false)?);
            }
        }
        EquipmentCategory::AssaultWeapon => {
            for range in RangeCategory::concrete() {
                out.push(guided_weapon(level, range, rng, true)?);
            }
        }
        EquipmentCategory::ShipHull => {
            for shape in ShipHullShape::ALL {
                if shape.available_at(level) {
                    out.push(ship_hull(level, shape, rng)?);
                }
            }
        }
        EquipmentCategory::FacilityHull => {
            for shape in FacilityHullShape::ALL {
                if shape.available_at(level) {
                    out.push(facility_hull(level, shape, rng)?);
                }
            }
        }
        EquipmentCategory::Sensor => out.push(sensor(level, rng)?),
        EquipmentCategory::ActiveCountermeasure => out.push(active_countermeasure(level, rng)?),
        EquipmentCategory::PassiveCountermeasure => out.push(passive_countermeasure(level, rng)?),
        EquipmentCategory::ShieldGenerator => out.push(shield_generator(level, rng)?),
        EquipmentCategory::FtlDampener => {
            // Dampener field theory is unlocked at level three; lower keys
            // legitimately have no instances.
            if level.rank() >= ImprovementLevel::Three.rank() {
                out.push(ftl_dampener(level, rng)?);
            }
        }
        EquipmentCategory::Engine => out.push(engine(level, rng)?),
        EquipmentCategory::FleetCommand => {
            out.push(command_module(level, CommandStation::Fleet, rng)?)
        }
        EquipmentCategory::StarbaseCommand => {
            out.push(command_module(level, CommandStation::Starbase, rng)?)
        }
        EquipmentCategory::SettlementCommand => {
            out.push(command_module(level, CommandStation::Settlement, rng)?)
        }
    }
    Ok(out)
}

// ---------------------------------------------------------------------------
// Stat formulas
// ---------------------------------------------------------------------------

/// Multiplier applied to base stats: 1.0 at level one, +0.5 per level.
fn level_factor(level: ImprovementLevel) -> Fixed64 {
    f64_to_fixed64(1.0) + f64_to_fixed64(0.5) * Fixed64::from_num(level.rank().saturating_sub(1))
}

/// Bounded multiplicative jitter in `[1 - spread, 1 + spread)`.
fn jitter(rng: &mut SimRng, spread: f64) -> Fixed64 {
    rng.fixed_in(f64_to_fixed64(1.0 - spread), f64_to_fixed64(1.0 + spread))
}

fn scaled(base: f64, level: ImprovementLevel, rng: &mut SimRng) -> Fixed64 {
    f64_to_fixed64(base) * level_factor(level) * jitter(rng, 0.1)
}

/// Instance display name: range band, base noun, and a mark numeral for
/// levels above the first.
fn named(range: Option<RangeCategory>, base: &str, level: ImprovementLevel) -> String {
    let stem = match range {
        Some(range) => format!("{} {base}", range.label()),
        None => base.to_string(),
    };
    match level.rank() {
        0 | 1 => stem,
        rank => format!("{stem} Mk {}", roman(rank)),
    }
}

fn roman(rank: u32) -> &'static str {
    match rank {
        1 => "I",
        2 => "II",
        3 => "III",
        4 => "IV",
        _ => "V",
    }
}

fn common(
    name: String,
    filename: &str,
    level: ImprovementLevel,
    rng: &mut SimRng,
    base_size: f64,
    base_cost: f64,
) -> SpecCommon {
    SpecCommon {
        name,
        image: ImageRef {
            atlas: "equipment".to_string(),
            filename: filename.to_string(),
        },
        description: String::new(),
        size: f64_to_fixed64(base_size),
        mass: scaled(base_size * 4.0, level, rng),
        power_requirement: scaled(base_size * 2.0, level, rng),
        construction_cost: scaled(base_cost, level, rng),
        upkeep: scaled(base_cost / 50.0, level, rng),
        hit_points: 20 * level.rank().max(1),
        damageable: true,
        level,
    }
}

/// Reload and damage scale with range band: longer reach trades rate of
/// fire for heavier hits.
fn range_scale(range: RangeCategory) -> (f64, f64) {
    match range {
        RangeCategory::None | RangeCategory::Short => (1.0, 1.0),
        RangeCategory::Medium => (1.6, 1.5),
        RangeCategory::Long => (2.4, 2.2),
    }
}

fn weapon_stats(
    level: ImprovementLevel,
    range: RangeCategory,
    rng: &mut SimRng,
    base_damage: f64,
) -> WeaponStats {
    let (reload_mul, damage_mul) = range_scale(range);
    WeaponStats {
        delivery_strength: scaled(2.0, level, rng),
        reload_period: f64_to_fixed64(3.0 * reload_mul) * jitter(rng, 0.1),
        damage_potential: scaled(base_damage * damage_mul, level, rng),
    }
}

fn ordnance(level: ImprovementLevel, rng: &mut SimRng, base_speed: f64) -> OrdnanceProfile {
    OrdnanceProfile {
        speed: scaled(base_speed, level, rng),
        mass: f64_to_fixed64(0.4) * jitter(rng, 0.1),
        drag: f64_to_fixed64(0.02) * jitter(rng, 0.1),
    }
}

// ---------------------------------------------------------------------------
// Per-category generators
// ---------------------------------------------------------------------------

type Built = Result<(EquipmentSpec, Vec<SpecWarning>), CacheError>;

fn beam_weapon(level: ImprovementLevel, range: RangeCategory, rng: &mut SimRng) -> Built {
    let c = common(
        named(Some(range), "Beam Emitter", level),
        "beam_emitter.png",
        level,
        rng,
        2.0,
        120.0,
    );
    let body = SpecBody::BeamWeapon {
        range,
        weapon: weapon_stats(level, range, rng, 8.0),
        firing_duration: f64_to_fixed64(1.5) * jitter(rng, 0.1),
        launch_inaccuracy: f64_to_fixed64(0.5) * jitter(rng, 0.1),
    };
    Ok(EquipmentSpec::new(c, body)?)
}

fn projectile_weapon(level: ImprovementLevel, range: RangeCategory, rng: &mut SimRng) -> Built {
    let c = common(
        named(Some(range), "Autocannon", level),
        "autocannon.png",
        level,
        rng,
        2.5,
        100.0,
    );
    let body = SpecBody::ProjectileWeapon {
        range,
        weapon: weapon_stats(level, range, rng, 10.0),
        ordnance: ordnance(level, rng, 90.0),
    };
    Ok(EquipmentSpec::new(c, body)?)
}

fn guided_weapon(
    level: ImprovementLevel,
    range: RangeCategory,
    rng: &mut SimRng,
    assault: bool,
) -> Built {
    let (base, filename, size, cost, speed) = if assault {
        ("Boarding Pod Launcher", "boarding_pod.png", 4.0, 180.0, 25.0)
    } else {
        ("Torpedo Rack", "torpedo_rack.png", 3.0, 150.0, 45.0)
    };
    let c = common(named(Some(range), base, level), filename, level, rng, size, cost);
    let weapon = weapon_stats(level, range, rng, if assault { 4.0 } else { 14.0 });
    let ordnance = ordnance(level, rng, speed);
    let guidance = GuidanceProfile {
        turn_rate: scaled(30.0, level, rng),
        course_update_period: f64_to_fixed64(0.5) * jitter(rng, 0.1),
        steering_inaccuracy: f64_to_fixed64(4.0) * jitter(rng, 0.1),
    };
    let body = if assault {
        SpecBody::AssaultWeapon {
            range,
            weapon,
            ordnance,
            guidance,
        }
    } else {
        SpecBody::MissileWeapon {
            range,
            weapon,
            ordnance,
            guidance,
        }
    };
    Ok(EquipmentSpec::new(c, body)?)
}

fn hull_stats(level: ImprovementLevel, rng: &mut SimRng, scale: f64) -> HullStats {
    HullStats {
        max_hit_points: (100.0 * scale) as u32 * level.rank().max(1),
        damage_mitigation: scaled(0.05 * scale, level, rng),
        length: f64_to_fixed64(60.0 * scale) * jitter(rng, 0.1),
        width: f64_to_fixed64(12.0 * scale) * jitter(rng, 0.1),
        height: f64_to_fixed64(10.0 * scale) * jitter(rng, 0.1),
    }
}

fn ship_hull(level: ImprovementLevel, shape: ShipHullShape, rng: &mut SimRng) -> Built {
    let scale = match shape {
        ShipHullShape::Frigate => 1.0,
        ShipHullShape::Destroyer => 1.5,
        ShipHullShape::Cruiser => 2.5,
        ShipHullShape::Carrier => 4.0,
        ShipHullShape::Dreadnought => 6.0,
    };
    let c = common(
        named(None, &format!("{} Hull", shape.display_name()), level),
        "ship_hull.png",
        level,
        rng,
        10.0 * scale,
        400.0 * scale,
    );
    let body = SpecBody::ShipHull {
        shape,
        hull: hull_stats(level, rng, scale),
        drag: f64_to_fixed64(0.1 * scale) * jitter(rng, 0.1),
        science_yield: scaled(1.0, level, rng),
        culture_yield: scaled(0.5, level, rng),
        income_yield: scaled(0.5, level, rng),
    };
    Ok(EquipmentSpec::new(c, body)?)
}

fn facility_hull(level: ImprovementLevel, shape: FacilityHullShape, rng: &mut SimRng) -> Built {
    let scale = match shape {
        FacilityHullShape::Outpost => 1.0,
        FacilityHullShape::Laboratory => 1.5,
        FacilityHullShape::Foundry => 2.0,
        FacilityHullShape::Habitat => 3.0,
    };
    let c = common(
        named(None, &format!("{} Hull", shape.display_name()), level),
        "facility_hull.png",
        level,
        rng,
        15.0 * scale,
        500.0 * scale,
    );
    let body = SpecBody::FacilityHull {
        shape,
        hull: hull_stats(level, rng, scale * 1.5),
        food_yield: scaled(2.0 * scale, level, rng),
        production_yield: scaled(3.0 * scale, level, rng),
    };
    Ok(EquipmentSpec::new(c, body)?)
}

fn sensor(level: ImprovementLevel, rng: &mut SimRng) -> Built {
    let c = common(
        named(None, "Sensor Array", level),
        "sensor_array.png",
        level,
        rng,
        1.5,
        80.0,
    );
    let body = SpecBody::Sensor {
        range: RangeCategory::Long,
        detection_strength: scaled(5.0, level, rng),
    };
    Ok(EquipmentSpec::new(c, body)?)
}

fn active_countermeasure(level: ImprovementLevel, rng: &mut SimRng) -> Built {
    let c = common(
        named(None, "Point Defense Turret", level),
        "point_defense.png",
        level,
        rng,
        1.5,
        90.0,
    );
    let body = SpecBody::ActiveCountermeasure {
        range: RangeCategory::Short,
        intercept_strength: scaled(3.0, level, rng),
        intercept_accuracy: scaled(0.6, level, rng),
    };
    Ok(EquipmentSpec::new(c, body)?)
}

fn passive_countermeasure(level: ImprovementLevel, rng: &mut SimRng) -> Built {
    let c = common(
        named(None, "Ablative Plating", level),
        "ablative_plating.png",
        level,
        rng,
        3.0,
        70.0,
    );
    let body = SpecBody::PassiveCountermeasure {
        damage_mitigation: scaled(0.08, level, rng),
    };
    Ok(EquipmentSpec::new(c, body)?)
}

fn shield_generator(level: ImprovementLevel, rng: &mut SimRng) -> Built {
    let c = common(
        named(None, "Deflector Shield", level),
        "deflector_shield.png",
        level,
        rng,
        3.0,
        160.0,
    );
    let body = SpecBody::ShieldGenerator {
        maximum_charge: scaled(50.0, level, rng),
        trickle_rate: scaled(2.0, level, rng),
    };
    Ok(EquipmentSpec::new(c, body)?)
}

fn ftl_dampener(level: ImprovementLevel, rng: &mut SimRng) -> Built {
    let c = common(
        named(None, "Interdiction Field Projector", level),
        "interdiction_field.png",
        level,
        rng,
        5.0,
        300.0,
    );
    let body = SpecBody::FtlDampener {
        range: RangeCategory::Medium,
        field_strength: scaled(4.0, level, rng),
    };
    Ok(EquipmentSpec::new(c, body)?)
}

fn engine(level: ImprovementLevel, rng: &mut SimRng) -> Built {
    let c = common(
        named(None, "Fusion Torch Drive", level),
        "fusion_torch.png",
        level,
        rng,
        6.0,
        200.0,
    );
    let body = SpecBody::Engine {
        propulsion_power: scaled(25.0, level, rng),
        max_turn_rate: scaled(15.0, level, rng),
    };
    Ok(EquipmentSpec::new(c, body)?)
}

fn command_module(level: ImprovementLevel, station: CommandStation, rng: &mut SimRng) -> Built {
    let base = match station {
        CommandStation::Fleet => "Fleet Command Bridge",
        CommandStation::Starbase => "Starbase Operations Center",
        CommandStation::Settlement => "Settlement Administration Core",
    };
    let c = common(
        named(None, base, level),
        "command_module.png",
        level,
        rng,
        4.0,
        220.0,
    );
    let body = SpecBody::CommandModule {
        station,
        max_staff_effectiveness: scaled(1.2, level, rng),
    };
    Ok(EquipmentSpec::new(c, body)?)
}

// ===========================================================================
// Tests
// ===========================================================================
