//! Cross-crate session tests: data files on disk through to per-player
//! technology views.

use std::fs;
use std::path::{Path, PathBuf};

use armada_core::fixed::f64_to_fixed64;
use armada_core::id::{EquipmentCategory, ImprovementLevel};
use armada_core::player::{Player, PlayerId, Species};
use armada_data::session::{GameSession, SessionError};
use armada_data::load_tech_declarations;
use armada_tech::FUTURE_TECH_NAME;
use std::collections::HashSet;

const TECH_FILE: &str = r#"[
    (name: "Magnetics", research_cost: 100),
    (
        name: "Coilguns",
        research_cost: 250,
        prerequisites: ["Magnetics"],
        unlocks: [equipment(category: projectile_weapon, level: one)],
    ),
    (
        name: "Interdiction Theory",
        research_cost: 400,
        prerequisites: ["Magnetics"],
        unlocks: [equipment(category: ftl_dampener, level: three)],
    ),
    (name: "Future Tech", research_cost: 1000, future_tech: true),
]"#;

fn make_data_dir(suffix: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "armada_session_test_{suffix}_{}",
        std::process::id()
    ));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("technologies.ron"), TECH_FILE).unwrap();
    dir
}

fn cleanup(dir: &Path) {
    let _ = fs::remove_dir_all(dir);
}

fn players() -> Vec<Player> {
    vec![
        Player::new(PlayerId(1), "Terran Directorate", Species::Terran),
        Player::new(PlayerId(2), "Voidborn Compact", Species::Voidborn),
    ]
}

fn started_session(suffix: &str, seed: u64) -> (GameSession, PathBuf) {
    let dir = make_data_dir(suffix);
    let declarations = load_tech_declarations(&dir).unwrap();
    let mut session = GameSession::new();
    session.begin_new_game(seed, declarations, players()).unwrap();
    (session, dir)
}

#[test]
fn data_files_drive_a_full_session() {
    let (session, dir) = started_session("full", 42);

    // Catalog is up.
    let cache = session.cache().unwrap();
    assert!(cache.is_populated());
    let hulls = cache
        .get_all(EquipmentCategory::ShipHull, ImprovementLevel::One)
        .unwrap();
    assert_eq!(hulls.len(), 2);

    // Graph resolved the forward-declared prerequisites.
    let (_, coilguns) = session.technology("Coilguns").unwrap();
    assert_eq!(coilguns.prerequisites.len(), 1);
    assert_eq!(coilguns.unlocks.len(), 1);

    cleanup(&dir);
}

#[test]
fn research_progression_gates_availability() {
    let (session, dir) = started_session("progress", 42);
    let graph = session.graph().unwrap();
    let cache = session.cache().unwrap();
    let magnetics = graph.resolve("Magnetics").unwrap();
    let coilguns = graph.resolve("Coilguns").unwrap();
    let modifiers = &session.player(PlayerId(1)).unwrap().modifiers;

    let mut completed = HashSet::new();
    let view = graph
        .materialize(coilguns, cache, modifiers, &completed)
        .unwrap();
    assert!(!view.available);
    // Coilguns unlock the three level-one projectile weapons.
    assert_eq!(view.unlocked_specs.len(), 3);

    completed.insert(magnetics);
    let view = graph
        .materialize(coilguns, cache, modifiers, &completed)
        .unwrap();
    assert!(view.available);
    assert!(!view.completed);

    cleanup(&dir);
}

#[test]
fn player_modifiers_change_costs_per_player_only() {
    let (session, dir) = started_session("modifiers", 42);

    // Give one player a research discount directly on their modifiers.
    let cheap = {
        let mut m = session.player(PlayerId(1)).unwrap().modifiers.clone();
        m.research_cost_factor = f64_to_fixed64(0.5);
        m
    };
    let full = session.player(PlayerId(2)).unwrap().modifiers.clone();

    let graph = session.graph().unwrap();
    let cache = session.cache().unwrap();
    let handle = graph.resolve("Coilguns").unwrap();
    let completed = HashSet::new();

    let discounted = graph.materialize(handle, cache, &cheap, &completed).unwrap();
    let undiscounted = graph.materialize(handle, cache, &full, &completed).unwrap();
    assert_eq!(discounted.research_cost, f64_to_fixed64(125.0));
    assert_eq!(undiscounted.research_cost, f64_to_fixed64(250.0));

    // The shared definition is untouched.
    assert_eq!(graph.get(handle).unwrap().research_cost, 250);

    cleanup(&dir);
}

#[test]
fn future_tech_extends_through_the_session() {
    let (mut session, dir) = started_session("future", 42);

    let graph = session.graph_mut().unwrap();
    let mut handle = graph.resolve(FUTURE_TECH_NAME).unwrap();
    let before = graph.len();

    // Completing the tail three times grows the chain three links.
    for expected_cost in [1500u32, 2000, 2500] {
        handle = graph.successor_of(handle).unwrap();
        assert_eq!(graph.get(handle).unwrap().research_cost, expected_cost);
    }
    assert_eq!(graph.len(), before + 3);
    assert_eq!(graph.get(handle).unwrap().name, "Future Tech 4");

    cleanup(&dir);
}

#[test]
fn restarting_invalidates_the_old_game() {
    let (mut session, dir) = started_session("restart", 1);
    let first_cost = session
        .cache()
        .unwrap()
        .get_single(EquipmentCategory::Engine, ImprovementLevel::One)
        .unwrap()
        .common
        .construction_cost;

    let declarations = load_tech_declarations(&dir).unwrap();
    session.begin_new_game(2, declarations, players()).unwrap();

    let second_cost = session
        .cache()
        .unwrap()
        .get_single(EquipmentCategory::Engine, ImprovementLevel::One)
        .unwrap()
        .common
        .construction_cost;
    assert_ne!(first_cost, second_cost);

    cleanup(&dir);
}

#[test]
fn bad_data_leaves_no_half_started_session() {
    let dir = make_data_dir("bad_data");
    // Overwrite with a graph that contains a cycle.
    fs::write(
        dir.join("technologies.ron"),
        r#"[
            (name: "X", research_cost: 1, prerequisites: ["Y"]),
            (name: "Y", research_cost: 1, prerequisites: ["X"]),
        ]"#,
    )
    .unwrap();

    let declarations = load_tech_declarations(&dir).unwrap();
    let mut session = GameSession::new();
    let result = session.begin_new_game(42, declarations, players());
    assert!(matches!(result, Err(SessionError::Tech(_))));
    assert!(!session.is_running());
    assert!(matches!(session.cache(), Err(SessionError::NotInitialized)));

    cleanup(&dir);
}
