//! End-to-end planner scenarios over the fixture catalog.

use std::time::{Duration, Instant};

use planner_core::prelude::*;
use planner_core::codec::{decode_formation, encode_formation, EMPTY_CELL};
use planner_test_utils::fixtures::{fixture_registry, fixture_store, grid_signature, roster_signature, PlanBuilder};

fn pos(row: usize, col: usize) -> GridPos {
    GridPos::new(row, col).unwrap()
}

#[test]
fn test_fifty_archers_on_empty_roster_report_per_level_cap() {
    let plan = PlanState::new("Formation 9");
    let check = plan.check_batch("Archers", 1, 50, PlannerConfig::default().limits());

    assert!(!check.allowed);
    assert_eq!(check.max_admittable, 49);
    assert_eq!(check.reason, CapacityReason::PerLevelCapExceeded);
    assert_eq!(
        check.user_message(),
        "Cannot add 50 units. Maximum count for Archers level 1 is 49. You can add 49 more units."
    );
}

#[test]
fn test_place_into_occupied_cell_returns_occupant() {
    let registry = fixture_registry();
    let archers = registry.get_unit_data_by_name("Archers").unwrap();
    let paladin = registry.get_unit_data_by_name("Paladin").unwrap();
    let a = Unit::new(UnitId::new("u1"), archers, 1).unwrap();
    let b = Unit::new(UnitId::new("u2"), paladin, 1).unwrap();
    let b_power = b.power();

    let mut plan = PlanState::new("Formation 9");
    plan.add_to_roster([a, b]);
    plan.place(&UnitId::new("u1"), pos(0, 0)).unwrap();
    plan.place(&UnitId::new("u2"), pos(0, 0)).unwrap();

    assert_eq!(plan.formation().tile(pos(0, 0)).unwrap().id().as_str(), "u2");
    assert!(plan.roster().contains(&UnitId::new("u1")));
    assert_eq!(plan.roster().len(), 1);
    assert_eq!(plan.formation().power(), b_power);
}

#[test]
fn test_encode_single_archer_then_decode() {
    let registry = fixture_registry();
    let plan = PlanBuilder::new().name("FormationName").place(0, 0, "Archers", 1).build();

    let encoded = encode_formation(plan.formation(), &registry);
    assert!(encoded.starts_with("FormationName;2,1;_;_;"));
    assert_eq!(encoded.matches(EMPTY_CELL).count(), 48);

    let decoded = decode_formation(&encoded, &registry, &mut IdGenerator::new(9), &PlannerConfig::default());
    assert!(decoded.is_clean());
    let formation = decoded.value;
    let unit = formation.tile(pos(0, 0)).unwrap();
    assert_eq!((unit.name(), unit.level()), ("Archers", 1));
    assert_eq!(formation.placed_count(), 1);
}

#[test]
fn test_withdraw_all_five_units() {
    let mut plan = PlanBuilder::new()
        .roster("Infantry", 2, 3)
        .place(0, 0, "Archers", 1)
        .place(1, 4, "Paladin", 2)
        .place(3, 3, "Zealot", 1)
        .place(5, 0, "Archers", 7)
        .place(6, 6, "Air Elemental", 10)
        .build();
    let roster_before = plan.roster().len();

    assert_eq!(plan.withdraw_all(), 5);
    assert!(plan.formation().is_empty());
    assert_eq!(plan.formation().power(), 0);
    assert_eq!(plan.roster().len(), roster_before + 5);
}

#[test]
fn test_store_session_round_trips_through_share_link() {
    let start = Instant::now();
    let mut store = fixture_store(42);

    let add = |name: &str, level, count| Action::AddUnits {
        name: name.to_string(),
        level,
        count,
        fallback_rarity: None,
    };
    store.dispatch(&add("Archers 2", 3, 4), start).unwrap();
    store.dispatch(&add("Zealot", 1, 2), start).unwrap();
    store
        .dispatch(&Action::RenameFormation("Dawn;Raid".to_string()), start)
        .unwrap();

    let zealot = store
        .roster()
        .iter()
        .find(|u| u.name() == "Zealot")
        .unwrap()
        .id()
        .clone();
    store
        .dispatch(
            &Action::PlaceUnit {
                row: 3,
                col: 3,
                unit_id: zealot,
            },
            start,
        )
        .unwrap();

    let written = store.poll_url(start + Duration::from_secs(1)).unwrap();
    assert!(written.formation.starts_with("DawnRaid;"));
    assert_eq!(written.units, "2,3,4;28,1,1");

    let (reloaded, skipped) = PlannerStore::from_query(
        fixture_registry(),
        PlannerConfig::default(),
        43,
        Some(&written.formation),
        Some(&written.units),
    )
    .unwrap();
    assert!(skipped.is_empty());
    assert_eq!(reloaded.formation().name(), "DawnRaid");
    assert_eq!(grid_signature(reloaded.state()), grid_signature(store.state()));
    assert_eq!(roster_signature(reloaded.roster()), roster_signature(store.roster()));
}

#[test]
fn test_stale_reference_is_rejected_without_mutation() {
    let now = Instant::now();
    let mut store = fixture_store(7);
    store
        .dispatch(
            &Action::AddUnits {
                name: "Paladin".to_string(),
                level: 1,
                count: 1,
                fallback_rarity: None,
            },
            now,
        )
        .unwrap();
    let before = store.state().clone();

    let stale = Action::PlaceUnit {
        row: 0,
        col: 0,
        unit_id: UnitId::new("gone"),
    };
    let err = store.dispatch(&stale, now).unwrap_err();
    assert!(matches!(err, PlannerError::UnitNotFound(_)));
    assert!(!err.is_user_facing());
    assert_eq!(store.state(), &before);

    let out_of_bounds = Action::RemoveFromFormation { row: 0, col: 9 };
    assert!(matches!(
        store.dispatch(&out_of_bounds, now),
        Err(PlannerError::OutOfBounds { row: 0, col: 9 })
    ));
    assert_eq!(store.state(), &before);
}

#[test]
fn test_builtin_catalog_share_link() {
    let registry = UnitRegistry::builtin();
    let mut ids = IdGenerator::new(1);
    let decoded = decode_plan(
        Some("Formation 9;3,10;_;45,1"),
        Some("2,5,3;0,1,1"),
        &registry,
        &mut ids,
        &PlannerConfig::default(),
    );
    assert!(decoded.is_clean());
    let plan = decoded.value;

    assert_eq!(plan.formation().tile(pos(0, 0)).unwrap().name(), "ARCHERS");
    assert_eq!(plan.formation().placed_count(), 2);
    assert_eq!(plan.roster().len(), 4);

    let query = PlanQuery::encode(&plan, &registry);
    assert_eq!(query.units, "2,5,3;0,1,1");
}
