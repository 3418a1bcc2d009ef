//! Property tests for the roster/formation invariants.

use std::time::Instant;

use planner_core::codec::split_query;
use planner_core::prelude::*;
use planner_test_utils::fixtures::{encode_fixture_plan, fixture_registry, grid_signature, roster_signature};
use planner_test_utils::proptest::prelude::*;
use planner_test_utils::strategies::{
    arb_formation_name, arb_op_sequence, arb_plan, arb_raw_unit_name, arb_transfer_op, PlanOp,
};

fn tight_config(policy: PartialBatchPolicy) -> PlannerConfig {
    PlannerConfig {
        max_total_units: 120,
        max_units_per_level: 20,
        partial_batch_policy: policy,
        ..PlannerConfig::default()
    }
}

fn arb_policy() -> impl Strategy<Value = PartialBatchPolicy> {
    prop_oneof![Just(PartialBatchPolicy::RejectAll), Just(PartialBatchPolicy::AdmitFittable)]
}

/// Apply `ops` in order, calling `check` with the plan before and after
/// every dispatch that produced an action.
fn run_ops(
    store: &mut PlannerStore,
    ops: &[PlanOp],
    mut check: impl FnMut(&PlanOp, &PlanState, &PlanState, &Result<Outcome>),
) {
    let now = Instant::now();
    for op in ops {
        let Some(action) = op.to_action(store.state()) else {
            continue;
        };
        let before = store.state().clone();
        let result = store.dispatch(&action, now);
        check(op, &before, store.state(), &result);
    }
}

fn independent_power(plan: &PlanState) -> u32 {
    plan.formation()
        .occupied()
        .map(|(_, unit)| calculate_unit_power(unit.rarity(), unit.level()))
        .sum()
}

proptest! {
    #[test]
    fn prop_caps_hold_after_every_action(ops in arb_op_sequence(60), policy in arb_policy()) {
        let config = tight_config(policy);
        let limits = config.limits();
        let mut store = PlannerStore::new(fixture_registry(), config, 1).unwrap();

        run_ops(&mut store, &ops, |_, _, after, _| {
            assert!(after.total_unit_count() <= limits.max_total_units);
            for name in planner_test_utils::fixtures::FIXTURE_UNIT_NAMES {
                for level in MIN_UNIT_LEVEL..=MAX_UNIT_LEVEL {
                    assert!(after.pair_count(name, level) <= limits.max_units_per_level);
                }
            }
            assert!(after.check_invariants(limits).is_ok());
        });
    }

    #[test]
    fn prop_default_total_cap_holds(counts in proptest::collection::vec((0usize..5, 1u8..=10, 1usize..60), 0..40)) {
        let mut store = PlannerStore::new(fixture_registry(), PlannerConfig::default(), 2).unwrap();
        let now = Instant::now();
        for (name, level, count) in counts {
            let action = Action::AddUnits {
                name: planner_test_utils::fixtures::FIXTURE_UNIT_NAMES[name].to_string(),
                level,
                count,
                fallback_rarity: None,
            };
            let _ = store.dispatch(&action, now);
            prop_assert!(store.state().total_unit_count() <= 1000);
            prop_assert!(store.state().pair_count("Archers", level) <= 49);
        }
    }

    #[test]
    fn prop_failed_action_changes_nothing(ops in arb_op_sequence(40)) {
        let mut store = PlannerStore::new(fixture_registry(), tight_config(PartialBatchPolicy::RejectAll), 3).unwrap();
        run_ops(&mut store, &ops, |_, before, after, result| {
            if result.is_err() {
                assert_eq!(before, after);
            }
        });
    }

    #[test]
    fn prop_transfers_conserve_units(
        setup in arb_op_sequence(30),
        transfers in proptest::collection::vec(arb_transfer_op(), 1..30),
    ) {
        let mut store = PlannerStore::new(fixture_registry(), PlannerConfig::default(), 4).unwrap();
        run_ops(&mut store, &setup, |_, _, _, _| {});

        run_ops(&mut store, &transfers, |op, before, after, _| {
            assert!(op.is_transfer());
            assert_eq!(before.total_unit_count(), after.total_unit_count());
            let mut all_before = roster_signature(before.roster());
            let mut all_after = roster_signature(after.roster());
            for (_, unit) in before.formation().occupied() {
                *all_before.entry((unit.name().to_string(), unit.level())).or_insert(0) += 1;
            }
            for (_, unit) in after.formation().occupied() {
                *all_after.entry((unit.name().to_string(), unit.level())).or_insert(0) += 1;
            }
            assert_eq!(all_before, all_after);
        });
    }

    #[test]
    fn prop_power_matches_occupied_cells(ops in arb_op_sequence(60)) {
        let mut store = PlannerStore::new(fixture_registry(), PlannerConfig::default(), 5).unwrap();
        run_ops(&mut store, &ops, |_, _, after, _| {
            assert_eq!(after.formation().power(), independent_power(after));
            assert_eq!(after.formation().power(), after.formation().calculate_power());
        });
    }

    #[test]
    fn prop_undo_all_restores_empty_plan(ops in arb_op_sequence(30)) {
        let config = PlannerConfig {
            history_limit: 64,
            ..PlannerConfig::default()
        };
        let mut store = PlannerStore::new(fixture_registry(), config, 6).unwrap();
        let initial = store.state().clone();
        run_ops(&mut store, &ops, |_, _, _, _| {});

        let now = Instant::now();
        while store.can_undo() {
            store.undo(now).unwrap();
        }
        prop_assert_eq!(store.state(), &initial);
    }

    #[test]
    fn prop_share_link_round_trip(plan in arb_plan()) {
        let registry = fixture_registry();
        let query = encode_fixture_plan(&plan);
        let decoded = decode_plan(
            Some(&query.formation),
            Some(&query.units),
            &registry,
            &mut IdGenerator::new(99),
            &PlannerConfig::default(),
        );

        prop_assert!(decoded.is_clean(), "skipped: {:?}", decoded.skipped);
        prop_assert_eq!(decoded.value.formation().name(), plan.formation().name());
        prop_assert_eq!(grid_signature(&decoded.value), grid_signature(&plan));
        prop_assert_eq!(roster_signature(decoded.value.roster()), roster_signature(plan.roster()));
        prop_assert_eq!(decoded.value.formation().power(), plan.formation().power());
        prop_assert_eq!(PlanQuery::encode(&decoded.value, &registry), query);
    }

    #[test]
    fn prop_query_string_round_trip(plan in arb_plan(), name in arb_formation_name()) {
        let registry = fixture_registry();
        let mut plan = plan;
        plan.rename_formation(name.as_str());
        let link = format!("https://planner.example/?{}#grid", encode_fixture_plan(&plan).to_query_string());

        let (formation, units) = split_query(&link);
        let decoded = decode_plan(
            formation.as_deref(),
            units.as_deref(),
            &registry,
            &mut IdGenerator::new(100),
            &PlannerConfig::default(),
        );

        prop_assert!(decoded.is_clean(), "skipped: {:?}", decoded.skipped);
        prop_assert_eq!(decoded.value.formation().name(), name.as_str());
        prop_assert_eq!(grid_signature(&decoded.value), grid_signature(&plan));
        prop_assert_eq!(roster_signature(decoded.value.roster()), roster_signature(plan.roster()));
    }

    #[test]
    fn prop_normalize_idempotent(name in arb_raw_unit_name()) {
        let once = normalize_unit_name(&name);
        prop_assert_eq!(normalize_unit_name(&once), once.clone());
        prop_assert_eq!(once.trim(), once.as_str());
    }
}
