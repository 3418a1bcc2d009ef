//! Proptest strategies for planner property tests.
//!
//! Unit ids only exist at run time, so operations are generated as
//! [`PlanOp`] values that refer to roster units by slot and are turned
//! into concrete [`Action`]s against the current plan.

use proptest::prelude::*;

use planner_core::actions::Action;
use planner_core::config::PlannerConfig;
use planner_core::formation::{GridPos, GRID_SIZE};
use planner_core::plan::PlanState;
use planner_core::unit::{MAX_UNIT_LEVEL, MIN_UNIT_LEVEL};

use crate::fixtures::{PlanBuilder, FIXTURE_UNIT_NAMES};

/// A fixture catalog name.
pub fn arb_unit_name() -> impl Strategy<Value = &'static str> {
    proptest::sample::select(FIXTURE_UNIT_NAMES.to_vec())
}

/// A valid unit level.
pub fn arb_level() -> impl Strategy<Value = u8> {
    MIN_UNIT_LEVEL..=MAX_UNIT_LEVEL
}

/// An in-range `(row, col)`.
pub fn arb_cell() -> impl Strategy<Value = (usize, usize)> {
    (0..GRID_SIZE, 0..GRID_SIZE)
}

/// Names with optional trailing numeric labels and stray whitespace.
pub fn arb_raw_unit_name() -> impl Strategy<Value = String> {
    prop_oneof![
        "[A-Za-z]{0,8}( [A-Za-z]{1,8})?( [0-9]{1,3}){0,3}[ \t]{0,2}",
        "[ 0-9]{0,8}",
        any::<String>(),
    ]
}

/// Formation names mixing in characters that are reserved in URLs.
pub fn arb_formation_name() -> impl Strategy<Value = String> {
    r#"[A-Za-zéß][A-Za-z0-9éß &#?=+%/:,_<>"{}`']{0,15}"#.prop_map(|name| name.trim().to_string())
}

/// An abstract plan operation.
#[derive(Debug, Clone)]
pub enum PlanOp {
    /// Add units to the roster.
    Add {
        /// Fixture unit name.
        name: &'static str,
        /// Level.
        level: u8,
        /// Batch size.
        count: usize,
    },
    /// Place the roster unit at `slot` (modulo roster size).
    Place {
        /// Roster slot.
        slot: usize,
        /// Target cell.
        cell: (usize, usize),
    },
    /// Return a cell's unit to the roster.
    Remove {
        /// Cell.
        cell: (usize, usize),
    },
    /// Exchange two cells.
    Swap {
        /// First cell.
        from: (usize, usize),
        /// Second cell.
        to: (usize, usize),
    },
    /// Return every placed unit.
    WithdrawAll,
    /// Re-level whatever occupies a cell.
    Relevel {
        /// Cell.
        cell: (usize, usize),
        /// New level.
        level: u8,
    },
    /// Delete the roster unit at `slot`.
    RemoveFromRoster {
        /// Roster slot.
        slot: usize,
    },
}

impl PlanOp {
    /// Turn the operation into an action against `plan`. Returns `None`
    /// when the operation needs a unit that is not there.
    #[must_use]
    pub fn to_action(&self, plan: &PlanState) -> Option<Action> {
        let roster_unit = |slot: usize| {
            let len = plan.roster().len();
            (len > 0).then(|| plan.roster().as_slice()[slot % len].id().clone())
        };
        match *self {
            Self::Add { name, level, count } => Some(Action::AddUnits {
                name: name.to_string(),
                level,
                count,
                fallback_rarity: None,
            }),
            Self::Place { slot, cell } => Some(Action::PlaceUnit {
                row: cell.0,
                col: cell.1,
                unit_id: roster_unit(slot)?,
            }),
            Self::Remove { cell } => Some(Action::RemoveFromFormation { row: cell.0, col: cell.1 }),
            Self::Swap { from, to } => Some(Action::SwapUnits { from, to }),
            Self::WithdrawAll => Some(Action::WithdrawAll),
            Self::Relevel { cell, level } => {
                let pos = GridPos::new(cell.0, cell.1).ok()?;
                let unit = plan.formation().tile(pos)?;
                Some(Action::SetPlacedUnitLevel {
                    row: cell.0,
                    col: cell.1,
                    unit_id: unit.id().clone(),
                    level,
                })
            }
            Self::RemoveFromRoster { slot } => Some(Action::RemoveUnitFromRoster(roster_unit(slot)?)),
        }
    }

    /// Whether the operation only moves units between roster and grid.
    #[must_use]
    pub const fn is_transfer(&self) -> bool {
        matches!(
            self,
            Self::Place { .. } | Self::Remove { .. } | Self::Swap { .. } | Self::WithdrawAll
        )
    }
}

/// An add operation, sometimes large enough to hit the caps.
pub fn arb_add_op() -> impl Strategy<Value = PlanOp> {
    (arb_unit_name(), arb_level(), prop_oneof![0usize..10, 10usize..120])
        .prop_map(|(name, level, count)| PlanOp::Add { name, level, count })
}

/// A roster/grid transfer operation.
pub fn arb_transfer_op() -> impl Strategy<Value = PlanOp> {
    prop_oneof![
        (any::<usize>(), arb_cell()).prop_map(|(slot, cell)| PlanOp::Place { slot, cell }),
        arb_cell().prop_map(|cell| PlanOp::Remove { cell }),
        (arb_cell(), arb_cell()).prop_map(|(from, to)| PlanOp::Swap { from, to }),
        Just(PlanOp::WithdrawAll),
    ]
}

/// Any plan operation.
pub fn arb_plan_op() -> impl Strategy<Value = PlanOp> {
    prop_oneof![
        3 => arb_add_op(),
        4 => arb_transfer_op(),
        1 => (arb_cell(), arb_level()).prop_map(|(cell, level)| PlanOp::Relevel { cell, level }),
        1 => any::<usize>().prop_map(|slot| PlanOp::RemoveFromRoster { slot }),
    ]
}

/// A sequence of plan operations.
pub fn arb_op_sequence(max_len: usize) -> impl Strategy<Value = Vec<PlanOp>> {
    proptest::collection::vec(arb_plan_op(), 0..max_len)
}

/// A plan within the default caps, with a random grid and roster.
pub fn arb_plan() -> impl Strategy<Value = PlanState> {
    let cell = proptest::option::weighted(0.3, (arb_unit_name(), arb_level()));
    let grid = proptest::collection::vec(cell, GRID_SIZE * GRID_SIZE);
    let roster = proptest::collection::vec((arb_unit_name(), arb_level(), 0usize..6), 0..8);
    let name = "[A-Za-z][A-Za-z0-9 ]{0,15}";

    (name, grid, roster)
        .prop_map(|(name, grid, roster)| {
            let mut builder = PlanBuilder::new().name(name.trim());
            for (index, cell) in grid.into_iter().enumerate() {
                if let Some((unit, level)) = cell {
                    builder = builder.place(index / GRID_SIZE, index % GRID_SIZE, unit, level);
                }
            }
            for (unit, level, count) in roster {
                builder = builder.roster(unit, level, count);
            }
            builder.build()
        })
        .prop_filter("plan within caps", |plan| {
            plan.check_invariants(PlannerConfig::default().limits()).is_ok()
        })
}
