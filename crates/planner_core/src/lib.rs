//! # Planner Core
//!
//! Pure planning logic for arranging units on a 7×7 formation grid.
//!
//! This crate contains **only** deterministic state logic:
//! - No rendering
//! - No IO (strings in, strings out)
//! - No system clock or randomness (time and id seeds are injected)
//!
//! This separation enables:
//! - Any UI layer driving the same reducers
//! - Shareable links that decode identically everywhere
//! - Property testing of the roster/formation invariants
//!
//! ## Crate Structure
//!
//! - [`registry`] - Unit catalog, name normalisation, role flags
//! - [`power`] - Rarity/level power table
//! - [`capacity`] - Total and per-level unit caps
//! - [`plan`] - Roster/formation pair and the transfer operations
//! - [`actions`] - Dispatchable actions and the pure reducer
//! - [`codec`] - Share-link serialisation
//! - [`query`] - Roster search, sort and grouped views
//! - [`store`] - State container tying reducer, history and URL sync together

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod actions;
pub mod capacity;
pub mod codec;
pub mod config;
pub mod error;
pub mod formation;
pub mod history;
pub mod ids;
pub mod plan;
pub mod power;
pub mod query;
pub mod registry;
pub mod roster;
pub mod store;
pub mod unit;
pub mod url_sync;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::actions::{reduce, Action, Outcome, ReduceContext};
    pub use crate::capacity::{CapacityCheck, CapacityLimits, CapacityReason};
    pub use crate::codec::{decode_plan, Decoded, PlanQuery, SkipReason, SkippedSegment};
    pub use crate::config::{PartialBatchPolicy, PlannerConfig};
    pub use crate::error::{PlannerError, Result};
    pub use crate::formation::{Formation, GridPos, GRID_CELLS, GRID_SIZE};
    pub use crate::ids::IdGenerator;
    pub use crate::plan::PlanState;
    pub use crate::power::{calculate_unit_power, format_power};
    pub use crate::query::{grouped_units, visible_units, GroupFilters, GroupSort, RosterSort, SortKey};
    pub use crate::registry::{normalize_unit_name, UnitData, UnitIndex, UnitRegistry, UnitRole};
    pub use crate::roster::Roster;
    pub use crate::store::PlannerStore;
    pub use crate::unit::{Rarity, Unit, UnitId, MAX_UNIT_LEVEL, MIN_UNIT_LEVEL};
}
