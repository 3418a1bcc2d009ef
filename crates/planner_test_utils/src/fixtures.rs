//! Test fixtures and helpers.
//!
//! A five-unit catalog whose indices are independent of the built-in
//! game catalog, plus builders for plans in known states.

use std::collections::BTreeMap;

use planner_core::codec::PlanQuery;
use planner_core::config::PlannerConfig;
use planner_core::formation::GridPos;
use planner_core::ids::IdGenerator;
use planner_core::plan::PlanState;
use planner_core::registry::UnitRegistry;
use planner_core::roster::Roster;
use planner_core::store::PlannerStore;
use planner_core::unit::Unit;

/// The fixture catalog as RON.
pub const FIXTURE_CATALOG_RON: &str = r#"[
    (name: "Air Elemental", index: 0, rarity: Legendary, tags: ["mages"]),
    (name: "Archers", index: 2, rarity: Common, tags: ["human", "ranger"]),
    (name: "Infantry", index: 5, rarity: Rare, tags: ["human", "tank"]),
    (name: "Paladin", index: 27, rarity: Epic, tags: ["human", "tank", "support"]),
    (name: "Zealot", index: 28, rarity: Legendary, tags: ["undead", "trickster"]),
]"#;

/// Names in the fixture catalog.
pub const FIXTURE_UNIT_NAMES: [&str; 5] = ["Air Elemental", "Archers", "Infantry", "Paladin", "Zealot"];

/// Load the fixture catalog.
///
/// # Panics
///
/// Panics if [`FIXTURE_CATALOG_RON`] fails to parse.
#[must_use]
pub fn fixture_registry() -> UnitRegistry {
    UnitRegistry::from_ron_str(FIXTURE_CATALOG_RON).expect("fixture catalog parses")
}

/// A store over the fixture catalog with default config.
///
/// # Panics
///
/// Panics if the default config is rejected.
#[must_use]
pub fn fixture_store(session: u64) -> PlannerStore {
    PlannerStore::new(fixture_registry(), PlannerConfig::default(), session).expect("default config is valid")
}

/// Builds plans over the fixture catalog with deterministic ids.
///
/// ```
/// use planner_test_utils::fixtures::PlanBuilder;
///
/// let plan = PlanBuilder::new()
///     .roster("Archers", 1, 3)
///     .place(0, 0, "Paladin", 2)
///     .build();
/// assert_eq!(plan.total_unit_count(), 4);
/// ```
#[derive(Debug)]
pub struct PlanBuilder {
    registry: UnitRegistry,
    ids: IdGenerator,
    plan: PlanState,
}

impl Default for PlanBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl PlanBuilder {
    /// Start from an empty plan named "Formation 9".
    #[must_use]
    pub fn new() -> Self {
        Self {
            registry: fixture_registry(),
            ids: IdGenerator::new(0xf1),
            plan: PlanState::new(PlannerConfig::default().default_formation_name),
        }
    }

    /// Set the formation name.
    #[must_use]
    pub fn name(mut self, name: &str) -> Self {
        self.plan.rename_formation(name);
        self
    }

    /// Add `count` roster units.
    ///
    /// # Panics
    ///
    /// Panics if `name` is not in the fixture catalog or `level` is invalid.
    #[must_use]
    pub fn roster(mut self, name: &str, level: u8, count: usize) -> Self {
        let units: Vec<Unit> = (0..count).map(|_| self.unit(name, level)).collect();
        self.plan.add_to_roster(units);
        self
    }

    /// Place a new unit directly on the grid.
    ///
    /// # Panics
    ///
    /// Panics on an unknown name, invalid level or out-of-range cell.
    #[must_use]
    pub fn place(mut self, row: usize, col: usize, name: &str, level: u8) -> Self {
        let unit = self.unit(name, level);
        let id = unit.id().clone();
        self.plan.add_to_roster([unit]);
        let pos = GridPos::new(row, col).expect("cell in range");
        self.plan.place(&id, pos).expect("unit was just added");
        self
    }

    /// Finish the plan.
    #[must_use]
    pub fn build(self) -> PlanState {
        self.plan
    }

    fn unit(&mut self, name: &str, level: u8) -> Unit {
        let data = self
            .registry
            .get_unit_data_by_name(name)
            .unwrap_or_else(|| panic!("{name} is not in the fixture catalog"));
        Unit::new(self.ids.next_id("fixture"), data, level).expect("valid fixture level")
    }
}

/// Per-cell (name, level), row-major; `None` for empty cells.
#[must_use]
pub fn grid_signature(plan: &PlanState) -> Vec<Option<(String, u8)>> {
    plan.formation()
        .cells()
        .map(|(_, unit)| unit.map(|u| (u.name().to_string(), u.level())))
        .collect()
}

/// Roster multiset as (name, level) -> count.
#[must_use]
pub fn roster_signature(roster: &Roster) -> BTreeMap<(String, u8), usize> {
    let mut counts = BTreeMap::new();
    for unit in roster.iter() {
        *counts.entry((unit.name().to_string(), unit.level())).or_insert(0) += 1;
    }
    counts
}

/// Encode a plan over the fixture catalog.
#[must_use]
pub fn encode_fixture_plan(plan: &PlanState) -> PlanQuery {
    PlanQuery::encode(plan, &fixture_registry())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixture_registry_loads() {
        let registry = fixture_registry();
        assert_eq!(registry.len(), FIXTURE_UNIT_NAMES.len());
        for name in FIXTURE_UNIT_NAMES {
            assert!(registry.get_unit_data_by_name(name).is_some());
        }
    }

    #[test]
    fn test_builder_ids_unique() {
        let plan = PlanBuilder::new()
            .roster("Archers", 1, 5)
            .place(3, 3, "Zealot", 1)
            .build();
        assert!(plan.check_invariants(PlannerConfig::default().limits()).is_ok());
        assert_eq!(plan.formation().placed_count(), 1);
    }

    #[test]
    fn test_signatures() {
        let plan = PlanBuilder::new()
            .roster("Archers", 1, 2)
            .place(0, 1, "Paladin", 2)
            .build();
        let grid = grid_signature(&plan);
        assert_eq!(grid[1], Some(("Paladin".to_string(), 2)));
        assert_eq!(grid.iter().flatten().count(), 1);
        assert_eq!(roster_signature(plan.roster())[&("Archers".to_string(), 1)], 2);
    }
}
