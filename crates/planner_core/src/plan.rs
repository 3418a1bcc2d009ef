//! The roster/formation pair and the operations that move units between them.
//!
//! Every operation validates before it mutates, so a failed call leaves
//! the state untouched. A unit is always in exactly one place.

use std::collections::HashSet;

use serde::Serialize;

use crate::capacity::{self, CapacityCheck, CapacityLimits};
use crate::error::{PlannerError, Result};
use crate::formation::{Formation, GridPos, DEFAULT_FORMATION_ID};
use crate::roster::Roster;
use crate::unit::{is_valid_level, Unit, UnitId};

/// Complete plan: unplaced units plus the formation grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlanState {
    roster: Roster,
    formation: Formation,
}

impl PlanState {
    /// Empty roster and an empty formation called `formation_name`.
    #[must_use]
    pub fn new(formation_name: impl Into<String>) -> Self {
        Self {
            roster: Roster::new(),
            formation: Formation::new(DEFAULT_FORMATION_ID, formation_name),
        }
    }

    /// Assemble a plan from existing parts.
    #[must_use]
    pub fn from_parts(roster: Roster, formation: Formation) -> Self {
        Self { roster, formation }
    }

    /// Split into roster and formation.
    #[must_use]
    pub fn into_parts(self) -> (Roster, Formation) {
        (self.roster, self.formation)
    }

    /// Unplaced units.
    #[must_use]
    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    /// The formation grid.
    #[must_use]
    pub fn formation(&self) -> &Formation {
        &self.formation
    }

    /// Units in roster and formation together.
    #[must_use]
    pub fn total_unit_count(&self) -> usize {
        capacity::total_unit_count(&self.roster, &self.formation)
    }

    /// Units sharing the normalised `name` and `level` anywhere in the plan.
    #[must_use]
    pub fn pair_count(&self, name: &str, level: u8) -> usize {
        capacity::pair_count(&self.roster, &self.formation, name, level)
    }

    /// Check whether `requested` units of `name` at `level` fit.
    #[must_use]
    pub fn check_batch(&self, name: &str, level: u8, requested: usize, limits: CapacityLimits) -> CapacityCheck {
        capacity::check_batch(&self.roster, &self.formation, name, level, requested, limits)
    }

    /// Check a multi-level batch of one unit.
    #[must_use]
    pub fn check_level_batches(&self, name: &str, levels: &[(u8, usize)], limits: CapacityLimits) -> CapacityCheck {
        capacity::check_level_batches(&self.roster, &self.formation, name, levels, limits)
    }

    /// Add units to the roster. Callers check capacity first.
    pub fn add_to_roster(&mut self, units: impl IntoIterator<Item = Unit>) {
        self.roster.extend(units);
    }

    /// Delete a unit from the roster.
    ///
    /// # Errors
    ///
    /// Returns [`PlannerError::UnitNotFound`] if the roster has no such unit.
    pub fn remove_from_roster(&mut self, id: &UnitId) -> Result<Unit> {
        self.roster
            .remove(id)
            .ok_or_else(|| PlannerError::UnitNotFound(id.clone()))
    }

    /// Delete every roster unit; placed units are kept.
    pub fn clear_roster(&mut self) -> usize {
        self.roster.clear().len()
    }

    /// Rename the formation.
    pub fn rename_formation(&mut self, name: impl Into<String>) {
        self.formation.set_name(name);
    }

    /// Move a roster unit onto `pos`.
    ///
    /// An occupant of `pos` goes back to the roster.
    ///
    /// # Errors
    ///
    /// Returns [`PlannerError::UnitNotFound`] if `id` is not in the roster.
    pub fn place(&mut self, id: &UnitId, pos: GridPos) -> Result<()> {
        let unit = self.remove_from_roster(id)?;
        if let Some(bumped) = self.formation.set_tile(pos, Some(unit)) {
            self.roster.add(bumped);
        }
        Ok(())
    }

    /// Put a freshly created unit straight onto the grid. Any occupant
    /// goes to the roster. Callers check capacity first.
    pub(crate) fn place_new(&mut self, pos: GridPos, unit: Unit) {
        if let Some(bumped) = self.formation.set_tile(pos, Some(unit)) {
            self.roster.add(bumped);
        }
    }

    /// Return the unit at `pos` to the roster. Returns whether a unit moved.
    pub fn remove(&mut self, pos: GridPos) -> bool {
        if self.formation.tile(pos).is_none() {
            return false;
        }
        let Some(unit) = self.formation.set_tile(pos, None) else {
            return false;
        };
        self.roster.add(unit);
        true
    }

    /// Exchange two cells; either or both may be empty.
    pub fn swap(&mut self, a: GridPos, b: GridPos) {
        if a != b {
            self.formation.swap_tiles(a, b);
        }
    }

    /// Return every placed unit to the roster. Returns how many moved.
    pub fn withdraw_all(&mut self) -> usize {
        let units = self.formation.take_all();
        let moved = units.len();
        self.roster.extend(units);
        moved
    }

    /// Change the level of the placed unit `id` at `pos`.
    ///
    /// # Errors
    ///
    /// - [`PlannerError::InvalidLevel`] for a level outside 1..=10
    /// - [`PlannerError::UnitNotFound`] if `id` is not at `pos`
    /// - [`PlannerError::ValidationRejected`] if the new level is full
    pub fn set_placed_level(&mut self, pos: GridPos, id: &UnitId, level: u8, limits: CapacityLimits) -> Result<bool> {
        if !is_valid_level(level) {
            return Err(PlannerError::InvalidLevel(level));
        }
        let unit = self
            .formation
            .tile(pos)
            .filter(|unit| unit.id() == id)
            .ok_or_else(|| PlannerError::UnitNotFound(id.clone()))?;
        if unit.level() == level {
            return Ok(false);
        }
        let check = capacity::check_relevel(&self.roster, &self.formation, unit.name(), level, limits);
        if !check.allowed {
            return Err(PlannerError::ValidationRejected(check));
        }
        self.formation
            .modify_tile(pos, |unit| unit.set_level(level))
            .transpose()?;
        Ok(true)
    }

    /// Verify the plan's structural invariants.
    ///
    /// # Errors
    ///
    /// Returns [`PlannerError::InvalidState`] naming the first violation.
    pub fn check_invariants(&self, limits: CapacityLimits) -> Result<()> {
        if self.formation.power() != self.formation.calculate_power() {
            return Err(PlannerError::InvalidState(format!(
                "formation power {} does not match recomputed {}",
                self.formation.power(),
                self.formation.calculate_power()
            )));
        }

        let mut seen = HashSet::new();
        let placed = self.formation.occupied().map(|(_, unit)| unit);
        for unit in self.roster.iter().chain(placed) {
            if !seen.insert(unit.id()) {
                return Err(PlannerError::InvalidState(format!("unit {} appears twice", unit.id())));
            }
            if !unit.has_consistent_power() {
                return Err(PlannerError::InvalidState(format!("unit {} has stale power", unit.id())));
            }
            if self.pair_count(unit.name(), unit.level()) > limits.max_units_per_level {
                return Err(PlannerError::InvalidState(format!(
                    "{} level {} exceeds {} units",
                    unit.name(),
                    unit.level(),
                    limits.max_units_per_level
                )));
            }
        }

        if self.total_unit_count() > limits.max_total_units {
            return Err(PlannerError::InvalidState(format!(
                "{} units exceed the total cap of {}",
                self.total_unit_count(),
                limits.max_total_units
            )));
        }
        Ok(())
    }
}
