//! Units owned but not placed.

use serde::Serialize;

use crate::registry::normalize_unit_name;
use crate::unit::{Unit, UnitId};

/// Unordered collection of unplaced units.
///
/// Insertion order is kept only so that views are stable; it carries no
/// meaning.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Roster {
    units: Vec<Unit>,
}

impl Roster {
    /// Create an empty roster.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a unit.
    pub fn add(&mut self, unit: Unit) {
        self.units.push(unit);
    }

    /// Remove a unit by id.
    pub fn remove(&mut self, id: &UnitId) -> Option<Unit> {
        let index = self.units.iter().position(|u| u.id() == id)?;
        Some(self.units.remove(index))
    }

    /// Look up a unit by id.
    #[must_use]
    pub fn get(&self, id: &UnitId) -> Option<&Unit> {
        self.units.iter().find(|u| u.id() == id)
    }

    /// Whether a unit with `id` is present.
    #[must_use]
    pub fn contains(&self, id: &UnitId) -> bool {
        self.get(id).is_some()
    }

    /// All units.
    pub fn iter(&self) -> impl Iterator<Item = &Unit> {
        self.units.iter()
    }

    /// Units as a slice.
    #[must_use]
    pub fn as_slice(&self) -> &[Unit] {
        &self.units
    }

    /// Number of units.
    #[must_use]
    pub fn len(&self) -> usize {
        self.units.len()
    }

    /// Whether the roster is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Remove every unit.
    pub fn clear(&mut self) -> Vec<Unit> {
        std::mem::take(&mut self.units)
    }

    /// Ids of units sharing the normalised `name` and `level`, oldest first.
    #[must_use]
    pub fn matching_ids(&self, name: &str, level: u8) -> Vec<UnitId> {
        let name = normalize_unit_name(name);
        self.units
            .iter()
            .filter(|u| u.level() == level && normalize_unit_name(u.name()) == name)
            .map(|u| u.id().clone())
            .collect()
    }
}

impl FromIterator<Unit> for Roster {
    fn from_iter<I: IntoIterator<Item = Unit>>(iter: I) -> Self {
        Self {
            units: iter.into_iter().collect(),
        }
    }
}

impl Extend<Unit> for Roster {
    fn extend<I: IntoIterator<Item = Unit>>(&mut self, iter: I) {
        self.units.extend(iter);
    }
}
