//! Read-side views over the roster: search, multi-key sort and the
//! grouped "manage units" table.

use std::cmp::Ordering;
use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::roster::Roster;
use crate::unit::{Rarity, Unit};

/// A roster sort key. Each key has a fixed direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SortKey {
    /// Highest level first.
    Level,
    /// Highest rarity first.
    Rarity,
    /// Alphabetical.
    Name,
}

impl SortKey {
    /// Compare two units under this key.
    #[must_use]
    pub fn compare(self, a: &Unit, b: &Unit) -> Ordering {
        match self {
            Self::Level => b.level().cmp(&a.level()),
            Self::Rarity => b.rarity().cmp(&a.rarity()),
            Self::Name => compare_names(a.name(), b.name()),
        }
    }
}

/// Up to three sort keys, applied in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterSort {
    primary: SortKey,
    secondary: Option<SortKey>,
    tertiary: Option<SortKey>,
}

impl Default for RosterSort {
    fn default() -> Self {
        Self {
            primary: SortKey::Level,
            secondary: Some(SortKey::Rarity),
            tertiary: Some(SortKey::Name),
        }
    }
}

impl RosterSort {
    /// Build a sort. A later key repeating an earlier one is dropped.
    #[must_use]
    pub fn new(primary: SortKey, secondary: Option<SortKey>, tertiary: Option<SortKey>) -> Self {
        let secondary = secondary.filter(|key| *key != primary);
        let tertiary = tertiary.filter(|key| *key != primary && Some(*key) != secondary);
        Self {
            primary,
            secondary,
            tertiary,
        }
    }

    /// Keys in application order.
    pub fn keys(&self) -> impl Iterator<Item = SortKey> {
        std::iter::once(self.primary).chain(self.secondary).chain(self.tertiary)
    }

    /// Compare two units under all keys.
    #[must_use]
    pub fn compare(&self, a: &Unit, b: &Unit) -> Ordering {
        self.keys()
            .map(|key| key.compare(a, b))
            .find(|ordering| ordering.is_ne())
            .unwrap_or(Ordering::Equal)
    }
}

/// Units whose name or rarity contains `term`, ignoring case. A blank
/// term matches everything.
pub fn filter_units<'a>(units: impl IntoIterator<Item = &'a Unit>, term: &str) -> Vec<&'a Unit> {
    let term = term.trim().to_lowercase();
    units
        .into_iter()
        .filter(|unit| {
            term.is_empty()
                || unit.name().to_lowercase().contains(&term)
                || unit.rarity().as_str().to_lowercase().contains(&term)
        })
        .collect()
}

/// The roster as shown in the side list: filtered by `term`, then sorted.
#[must_use]
pub fn visible_units<'a>(roster: &'a Roster, term: &str, sort: &RosterSort) -> Vec<&'a Unit> {
    let mut units = filter_units(roster.iter(), term);
    units.sort_by(|a, b| sort.compare(a, b));
    units
}

/// One row of the grouped roster table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnitGroup {
    /// Unit name.
    pub name: String,
    /// Shared level.
    pub level: u8,
    /// Rarity of the group.
    pub rarity: Rarity,
    /// Units in the group.
    pub count: usize,
}

/// Range filters for the grouped table. `None` leaves a bound open.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupFilters {
    /// Case-insensitive name substring.
    pub name: Option<String>,
    /// Lowest level shown.
    pub level_min: Option<u8>,
    /// Highest level shown.
    pub level_max: Option<u8>,
    /// Lowest rarity shown.
    pub rarity_min: Option<Rarity>,
    /// Highest rarity shown.
    pub rarity_max: Option<Rarity>,
    /// Smallest group shown.
    pub count_min: Option<usize>,
    /// Largest group shown.
    pub count_max: Option<usize>,
}

impl GroupFilters {
    /// Whether `group` passes every filter.
    #[must_use]
    pub fn matches(&self, group: &UnitGroup) -> bool {
        let name_ok = self.name.as_deref().map_or(true, |needle| {
            needle.is_empty() || group.name.to_lowercase().contains(&needle.to_lowercase())
        });
        name_ok
            && self.level_min.map_or(true, |min| group.level >= min)
            && self.level_max.map_or(true, |max| group.level <= max)
            && self.rarity_min.map_or(true, |min| group.rarity >= min)
            && self.rarity_max.map_or(true, |max| group.rarity <= max)
            && self.count_min.map_or(true, |min| group.count >= min)
            && self.count_max.map_or(true, |max| group.count <= max)
    }
}

/// Sortable column of the grouped table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GroupColumn {
    /// Unit name.
    Name,
    /// Level.
    Level,
    /// Rarity.
    Rarity,
    /// Group size.
    Count,
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SortDirection {
    /// Smallest first.
    #[default]
    Asc,
    /// Largest first.
    Desc,
}

/// Column sort of the grouped table. No column means name ascending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GroupSort {
    /// Sorted column, if one was picked.
    pub column: Option<GroupColumn>,
    /// Direction for `column`.
    pub direction: SortDirection,
}

impl GroupSort {
    /// Header click: the same column flips direction, another column
    /// starts ascending.
    pub fn toggle(&mut self, column: GroupColumn) {
        if self.column == Some(column) {
            self.direction = match self.direction {
                SortDirection::Asc => SortDirection::Desc,
                SortDirection::Desc => SortDirection::Asc,
            };
        } else {
            self.column = Some(column);
            self.direction = SortDirection::Asc;
        }
    }

    fn compare(self, a: &UnitGroup, b: &UnitGroup) -> Ordering {
        let Some(column) = self.column else {
            return compare_names(&a.name, &b.name).then(a.level.cmp(&b.level));
        };
        let ordering = match column {
            GroupColumn::Name => compare_names(&a.name, &b.name),
            GroupColumn::Level => a.level.cmp(&b.level),
            GroupColumn::Rarity => a.rarity.cmp(&b.rarity),
            GroupColumn::Count => a.count.cmp(&b.count),
        };
        let ordering = match self.direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        };
        ordering
            .then_with(|| compare_names(&a.name, &b.name))
            .then(a.level.cmp(&b.level))
    }
}

/// Group the roster by (name, level), then filter and sort the rows.
#[must_use]
pub fn grouped_units(roster: &Roster, filters: &GroupFilters, sort: GroupSort) -> Vec<UnitGroup> {
    let mut index: HashMap<(&str, u8), usize> = HashMap::new();
    let mut groups: Vec<UnitGroup> = Vec::new();
    for unit in roster.iter() {
        match index.get(&(unit.name(), unit.level())) {
            Some(&slot) => groups[slot].count += 1,
            None => {
                index.insert((unit.name(), unit.level()), groups.len());
                groups.push(UnitGroup {
                    name: unit.name().to_string(),
                    level: unit.level(),
                    rarity: unit.rarity(),
                    count: 1,
                });
            }
        }
    }
    groups.retain(|group| filters.matches(group));
    groups.sort_by(|a, b| sort.compare(a, b));
    groups
}

fn compare_names(a: &str, b: &str) -> Ordering {
    a.to_lowercase().cmp(&b.to_lowercase()).then_with(|| a.cmp(b))
}
