//! Unit caps.
//!
//! Two hard limits apply across roster and formation together:
//! - the total number of units
//! - the number of units sharing a normalised (name, level) pair
//!
//! Counts are always recomputed from the roster and formation, never
//! cached. Checks are pure: they report how many units would fit and
//! leave the admit-all-or-nothing decision to the caller.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::formation::Formation;
use crate::registry::normalize_unit_name;
use crate::roster::Roster;

/// The two unit caps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapacityLimits {
    /// Cap on roster + formation units.
    pub max_total_units: usize,
    /// Cap on units sharing a (name, level) pair.
    pub max_units_per_level: usize,
}

impl Default for CapacityLimits {
    fn default() -> Self {
        Self {
            max_total_units: 1000,
            max_units_per_level: 49,
        }
    }
}

/// Why a check passed or failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CapacityReason {
    /// Everything requested fits.
    Ok,
    /// The total cap would be exceeded.
    TotalCapExceeded,
    /// The per-(name, level) cap would be exceeded.
    PerLevelCapExceeded,
}

/// Result of a capacity check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapacityCheck {
    /// Whether the full request fits.
    pub allowed: bool,
    /// How many of the requested units fit under both caps.
    pub max_admittable: usize,
    /// How many units were requested.
    pub requested: usize,
    /// Which cap decided the outcome.
    pub reason: CapacityReason,
    /// Value of the deciding cap (0 when `reason` is `Ok`).
    pub limit: usize,
    /// Free slots under the deciding cap.
    pub headroom: usize,
    /// Normalised unit name.
    pub name: String,
    /// Level concerned, if the check was for a single level.
    pub level: Option<u8>,
}

impl CapacityCheck {
    fn ok(name: String, level: Option<u8>, requested: usize) -> Self {
        Self {
            allowed: true,
            max_admittable: requested,
            requested,
            reason: CapacityReason::Ok,
            limit: 0,
            headroom: 0,
            name,
            level,
        }
    }

    /// Alert text for the user: the limit and how many more units fit.
    #[must_use]
    pub fn user_message(&self) -> String {
        let plural = |n: usize| if n == 1 { "" } else { "s" };
        match self.reason {
            CapacityReason::Ok => format!("{} unit{} can be added.", self.requested, plural(self.requested)),
            CapacityReason::TotalCapExceeded if self.headroom == 0 => format!(
                "Cannot add more units. Maximum total units (roster + formation) is {}.",
                self.limit
            ),
            CapacityReason::TotalCapExceeded => format!(
                "Cannot add {} units. Maximum total units (roster + formation) is {}. You can add {} more unit{}.",
                self.requested,
                self.limit,
                self.headroom,
                plural(self.headroom)
            ),
            CapacityReason::PerLevelCapExceeded => format!(
                "Cannot add {} units. Maximum count for {} level {} is {}. You can add {} more unit{}.",
                self.requested,
                self.name,
                self.level.map_or_else(|| "?".to_string(), |l| l.to_string()),
                self.limit,
                self.headroom,
                plural(self.headroom)
            ),
        }
    }
}

impl fmt::Display for CapacityCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.user_message())
    }
}

/// Units in roster and formation together.
#[must_use]
pub fn total_unit_count(roster: &Roster, formation: &Formation) -> usize {
    roster.len() + formation.placed_count()
}

/// Units in roster and formation sharing the normalised `name` and `level`.
#[must_use]
pub fn pair_count(roster: &Roster, formation: &Formation, name: &str, level: u8) -> usize {
    let name = normalize_unit_name(name);
    let matches = |unit: &&crate::unit::Unit| unit.level() == level && normalize_unit_name(unit.name()) == name;
    roster.iter().filter(matches).count() + formation.occupied().map(|(_, u)| u).filter(matches).count()
}

/// Check whether `requested` new units of `name` at `level` fit.
///
/// The total cap is evaluated first.
#[must_use]
pub fn check_batch(
    roster: &Roster,
    formation: &Formation,
    name: &str,
    level: u8,
    requested: usize,
    limits: CapacityLimits,
) -> CapacityCheck {
    let name = normalize_unit_name(name);
    let total_headroom = limits
        .max_total_units
        .saturating_sub(total_unit_count(roster, formation));
    let level_headroom = limits
        .max_units_per_level
        .saturating_sub(pair_count(roster, formation, &name, level));
    let max_admittable = requested.min(total_headroom).min(level_headroom);

    if requested > total_headroom {
        return CapacityCheck {
            allowed: false,
            max_admittable,
            requested,
            reason: CapacityReason::TotalCapExceeded,
            limit: limits.max_total_units,
            headroom: total_headroom,
            name,
            level: Some(level),
        };
    }
    if requested > level_headroom {
        return CapacityCheck {
            allowed: false,
            max_admittable,
            requested,
            reason: CapacityReason::PerLevelCapExceeded,
            limit: limits.max_units_per_level,
            headroom: level_headroom,
            name,
            level: Some(level),
        };
    }
    CapacityCheck::ok(name, Some(level), requested)
}

/// Check a batch spanning several levels of one unit.
///
/// The summed request is checked against the total cap first, then each
/// level against the per-level cap; the first failure is returned.
/// Repeated levels are merged.
#[must_use]
pub fn check_level_batches(
    roster: &Roster,
    formation: &Formation,
    name: &str,
    levels: &[(u8, usize)],
    limits: CapacityLimits,
) -> CapacityCheck {
    let name = normalize_unit_name(name);
    let mut merged: BTreeMap<u8, usize> = BTreeMap::new();
    for &(level, count) in levels {
        *merged.entry(level).or_default() += count;
    }
    let requested: usize = merged.values().sum();

    let total_headroom = limits
        .max_total_units
        .saturating_sub(total_unit_count(roster, formation));
    let per_level_fit: usize = merged
        .iter()
        .map(|(&level, &count)| {
            let headroom = limits
                .max_units_per_level
                .saturating_sub(pair_count(roster, formation, &name, level));
            count.min(headroom)
        })
        .sum();

    if requested > total_headroom {
        return CapacityCheck {
            allowed: false,
            max_admittable: per_level_fit.min(total_headroom),
            requested,
            reason: CapacityReason::TotalCapExceeded,
            limit: limits.max_total_units,
            headroom: total_headroom,
            name,
            level: None,
        };
    }

    for (&level, &count) in &merged {
        let check = check_batch(roster, formation, &name, level, count, limits);
        if !check.allowed {
            return CapacityCheck {
                max_admittable: per_level_fit,
                ..check
            };
        }
    }

    CapacityCheck::ok(name, None, requested)
}

/// Check whether one existing unit can move to `new_level` without
/// breaking the per-level cap. The total is unaffected by a level change.
#[must_use]
pub fn check_relevel(
    roster: &Roster,
    formation: &Formation,
    name: &str,
    new_level: u8,
    limits: CapacityLimits,
) -> CapacityCheck {
    let name = normalize_unit_name(name);
    let headroom = limits
        .max_units_per_level
        .saturating_sub(pair_count(roster, formation, &name, new_level));
    if headroom == 0 {
        return CapacityCheck {
            allowed: false,
            max_admittable: 0,
            requested: 1,
            reason: CapacityReason::PerLevelCapExceeded,
            limit: limits.max_units_per_level,
            headroom,
            name,
            level: Some(new_level),
        };
    }
    CapacityCheck::ok(name, Some(new_level), 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formation::GridPos;
    use crate::unit::{Rarity, Unit, UnitId};

    fn units(name: &str, level: u8, count: usize, prefix: &str) -> Vec<Unit> {
        (0..count)
            .map(|i| {
                Unit::with_rarity(UnitId::new(format!("{prefix}{i}")), name, Rarity::Common, level).unwrap()
            })
            .collect()
    }

    #[test]
    fn test_empty_roster_fifty_archers_hits_per_level_cap() {
        let check = check_batch(
            &Roster::new(),
            &Formation::new("1", "F"),
            "Archers",
            1,
            50,
            CapacityLimits::default(),
        );
        assert!(!check.allowed);
        assert_eq!(check.max_admittable, 49);
        assert_eq!(check.reason, CapacityReason::PerLevelCapExceeded);
        assert_eq!(check.requested, 50);
    }

    #[test]
    fn test_batch_within_limits() {
        let roster: Roster = units("Archers", 1, 10, "a").into_iter().collect();
        let check = check_batch(&roster, &Formation::new("1", "F"), "Archers", 1, 39, CapacityLimits::default());
        assert!(check.allowed);
        assert_eq!(check.max_admittable, 39);
        assert_eq!(check.reason, CapacityReason::Ok);
    }

    #[test]
    fn test_formation_units_count_towards_caps() {
        let mut formation = Formation::new("1", "F");
        for (i, unit) in units("Archers 2", 1, 5, "f").into_iter().enumerate() {
            formation.set_tile(GridPos::new(0, i).unwrap(), Some(unit));
        }
        let roster: Roster = units("Archers", 1, 40, "r").into_iter().collect();

        assert_eq!(pair_count(&roster, &formation, "Archers", 1), 45);
        assert_eq!(total_unit_count(&roster, &formation), 45);

        let check = check_batch(&roster, &formation, "Archers", 1, 5, CapacityLimits::default());
        assert!(!check.allowed);
        assert_eq!(check.max_admittable, 4);
        assert_eq!(check.headroom, 4);
    }

    #[test]
    fn test_total_cap_checked_first() {
        let limits = CapacityLimits {
            max_total_units: 10,
            max_units_per_level: 5,
        };
        let roster: Roster = units("Guard", 1, 10, "g").into_iter().collect();
        let check = check_batch(&roster, &Formation::new("1", "F"), "Mage", 1, 20, limits);
        assert!(!check.allowed);
        assert_eq!(check.reason, CapacityReason::TotalCapExceeded);
        assert_eq!(check.max_admittable, 0);
        assert_eq!(
            check.user_message(),
            "Cannot add more units. Maximum total units (roster + formation) is 10."
        );
    }

    #[test]
    fn test_partial_total_headroom_reported() {
        let limits = CapacityLimits {
            max_total_units: 12,
            max_units_per_level: 49,
        };
        let roster: Roster = units("Guard", 1, 10, "g").into_iter().collect();
        let check = check_batch(&roster, &Formation::new("1", "F"), "Mage", 1, 5, limits);
        assert_eq!(check.reason, CapacityReason::TotalCapExceeded);
        assert_eq!(check.max_admittable, 2);
        assert_eq!(
            check.user_message(),
            "Cannot add 5 units. Maximum total units (roster + formation) is 12. You can add 2 more units."
        );
    }

    #[test]
    fn test_per_level_message() {
        let roster: Roster = units("Mage", 3, 48, "m").into_iter().collect();
        let check = check_batch(&roster, &Formation::new("1", "F"), "Mage", 3, 4, CapacityLimits::default());
        assert_eq!(
            check.user_message(),
            "Cannot add 4 units. Maximum count for Mage level 3 is 49. You can add 1 more unit."
        );
    }

    #[test]
    fn test_level_batches() {
        let roster: Roster = units("Mage", 2, 45, "m").into_iter().collect();
        let formation = Formation::new("1", "F");
        let limits = CapacityLimits::default();

        let ok = check_level_batches(&roster, &formation, "Mage", &[(1, 10), (2, 4)], limits);
        assert!(ok.allowed);
        assert_eq!(ok.requested, 14);

        let rejected = check_level_batches(&roster, &formation, "Mage", &[(1, 10), (2, 3), (2, 3)], limits);
        assert!(!rejected.allowed);
        assert_eq!(rejected.reason, CapacityReason::PerLevelCapExceeded);
        assert_eq!(rejected.level, Some(2));
        assert_eq!(rejected.max_admittable, 14);
    }

    #[test]
    fn test_level_batches_total_first() {
        let limits = CapacityLimits {
            max_total_units: 20,
            max_units_per_level: 5,
        };
        let check = check_level_batches(&Roster::new(), &Formation::new("1", "F"), "Mage", &[(1, 15), (2, 15)], limits);
        assert_eq!(check.reason, CapacityReason::TotalCapExceeded);
        assert_eq!(check.max_admittable, 10);
        assert_eq!(check.level, None);
    }

    #[test]
    fn test_relevel() {
        let roster: Roster = units("Mage", 4, 49, "m").into_iter().collect();
        let formation = Formation::new("1", "F");
        let check = check_relevel(&roster, &formation, "Mage", 4, CapacityLimits::default());
        assert!(!check.allowed);
        assert!(check_relevel(&roster, &formation, "Mage", 5, CapacityLimits::default()).allowed);
    }
}
