//! Unit catalog: canonical names, stable indices, rarity and roles.
//!
//! This module provides the single source of truth for unit identity:
//! - [`UnitIndex`]: Stable numeric index used in share links
//! - [`UnitRole`]: Flags for role classification
//! - [`UnitRegistry`]: Lookup by name or index
//!
//! The registry is passed explicitly to everything that needs it, so
//! tests can substitute a small fixture catalog built with
//! [`UnitRegistry::from_ron_str`] or [`UnitRegistry::from_entries`].

use std::collections::{HashMap, HashSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{PlannerError, Result};
use crate::power::calculate_unit_power;
use crate::unit::Rarity;

/// Stable numeric index of a catalog entry.
///
/// Assigned once per unit when the catalog is defined and never reused,
/// so encoded links keep decoding to the same unit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct UnitIndex(u16);

impl UnitIndex {
    /// Create a unit index.
    #[must_use]
    pub const fn new(index: u16) -> Self {
        Self(index)
    }

    /// Get the raw numeric value.
    #[must_use]
    pub const fn as_u16(self) -> u16 {
        self.0
    }
}

impl fmt::Display for UnitIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Role flags for unit classification.
///
/// # Example
///
/// ```
/// use planner_core::registry::UnitRole;
///
/// let role = UnitRole::UNDEAD | UnitRole::MAGES;
/// assert!(role.contains(UnitRole::MAGES));
/// assert!(!role.contains(UnitRole::TANK));
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct UnitRole(u8);

impl UnitRole {
    /// Human units.
    pub const HUMAN: Self = Self(1 << 0);
    /// Spellcasters.
    pub const MAGES: Self = Self(1 << 1);
    /// Ranged attackers.
    pub const RANGER: Self = Self(1 << 2);
    /// Buffs and healing.
    pub const SUPPORT: Self = Self(1 << 3);
    /// Front-line damage absorbers.
    pub const TANK: Self = Self(1 << 4);
    /// Disruptors and assassins.
    pub const TRICKSTER: Self = Self(1 << 5);
    /// Undead units.
    pub const UNDEAD: Self = Self(1 << 6);

    const NAMED: [(Self, &'static str); 7] = [
        (Self::HUMAN, "Human"),
        (Self::MAGES, "Mages"),
        (Self::RANGER, "Ranger"),
        (Self::SUPPORT, "Support"),
        (Self::TANK, "Tank"),
        (Self::TRICKSTER, "Trickster"),
        (Self::UNDEAD, "Undead"),
    ];

    /// Empty role (no flags set).
    #[must_use]
    pub const fn empty() -> Self {
        Self(0)
    }

    /// Check if all flags in `other` are set in `self`.
    #[inline]
    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        (self.0 & other.0) == other.0
    }

    /// Check if any flags in `other` are set in `self`.
    #[inline]
    #[must_use]
    pub const fn intersects(self, other: Self) -> bool {
        (self.0 & other.0) != 0
    }

    /// Combine two roles (union of flags).
    #[inline]
    #[must_use]
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    /// Check if no flags are set.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Build role flags from catalog tags. Matching ignores case;
    /// unknown tags are ignored.
    #[must_use]
    pub fn from_tags<S: AsRef<str>>(tags: &[S]) -> Self {
        tags.iter().fold(Self::empty(), |role, tag| {
            let flag = Self::NAMED
                .iter()
                .find(|(_, name)| name.eq_ignore_ascii_case(tag.as_ref().trim()))
                .map_or(Self::empty(), |(flag, _)| *flag);
            role.union(flag)
        })
    }

    /// Display names of the set flags, in declaration order.
    #[must_use]
    pub fn names(self) -> Vec<&'static str> {
        Self::NAMED
            .iter()
            .filter(|(flag, _)| self.contains(*flag))
            .map(|(_, name)| *name)
            .collect()
    }
}

impl std::ops::BitOr for UnitRole {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self::Output {
        self.union(rhs)
    }
}

impl std::ops::BitOrAssign for UnitRole {
    fn bitor_assign(&mut self, rhs: Self) {
        *self = self.union(rhs);
    }
}

/// Catalog entry for one unit type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnitData {
    /// Canonical name (exact, case-sensitive).
    pub name: String,
    /// Stable numeric index.
    pub index: UnitIndex,
    /// Rarity tier.
    pub rarity: Rarity,
    /// Role flags.
    pub roles: UnitRole,
}

impl UnitData {
    /// Power of this unit at `level` (clamped to 1..=10).
    #[must_use]
    pub fn get_power(&self, level: u8) -> u32 {
        calculate_unit_power(self.rarity, level)
    }
}

/// Serialized catalog entry.
///
/// # Example RON
///
/// ```ron
/// [
///     (name: "ARCHERS", index: 3, rarity: Rare, tags: ["human", "ranger"]),
///     (name: "GOLEM", index: 17, rarity: Epic),
/// ]
/// ```
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CatalogEntry {
    /// Canonical name.
    pub name: String,
    /// Stable numeric index.
    pub index: u16,
    /// Rarity tier.
    pub rarity: Rarity,
    /// Role tags (see [`UnitRole::from_tags`]).
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Read-only catalog of unit types.
#[derive(Clone, Debug, Default)]
pub struct UnitRegistry {
    entries: Vec<UnitData>,
    by_name: HashMap<String, usize>,
    by_index: HashMap<UnitIndex, usize>,
}

impl UnitRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in game catalog (46 units, alphabetical indices).
    #[must_use]
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        for &(name, index, rarity, roles) in BUILTIN_UNITS {
            registry.insert(UnitData {
                name: name.to_string(),
                index: UnitIndex::new(index),
                rarity,
                roles,
            });
        }
        registry
    }

    /// Build a registry from catalog entries.
    ///
    /// # Errors
    ///
    /// Returns [`PlannerError::DuplicateCatalogEntry`] if a name or index
    /// appears twice.
    pub fn from_entries(entries: impl IntoIterator<Item = CatalogEntry>) -> Result<Self> {
        let mut registry = Self::new();
        for entry in entries {
            registry.register(UnitData {
                roles: UnitRole::from_tags(&entry.tags[..]),
                name: entry.name,
                index: UnitIndex::new(entry.index),
                rarity: entry.rarity,
            })?;
        }
        Ok(registry)
    }

    /// Parse a RON list of [`CatalogEntry`] values.
    ///
    /// # Errors
    ///
    /// Returns an error if the RON is malformed or contains duplicates.
    pub fn from_ron_str(source: &str) -> Result<Self> {
        let entries: Vec<CatalogEntry> = ron::from_str(source)
            .map_err(|source| PlannerError::DataParse { what: "catalog", source })?;
        Self::from_entries(entries)
    }

    /// Register a unit type.
    ///
    /// # Errors
    ///
    /// Returns [`PlannerError::DuplicateCatalogEntry`] if the name or index
    /// is already taken.
    pub fn register(&mut self, data: UnitData) -> Result<()> {
        if self.by_name.contains_key(&data.name) {
            return Err(PlannerError::DuplicateCatalogEntry(format!("name '{}'", data.name)));
        }
        if self.by_index.contains_key(&data.index) {
            return Err(PlannerError::DuplicateCatalogEntry(format!("index {}", data.index)));
        }
        self.insert(data);
        Ok(())
    }

    fn insert(&mut self, data: UnitData) {
        let slot = self.entries.len();
        self.by_name.insert(data.name.clone(), slot);
        self.by_index.insert(data.index, slot);
        self.entries.push(data);
    }

    /// Exact, case-sensitive lookup by canonical name.
    #[must_use]
    pub fn get_unit_data_by_name(&self, name: &str) -> Option<&UnitData> {
        self.by_name.get(name).map(|&slot| &self.entries[slot])
    }

    /// Lookup by stable index.
    #[must_use]
    pub fn get_unit_data_by_index(&self, index: UnitIndex) -> Option<&UnitData> {
        self.by_index.get(&index).map(|&slot| &self.entries[slot])
    }

    /// Canonical name for an index.
    #[must_use]
    pub fn get_unit_name_by_index(&self, index: UnitIndex) -> Option<&str> {
        self.get_unit_data_by_index(index).map(|data| data.name.as_str())
    }

    /// Index for a canonical name.
    #[must_use]
    pub fn get_index_by_unit_name(&self, name: &str) -> Option<UnitIndex> {
        self.get_unit_data_by_name(name).map(|data| data.index)
    }

    /// Normalise `name` and look it up.
    #[must_use]
    pub fn resolve(&self, name: &str) -> Option<&UnitData> {
        self.get_unit_data_by_name(&normalize_unit_name(name))
    }

    /// All entries in registration order.
    pub fn all(&self) -> impl Iterator<Item = &UnitData> {
        self.entries.iter()
    }

    /// Entries carrying every flag in `role`.
    pub fn by_role(&self, role: UnitRole) -> impl Iterator<Item = &UnitData> {
        self.entries.iter().filter(move |data| data.roles.contains(role))
    }

    /// Entries of the given rarity.
    pub fn by_rarity(&self, rarity: Rarity) -> impl Iterator<Item = &UnitData> {
        self.entries.iter().filter(move |data| data.rarity == rarity)
    }

    /// Number of unit types.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Strip trailing numeric variant labels from a unit name.
///
/// `"Archer 3"` becomes `"Archer"`. Only whole whitespace-separated
/// trailing tokens made of ASCII digits are removed, repeatedly, and the
/// result is trimmed, so the function is idempotent. Case is preserved.
///
/// # Example
///
/// ```
/// use planner_core::registry::normalize_unit_name;
///
/// assert_eq!(normalize_unit_name("Archer 10"), "Archer");
/// assert_eq!(normalize_unit_name("PALADIN"), "PALADIN");
/// assert_eq!(normalize_unit_name("Unit42"), "Unit42");
/// ```
#[must_use]
pub fn normalize_unit_name(name: &str) -> String {
    let mut rest = name.trim();
    while let Some(split) = rest.rfind(char::is_whitespace) {
        let token = rest[split..].trim_start();
        if token.is_empty() || !token.bytes().all(|b| b.is_ascii_digit()) {
            break;
        }
        rest = rest[..split].trim_end();
    }
    rest.to_string()
}

/// Normalise every name and drop duplicates, keeping first-seen order.
#[must_use]
pub fn deduplicate_unit_names<S: AsRef<str>>(names: &[S]) -> Vec<String> {
    let mut seen = HashSet::new();
    names
        .iter()
        .map(|name| normalize_unit_name(name.as_ref()))
        .filter(|name| seen.insert(name.clone()))
        .collect()
}

const H: UnitRole = UnitRole::HUMAN;
const M: UnitRole = UnitRole::MAGES;
const R: UnitRole = UnitRole::RANGER;
const S: UnitRole = UnitRole::SUPPORT;
const T: UnitRole = UnitRole::TANK;
const K: UnitRole = UnitRole::TRICKSTER;
const U: UnitRole = UnitRole::UNDEAD;

#[rustfmt::skip]
const BUILTIN_UNITS: &[(&str, u16, Rarity, UnitRole)] = &[
    ("AIR ELEMENTAL", 0, Rarity::Epic, M),
    ("ALCHEMIST", 1, Rarity::Epic, H.union(S)),
    ("ARCHER", 2, Rarity::Rare, H.union(R)),
    ("ARCHERS", 3, Rarity::Rare, H.union(R)),
    ("ASSASSINS", 4, Rarity::Rare, H.union(K)),
    ("BATTLE GOLEM", 5, Rarity::Rare, T),
    ("BOMBERS", 6, Rarity::Rare, H.union(K)),
    ("BONEBREAKER", 7, Rarity::Legendary, U.union(T)),
    ("BONE SPEARTHROWER", 8, Rarity::Common, U.union(R)),
    ("BONE WARRIOR", 9, Rarity::Common, U),
    ("BUTCHER", 10, Rarity::Epic, U),
    ("CATAPULT", 11, Rarity::Rare, R),
    ("CURSED CATAPULT", 12, Rarity::Common, U.union(R)),
    ("DEMON", 13, Rarity::Epic, K),
    ("ELEMENTAL", 14, Rarity::Epic, M),
    ("EXPLOSIVE SPIDER", 15, Rarity::Common, K),
    ("GIANT TOAD", 16, Rarity::Legendary, T),
    ("GOLEM", 17, Rarity::Epic, T),
    ("GRAVEDIGGER", 18, Rarity::Rare, U.union(S)),
    ("GUARD", 19, Rarity::Common, H.union(T)),
    ("HEADLESS", 20, Rarity::Legendary, U),
    ("HUNTRESS", 21, Rarity::Legendary, H.union(R)),
    ("IMP", 22, Rarity::Epic, K),
    ("IMMORTAL", 23, Rarity::Epic, U),
    ("INFANTRY", 24, Rarity::Rare, H),
    ("IRON GUARDS", 25, Rarity::Rare, H.union(T)),
    ("KNIGHT", 26, Rarity::Rare, H.union(T)),
    ("LANCER", 27, Rarity::Rare, H),
    ("LAVA GOLEM", 28, Rarity::Epic, T.union(M)),
    ("MAGIC ARCHER", 29, Rarity::Epic, R.union(M)),
    ("MAGE", 30, Rarity::Epic, H.union(M)),
    ("MONK", 31, Rarity::Epic, H.union(S)),
    ("NECROMANCER", 32, Rarity::Epic, U.union(M)),
    ("NIGHT HUNTER", 33, Rarity::Legendary, R),
    ("PALADIN", 34, Rarity::Legendary, H.union(S)),
    ("PHOENIX", 35, Rarity::Legendary, M),
    ("PYROTECHNICIAN", 36, Rarity::Epic, H.union(R)),
    ("ROYAL GUARD", 37, Rarity::Epic, H.union(T)),
    ("SHAMAN", 38, Rarity::Legendary, S.union(M)),
    ("SKELETON", 39, Rarity::Common, U),
    ("SOLDIER", 40, Rarity::Common, H),
    ("SORCERER'S APPRENTICES", 41, Rarity::Epic, H.union(M)),
    ("STONE GOLEM", 42, Rarity::Legendary, T),
    ("STORM MISTRESSES", 43, Rarity::Epic, M),
    ("UNDEAD MAGE", 44, Rarity::Epic, U.union(M)),
    ("WARRIOR", 45, Rarity::Rare, H),
];
