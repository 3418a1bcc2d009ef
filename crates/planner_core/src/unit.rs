//! Units and their intrinsic properties.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{PlannerError, Result};
use crate::power::calculate_unit_power;
use crate::registry::UnitData;

/// Lowest valid unit level.
pub const MIN_UNIT_LEVEL: u8 = 1;

/// Highest valid unit level.
pub const MAX_UNIT_LEVEL: u8 = 10;

/// Check that a level lies within `MIN_UNIT_LEVEL..=MAX_UNIT_LEVEL`.
#[must_use]
pub const fn is_valid_level(level: u8) -> bool {
    level >= MIN_UNIT_LEVEL && level <= MAX_UNIT_LEVEL
}

/// Unit rarity tier.
///
/// Variants are declared in ascending order, so the derived `Ord`
/// ranks `Legendary` highest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Rarity {
    /// Lowest tier.
    Common,
    /// Second tier.
    Rare,
    /// Third tier.
    Epic,
    /// Highest tier.
    Legendary,
}

impl Rarity {
    /// All rarities, lowest first.
    pub const ALL: [Self; 4] = [Self::Common, Self::Rare, Self::Epic, Self::Legendary];

    /// Display name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Common => "Common",
            Self::Rare => "Rare",
            Self::Epic => "Epic",
            Self::Legendary => "Legendary",
        }
    }

    /// Parse a rarity name, ignoring case.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|rarity| rarity.as_str().eq_ignore_ascii_case(name.trim()))
    }
}

impl fmt::Display for Rarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Opaque unit identifier, unique within a session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UnitId(String);

impl UnitId {
    /// Wrap an identifier string.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the raw identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A single owned unit, either in the roster or placed in the formation.
///
/// `power` is derived from rarity and level and is only ever written by
/// the constructors and [`Unit::set_level`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Unit {
    id: UnitId,
    name: String,
    level: u8,
    rarity: Rarity,
    power: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    image_url: Option<String>,
}

impl Unit {
    /// Create a unit from a catalog entry.
    ///
    /// # Errors
    ///
    /// Returns [`PlannerError::InvalidLevel`] if `level` is outside 1..=10.
    pub fn new(id: UnitId, data: &UnitData, level: u8) -> Result<Self> {
        Self::with_rarity(id, data.name.clone(), data.rarity, level)
    }

    /// Create a unit whose name is not in the catalog, using a
    /// caller-supplied rarity.
    ///
    /// # Errors
    ///
    /// Returns [`PlannerError::InvalidLevel`] if `level` is outside 1..=10.
    pub fn with_rarity(id: UnitId, name: impl Into<String>, rarity: Rarity, level: u8) -> Result<Self> {
        if !is_valid_level(level) {
            return Err(PlannerError::InvalidLevel(level));
        }
        Ok(Self {
            id,
            name: name.into(),
            level,
            rarity,
            power: calculate_unit_power(rarity, level),
            image_url: None,
        })
    }

    /// Attach a display image hint.
    #[must_use]
    pub fn with_image_url(mut self, url: impl Into<String>) -> Self {
        self.image_url = Some(url.into());
        self
    }

    /// Unique identifier.
    #[must_use]
    pub fn id(&self) -> &UnitId {
        &self.id
    }

    /// Canonical (normalised) name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current level.
    #[must_use]
    pub const fn level(&self) -> u8 {
        self.level
    }

    /// Rarity tier.
    #[must_use]
    pub const fn rarity(&self) -> Rarity {
        self.rarity
    }

    /// Power at the current level.
    #[must_use]
    pub const fn power(&self) -> u32 {
        self.power
    }

    /// Display image hint, if any.
    #[must_use]
    pub fn image_url(&self) -> Option<&str> {
        self.image_url.as_deref()
    }

    /// Change level and recompute power.
    ///
    /// # Errors
    ///
    /// Returns [`PlannerError::InvalidLevel`] if `level` is outside 1..=10;
    /// the unit is left untouched.
    pub fn set_level(&mut self, level: u8) -> Result<()> {
        if !is_valid_level(level) {
            return Err(PlannerError::InvalidLevel(level));
        }
        self.level = level;
        self.power = calculate_unit_power(self.rarity, level);
        Ok(())
    }

    /// Check that the stored power matches the table.
    #[must_use]
    pub fn has_consistent_power(&self) -> bool {
        self.power == calculate_unit_power(self.rarity, self.level)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rarity_ordering() {
        assert!(Rarity::Legendary > Rarity::Epic);
        assert!(Rarity::Epic > Rarity::Rare);
        assert!(Rarity::Rare > Rarity::Common);
    }

    #[test]
    fn test_rarity_parse() {
        assert_eq!(Rarity::parse("epic"), Some(Rarity::Epic));
        assert_eq!(Rarity::parse(" LEGENDARY "), Some(Rarity::Legendary));
        assert_eq!(Rarity::parse("mythic"), None);
    }

    #[test]
    fn test_unit_power_derived_from_level() {
        let unit = Unit::with_rarity(UnitId::new("u1"), "KNIGHT", Rarity::Rare, 3).unwrap();
        assert_eq!(unit.power(), 480);
        assert!(unit.has_consistent_power());
    }

    #[test]
    fn test_unit_rejects_invalid_level() {
        let result = Unit::with_rarity(UnitId::new("u1"), "KNIGHT", Rarity::Rare, 0);
        assert!(matches!(result, Err(PlannerError::InvalidLevel(0))));

        let result = Unit::with_rarity(UnitId::new("u1"), "KNIGHT", Rarity::Rare, 11);
        assert!(matches!(result, Err(PlannerError::InvalidLevel(11))));
    }

    #[test]
    fn test_set_level_recomputes_power() {
        let mut unit = Unit::with_rarity(UnitId::new("u1"), "MAGE", Rarity::Epic, 1).unwrap();
        unit.set_level(10).unwrap();
        assert_eq!(unit.level(), 10);
        assert_eq!(unit.power(), 53760);

        assert!(unit.set_level(12).is_err());
        assert_eq!(unit.level(), 10);
        assert_eq!(unit.power(), 53760);
    }

    #[test]
    fn test_image_url_is_optional() {
        let unit = Unit::with_rarity(UnitId::new("u1"), "IMP", Rarity::Epic, 1).unwrap();
        assert_eq!(unit.image_url(), None);

        let unit = unit.with_image_url("/units/imp.webp");
        assert_eq!(unit.image_url(), Some("/units/imp.webp"));
    }
}
