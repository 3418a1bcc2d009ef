//! Planner configuration.
//!
//! # Example RON
//!
//! ```ron
//! PlannerConfig(
//!     max_total_units: 1000,
//!     max_units_per_level: 49,
//!     default_formation_name: "Formation 9",
//!     history_limit: 50,
//!     url_debounce_ms: 300,
//!     partial_batch_policy: RejectAll,
//! )
//! ```
//!
//! Every field is optional; missing fields take their defaults.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::capacity::CapacityLimits;
use crate::error::{PlannerError, Result};

/// What to do when only part of an add batch fits under the caps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PartialBatchPolicy {
    /// Reject the whole batch.
    #[default]
    RejectAll,
    /// Admit as many units as fit and report the shortfall.
    AdmitFittable,
}

/// Tunable planner settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    /// Cap on roster + formation units.
    pub max_total_units: usize,
    /// Cap on units sharing a (name, level) pair.
    pub max_units_per_level: usize,
    /// Name used when a link or rename supplies none.
    pub default_formation_name: String,
    /// Undo steps kept.
    pub history_limit: usize,
    /// Quiet period before a state change is written to the URL.
    pub url_debounce_ms: u64,
    /// Policy for batches that only partly fit.
    pub partial_batch_policy: PartialBatchPolicy,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            max_total_units: 1000,
            max_units_per_level: 49,
            default_formation_name: "Formation 9".to_string(),
            history_limit: 50,
            url_debounce_ms: 300,
            partial_batch_policy: PartialBatchPolicy::RejectAll,
        }
    }
}

impl PlannerConfig {
    /// Parse and validate a RON config.
    ///
    /// # Errors
    ///
    /// Returns an error if the RON is malformed or the values are
    /// inconsistent.
    pub fn from_ron_str(source: &str) -> Result<Self> {
        let config: Self = ron::from_str(source)
            .map_err(|source| PlannerError::DataParse { what: "config", source })?;
        config.validate()?;
        Ok(config)
    }

    /// Check that the limits make sense together.
    ///
    /// # Errors
    ///
    /// Returns [`PlannerError::InvalidConfig`] describing the first problem.
    pub fn validate(&self) -> Result<()> {
        if self.max_total_units == 0 {
            return Err(PlannerError::InvalidConfig(
                "max_total_units must be positive".to_string(),
            ));
        }
        if self.max_units_per_level == 0 {
            return Err(PlannerError::InvalidConfig(
                "max_units_per_level must be positive".to_string(),
            ));
        }
        if self.max_units_per_level > self.max_total_units {
            return Err(PlannerError::InvalidConfig(format!(
                "max_units_per_level ({}) exceeds max_total_units ({})",
                self.max_units_per_level, self.max_total_units
            )));
        }
        if self.default_formation_name.contains(crate::formation::RESERVED_NAME_CHAR) {
            return Err(PlannerError::InvalidConfig(
                "default_formation_name must not contain ';'".to_string(),
            ));
        }
        Ok(())
    }

    /// The two unit caps.
    #[must_use]
    pub const fn limits(&self) -> CapacityLimits {
        CapacityLimits {
            max_total_units: self.max_total_units,
            max_units_per_level: self.max_units_per_level,
        }
    }

    /// URL debounce window.
    #[must_use]
    pub const fn url_debounce(&self) -> Duration {
        Duration::from_millis(self.url_debounce_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = PlannerConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.limits().max_total_units, 1000);
        assert_eq!(config.limits().max_units_per_level, 49);
        assert_eq!(config.url_debounce(), Duration::from_millis(300));
    }

    #[test]
    fn test_partial_ron_uses_defaults() {
        let config = PlannerConfig::from_ron_str("(history_limit: 5, partial_batch_policy: AdmitFittable)")
            .unwrap();
        assert_eq!(config.history_limit, 5);
        assert_eq!(config.partial_batch_policy, PartialBatchPolicy::AdmitFittable);
        assert_eq!(config.max_total_units, 1000);
    }

    #[test]
    fn test_rejects_inconsistent_limits() {
        let result = PlannerConfig::from_ron_str("(max_total_units: 10, max_units_per_level: 49)");
        assert!(matches!(result, Err(PlannerError::InvalidConfig(_))));

        let result = PlannerConfig::from_ron_str("(max_units_per_level: 0)");
        assert!(matches!(result, Err(PlannerError::InvalidConfig(_))));
    }

    #[test]
    fn test_rejects_malformed_ron() {
        let result = PlannerConfig::from_ron_str("(history_limit: \"many\")");
        assert!(matches!(result, Err(PlannerError::DataParse { what: "config", .. })));
    }
}
