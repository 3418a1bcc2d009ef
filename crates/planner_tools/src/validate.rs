//! Data validation utilities.

use std::collections::BTreeMap;
use std::path::Path;

use planner_core::config::PlannerConfig;
use planner_core::registry::UnitRegistry;
use planner_core::unit::Rarity;
use serde::Serialize;
use tracing::debug;

use crate::error::{Result, ToolError};

/// What a catalog file contains.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CatalogReport {
    /// Number of unit types.
    pub units: usize,
    /// Unit types per rarity.
    pub by_rarity: BTreeMap<Rarity, usize>,
    /// Highest index in the catalog.
    pub max_index: Option<u16>,
}

impl CatalogReport {
    /// Summarise a loaded catalog.
    #[must_use]
    pub fn from_registry(registry: &UnitRegistry) -> Self {
        let mut by_rarity = BTreeMap::new();
        for data in registry.all() {
            *by_rarity.entry(data.rarity).or_insert(0) += 1;
        }
        Self {
            units: registry.len(),
            by_rarity,
            max_index: registry.all().map(|data| data.index.as_u16()).max(),
        }
    }
}

fn read(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|source| ToolError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Load a RON catalog file.
///
/// # Errors
///
/// Returns an error if the file is unreadable, malformed or has duplicate
/// names or indices.
pub fn load_catalog(path: &Path) -> Result<UnitRegistry> {
    let registry = UnitRegistry::from_ron_str(&read(path)?).map_err(|source| ToolError::Load {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(path = %path.display(), units = registry.len(), "Loaded catalog");
    Ok(registry)
}

/// Load and validate a RON config file.
///
/// # Errors
///
/// Returns an error if the file is unreadable, malformed or inconsistent.
pub fn load_config(path: &Path) -> Result<PlannerConfig> {
    PlannerConfig::from_ron_str(&read(path)?).map_err(|source| ToolError::Load {
        path: path.to_path_buf(),
        source,
    })
}

/// The catalog at `path`, or the built-in one.
///
/// # Errors
///
/// See [`load_catalog`].
pub fn catalog_or_builtin(path: Option<&Path>) -> Result<UnitRegistry> {
    path.map_or_else(|| Ok(UnitRegistry::builtin()), load_catalog)
}

/// The config at `path`, or the defaults.
///
/// # Errors
///
/// See [`load_config`].
pub fn config_or_default(path: Option<&Path>) -> Result<PlannerConfig> {
    path.map_or_else(|| Ok(PlannerConfig::default()), load_config)
}

/// Validate a catalog file and summarise it.
///
/// # Errors
///
/// See [`load_catalog`].
pub fn validate_catalog(path: &Path) -> Result<CatalogReport> {
    load_catalog(path).map(|registry| CatalogReport::from_registry(&registry))
}
