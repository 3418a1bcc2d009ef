//! Error types for planner operations.

use thiserror::Error;

use crate::capacity::CapacityCheck;
use crate::unit::UnitId;

/// Result type alias using [`PlannerError`].
pub type Result<T> = std::result::Result<T, PlannerError>;

/// Top-level error type for all planner errors.
#[derive(Debug, Error)]
pub enum PlannerError {
    /// A unit cap would be exceeded. Shown to the user.
    #[error("{0}")]
    ValidationRejected(CapacityCheck),

    /// Grid coordinate outside the 7×7 formation.
    #[error("Grid position ({row}, {col}) is out of bounds")]
    OutOfBounds {
        /// Requested row.
        row: usize,
        /// Requested column.
        col: usize,
    },

    /// The referenced unit is not where the caller expected it.
    #[error("Unit not found: {0}")]
    UnitNotFound(UnitId),

    /// Unit level outside 1..=10.
    #[error("Invalid unit level: {0}")]
    InvalidLevel(u8),

    /// Name does not resolve in the catalog and no fallback rarity was given.
    #[error("Unknown unit: '{0}'")]
    UnknownUnit(String),

    /// Catalog source defines the same name or index twice.
    #[error("Duplicate catalog entry: {0}")]
    DuplicateCatalogEntry(String),

    /// RON data failed to parse.
    #[error("Failed to parse {what}: {source}")]
    DataParse {
        /// What was being parsed ("config", "catalog").
        what: &'static str,
        /// Underlying parse error.
        #[source]
        source: ron::error::SpannedError,
    },

    /// Configuration values are inconsistent.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Undo requested with an empty history.
    #[error("Nothing to undo")]
    NothingToUndo,

    /// Redo requested after a new action or with no undone steps.
    #[error("Nothing to redo")]
    NothingToRedo,

    /// An internal invariant does not hold.
    #[error("Invalid plan state: {0}")]
    InvalidState(String),
}

impl PlannerError {
    /// Whether the UI should surface this error to the user.
    ///
    /// Bounds and not-found errors indicate a stale UI reference, not bad
    /// user input, so they are only logged.
    #[must_use]
    pub const fn is_user_facing(&self) -> bool {
        matches!(
            self,
            Self::ValidationRejected(_) | Self::InvalidLevel(_) | Self::UnknownUnit(_)
        )
    }
}
