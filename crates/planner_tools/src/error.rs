//! Tool error types.

use std::path::PathBuf;

use planner_core::error::PlannerError;
use thiserror::Error;

/// Result type for tool operations.
pub type Result<T> = std::result::Result<T, ToolError>;

/// Errors raised by the command-line tools.
#[derive(Debug, Error)]
pub enum ToolError {
    /// A data file could not be read.
    #[error("Failed to read '{path}': {source}")]
    Io {
        /// File that failed.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The core rejected a catalog, config or plan.
    #[error("Failed to load '{path}': {source}")]
    Load {
        /// File that failed.
        path: PathBuf,
        /// Core error.
        #[source]
        source: PlannerError,
    },

    /// The link had neither a `formation` nor a `units` parameter.
    #[error("No formation or units parameter in link: {0}")]
    EmptyLink(String),

    /// Output could not be serialised.
    #[error("Failed to write JSON: {0}")]
    Json(#[from] serde_json::Error),
}
