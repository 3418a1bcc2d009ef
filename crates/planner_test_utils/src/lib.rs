//! # Planner Test Utilities
//!
//! Shared testing utilities for the planner crates:
//! - A small fixture catalog and plan builders
//! - Id-independent plan signatures for round-trip checks
//! - Property-based testing strategies

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod fixtures;
pub mod strategies;

/// Re-export proptest for convenience.
pub use proptest;
