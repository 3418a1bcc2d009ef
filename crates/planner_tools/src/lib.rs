//! # Formation Planner Tools
//!
//! Command-line helpers around `planner_core`:
//! - Share-link inspection and re-encoding
//! - Catalog and config validators

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod error;
pub mod inspect;
pub mod validate;
