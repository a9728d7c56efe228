//! Core business rules for Subledger.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//!
//! # Modules
//!
//! - `rules` - The money-movement rules every ledger operation must pass
//! - `distribution` - The distribution-request builder for template-based crediting

pub mod distribution;
pub mod rules;

#[cfg(test)]
mod rules_props;

pub use distribution::{Percents, build_shares, percents_from_json};
pub use rules::{RuleError, ensure_covered, ensure_distinct_cells, ensure_positive};
