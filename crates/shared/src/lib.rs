//! Shared types and configuration for Subledger.
//!
//! This crate provides common types used across all other crates:
//! - `Cell`: a (card, category) coordinate on the money grid
//! - `TimeRange`: half-open intervals for transaction log queries
//! - Configuration management

pub mod config;
pub mod types;

pub use config::AppConfig;
pub use types::{Cell, SortOrder, TimeRange};
