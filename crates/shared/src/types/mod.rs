//! Common types used across the application.

pub mod cell;
pub mod time;

pub use cell::Cell;
pub use time::{SortOrder, TimeRange};
