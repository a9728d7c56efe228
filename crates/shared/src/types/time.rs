//! Time interval types for transaction log queries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A half-open time interval `[from, to)`.
///
/// Half-open bounds compose without overlap: `[a, b)` followed by `[b, c)`
/// counts every instant exactly once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    /// Inclusive lower bound.
    pub from: DateTime<Utc>,
    /// Exclusive upper bound.
    pub to: DateTime<Utc>,
}

impl TimeRange {
    /// Creates a new half-open interval `[from, to)`.
    #[must_use]
    pub const fn new(from: DateTime<Utc>, to: DateTime<Utc>) -> Self {
        Self { from, to }
    }

    /// Returns true if the instant falls inside the interval.
    #[must_use]
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.from <= instant && instant < self.to
    }
}

/// Sort direction for timestamped query results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// Oldest first (the default for audit reads).
    #[default]
    Ascending,
    /// Newest first.
    Descending,
}
