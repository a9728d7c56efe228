//! Grid coordinates for money cells.
//!
//! Money only ever lives at the intersection of a card and a category.
//! `Cell` names that intersection without implying the subcard row exists.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A (card, category) coordinate on the money grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cell {
    /// The card holding this cell.
    pub card_id: Uuid,
    /// The budget category of this cell.
    pub category_id: Uuid,
}

impl Cell {
    /// Creates a new cell coordinate.
    #[must_use]
    pub const fn new(card_id: Uuid, category_id: Uuid) -> Self {
        Self {
            card_id,
            category_id,
        }
    }
}

impl std::fmt::Display for Cell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.card_id, self.category_id)
    }
}
