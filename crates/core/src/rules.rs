//! The money-movement rules every ledger operation must pass.
//!
//! All checks run before any storage mutation, so a violation aborts an
//! operation with nothing persisted.

use rust_decimal::Decimal;
use subledger_shared::Cell;
use thiserror::Error;

/// Violations of the money-movement rules.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RuleError {
    /// Amount is zero or negative.
    #[error("Amount must be positive, got {0}")]
    NonPositiveAmount(Decimal),

    /// Source and destination are the same cell.
    #[error("Source and destination are the same cell {0}")]
    SameCell(Cell),

    /// Requested more than the cell holds.
    #[error("Insufficient funds: requested {requested}, available {available}")]
    InsufficientFunds {
        /// Balance currently on the source cell.
        available: Decimal,
        /// Amount the operation asked to move.
        requested: Decimal,
    },
}

/// Validates that a movement amount is strictly positive.
///
/// # Errors
///
/// Returns `RuleError::NonPositiveAmount` for zero or negative amounts.
pub fn ensure_positive(amount: Decimal) -> Result<(), RuleError> {
    if amount <= Decimal::ZERO {
        return Err(RuleError::NonPositiveAmount(amount));
    }
    Ok(())
}

/// Validates that a transfer names two different cells.
///
/// Same-cell transfers are rejected outright: they cannot change any
/// balance and would only pollute the audit log.
///
/// # Errors
///
/// Returns `RuleError::SameCell` if both coordinates are equal.
pub fn ensure_distinct_cells(from: Cell, to: Cell) -> Result<(), RuleError> {
    if from == to {
        return Err(RuleError::SameCell(from));
    }
    Ok(())
}

/// Validates that a cell balance covers a requested withdrawal.
///
/// # Errors
///
/// Returns `RuleError::InsufficientFunds` if `available < requested`.
pub fn ensure_covered(available: Decimal, requested: Decimal) -> Result<(), RuleError> {
    if available < requested {
        return Err(RuleError::InsufficientFunds {
            available,
            requested,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    #[rstest]
    #[case(dec!(0.01))]
    #[case(dec!(1))]
    #[case(dec!(999999.99))]
    fn test_positive_amounts_pass(#[case] amount: Decimal) {
        assert!(ensure_positive(amount).is_ok());
    }

    #[rstest]
    #[case(dec!(0))]
    #[case(dec!(-0.01))]
    #[case(dec!(-100))]
    fn test_non_positive_amounts_fail(#[case] amount: Decimal) {
        assert_eq!(
            ensure_positive(amount),
            Err(RuleError::NonPositiveAmount(amount))
        );
    }

    #[test]
    fn test_distinct_cells_pass() {
        let from = Cell::new(Uuid::new_v4(), Uuid::new_v4());
        let to = Cell::new(Uuid::new_v4(), from.category_id);
        assert!(ensure_distinct_cells(from, to).is_ok());
    }

    #[test]
    fn test_same_cell_fails() {
        let cell = Cell::new(Uuid::new_v4(), Uuid::new_v4());
        assert_eq!(
            ensure_distinct_cells(cell, cell),
            Err(RuleError::SameCell(cell))
        );
    }

    #[test]
    fn test_exact_balance_covers_request() {
        assert!(ensure_covered(dec!(40), dec!(40)).is_ok());
    }

    #[test]
    fn test_shortfall_is_reported_with_both_sides() {
        assert_eq!(
            ensure_covered(dec!(60), dec!(1000)),
            Err(RuleError::InsufficientFunds {
                available: dec!(60),
                requested: dec!(1000),
            })
        );
    }
}
