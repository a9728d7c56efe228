//! The error taxonomy shared by the ledger repositories.
//!
//! Every failure mode is explicit. Callers always receive a specific kind;
//! no operation reports success after quietly doing nothing.

use rust_decimal::Decimal;
use sea_orm::{DbErr, SqlErr};
use subledger_core::rules::RuleError;
use subledger_shared::Cell;
use uuid::Uuid;

/// Errors surfaced by ledger operations.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    /// Amount is zero or negative.
    #[error("Amount must be positive, got {0}")]
    InvalidAmount(Decimal),

    /// User not found.
    #[error("User not found: {0}")]
    UserNotFound(Uuid),

    /// Card not found.
    #[error("Card not found: {0}")]
    CardNotFound(Uuid),

    /// Category not found.
    #[error("Category not found: {0}")]
    CategoryNotFound(Uuid),

    /// Subcard not found by id.
    #[error("Subcard not found: {0}")]
    SubcardNotFound(Uuid),

    /// No active subcard at the (card, category) cell.
    #[error("No active subcard at cell {0}")]
    NoSubcardAtCell(Cell),

    /// Template not found.
    #[error("Template not found: {0}")]
    TemplateNotFound(Uuid),

    /// Card exists but is deactivated where an active one was required.
    #[error("Card {0} is inactive")]
    CardInactive(Uuid),

    /// Debit or transfer exceeds the available balance.
    #[error("Insufficient funds: requested {requested}, available {available}")]
    InsufficientFunds {
        /// Balance currently on the source cell.
        available: Decimal,
        /// Amount the operation asked to move.
        requested: Decimal,
    },

    /// Transfer source equals destination.
    #[error("Source and destination are the same cell {0}")]
    SameCell(Cell),

    /// A category cannot be merged into itself.
    #[error("Cannot merge category {0} into itself")]
    SameCategory(Uuid),

    /// Name or (card, category) pair collision on creation.
    #[error("Uniqueness conflict: {0}")]
    UniquenessConflict(String),

    /// Underlying storage error; the in-flight transaction is rolled back.
    #[error("Storage error: {0}")]
    Store(#[from] DbErr),
}

impl From<RuleError> for LedgerError {
    fn from(err: RuleError) -> Self {
        match err {
            RuleError::NonPositiveAmount(amount) => Self::InvalidAmount(amount),
            RuleError::SameCell(cell) => Self::SameCell(cell),
            RuleError::InsufficientFunds {
                available,
                requested,
            } => Self::InsufficientFunds {
                available,
                requested,
            },
        }
    }
}

impl LedgerError {
    /// Maps an insert failure, turning unique-constraint violations into
    /// `UniquenessConflict` with the given context.
    pub(crate) fn from_insert(err: DbErr, context: &str) -> Self {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => {
                Self::UniquenessConflict(context.to_string())
            }
            _ => Self::Store(err),
        }
    }
}
