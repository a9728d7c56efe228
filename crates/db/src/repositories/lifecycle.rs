//! Soft-deactivation and reactivation for cards, categories and subcards.
//!
//! Deactivating a card or category cascades over its active subcards:
//! every remaining balance is swept out of the system (one debit-style
//! audit row per swept cell) and the flags flip inside one database
//! transaction, so an inactive cell never holds money. Reactivation
//! restores only the flag, never balances and never dependent subcards;
//! the registry is the only way back for a subcard.

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, EntityTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use subledger_shared::Cell;
use tracing::debug;
use uuid::Uuid;

use super::aggregate;
use super::error::LedgerError;
use super::ledger_log::{self, LogEntry};
use crate::entities::{cards, categories, subcards, transactions};

const CARD_SWEEP_DESCRIPTION: &str = "Card deactivated";
const CATEGORY_SWEEP_DESCRIPTION: &str = "Category deactivated";
const SUBCARD_SWEEP_DESCRIPTION: &str = "Subcard deactivated";

/// Deactivation and reactivation of the lifecycle-bearing entities.
#[derive(Debug, Clone)]
pub struct LifecycleManager {
    db: DatabaseConnection,
}

impl LifecycleManager {
    /// Creates a new lifecycle manager.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Deactivates a card, sweeping and deactivating all its active
    /// subcards. Returns one audit row per nonzero balance swept.
    ///
    /// Deactivating an already-inactive card is a no-op success.
    ///
    /// # Errors
    ///
    /// Returns `CardNotFound` if the card does not exist.
    pub async fn deactivate_card(
        &self,
        card_id: Uuid,
        description: Option<&str>,
    ) -> Result<Vec<transactions::Model>, LedgerError> {
        let description = description.unwrap_or(CARD_SWEEP_DESCRIPTION);
        let txn = self.db.begin().await?;

        let card = cards::Entity::find_by_id(card_id)
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or(LedgerError::CardNotFound(card_id))?;
        if !card.is_active {
            txn.commit().await?;
            return Ok(Vec::new());
        }

        let affected = subcards::Entity::find()
            .filter(subcards::Column::CardId.eq(card_id))
            .filter(subcards::Column::IsActive.eq(true))
            .order_by_asc(subcards::Column::Id)
            .lock_exclusive()
            .all(&txn)
            .await?;

        let mut swept = Vec::new();
        for subcard in affected {
            if let Some(row) = sweep_and_deactivate(&txn, subcard, description).await? {
                swept.push(row);
            }
        }

        let mut active: cards::ActiveModel = card.into();
        active.is_active = Set(false);
        active.updated_at = Set(Utc::now().into());
        active.update(&txn).await?;

        txn.commit().await?;
        debug!(%card_id, swept = swept.len(), "card deactivated");
        Ok(swept)
    }

    /// Restores a deactivated card's flag. Subcards stay inactive.
    ///
    /// Reactivating an already-active card is a no-op.
    ///
    /// # Errors
    ///
    /// Returns `CardNotFound` if the card does not exist.
    pub async fn reactivate_card(&self, card_id: Uuid) -> Result<(), LedgerError> {
        let card = cards::Entity::find_by_id(card_id)
            .one(&self.db)
            .await?
            .ok_or(LedgerError::CardNotFound(card_id))?;
        if card.is_active {
            return Ok(());
        }

        let mut active: cards::ActiveModel = card.into();
        active.is_active = Set(true);
        active.updated_at = Set(Utc::now().into());
        active.update(&self.db).await?;

        Ok(())
    }

    /// Deactivates a category, sweeping and deactivating all its active
    /// subcards. Returns one audit row per nonzero balance swept.
    ///
    /// Deactivating an already-inactive category is a no-op success.
    ///
    /// # Errors
    ///
    /// Returns `CategoryNotFound` if the category does not exist.
    pub async fn deactivate_category(
        &self,
        category_id: Uuid,
        description: Option<&str>,
    ) -> Result<Vec<transactions::Model>, LedgerError> {
        let description = description.unwrap_or(CATEGORY_SWEEP_DESCRIPTION);
        let txn = self.db.begin().await?;

        let category = categories::Entity::find_by_id(category_id)
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or(LedgerError::CategoryNotFound(category_id))?;
        if !category.is_active {
            txn.commit().await?;
            return Ok(Vec::new());
        }

        let affected = subcards::Entity::find()
            .filter(subcards::Column::CategoryId.eq(category_id))
            .filter(subcards::Column::IsActive.eq(true))
            .order_by_asc(subcards::Column::Id)
            .lock_exclusive()
            .all(&txn)
            .await?;

        let mut swept = Vec::new();
        for subcard in affected {
            if let Some(row) = sweep_and_deactivate(&txn, subcard, description).await? {
                swept.push(row);
            }
        }

        let mut active: categories::ActiveModel = category.into();
        active.is_active = Set(false);
        active.updated_at = Set(Utc::now().into());
        active.update(&txn).await?;

        txn.commit().await?;
        debug!(%category_id, swept = swept.len(), "category deactivated");
        Ok(swept)
    }

    /// Restores a deactivated category's flag. Subcards stay inactive.
    ///
    /// Reactivating an already-active category is a no-op.
    ///
    /// # Errors
    ///
    /// Returns `CategoryNotFound` if the category does not exist.
    pub async fn reactivate_category(&self, category_id: Uuid) -> Result<(), LedgerError> {
        let category = categories::Entity::find_by_id(category_id)
            .one(&self.db)
            .await?
            .ok_or(LedgerError::CategoryNotFound(category_id))?;
        if category.is_active {
            return Ok(());
        }

        let mut active: categories::ActiveModel = category.into();
        active.is_active = Set(true);
        active.updated_at = Set(Utc::now().into());
        active.update(&self.db).await?;

        Ok(())
    }

    /// Deactivates a single subcard, sweeping its balance. Returns the
    /// audit row if a nonzero balance was swept.
    ///
    /// Deactivating an already-inactive subcard is a no-op success. The
    /// registry is the only way to reactivate it.
    ///
    /// # Errors
    ///
    /// Returns `SubcardNotFound` if the subcard does not exist.
    pub async fn deactivate_subcard(
        &self,
        subcard_id: Uuid,
        description: Option<&str>,
    ) -> Result<Option<transactions::Model>, LedgerError> {
        let description = description.unwrap_or(SUBCARD_SWEEP_DESCRIPTION);
        let txn = self.db.begin().await?;

        let subcard = subcards::Entity::find_by_id(subcard_id)
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or(LedgerError::SubcardNotFound(subcard_id))?;
        if !subcard.is_active {
            txn.commit().await?;
            return Ok(None);
        }

        let row = sweep_and_deactivate(&txn, subcard, description).await?;
        txn.commit().await?;
        Ok(row)
    }
}

/// Zeroes a subcard's balance out of the system and flips it inactive.
///
/// The aggregate update treats the old balance as a withdrawal, so card and
/// category totals no longer count the cell once the flag flips.
async fn sweep_and_deactivate(
    txn: &DatabaseTransaction,
    subcard: subcards::Model,
    description: &str,
) -> Result<Option<transactions::Model>, LedgerError> {
    let amount = subcard.amount;
    let cell = Cell::new(subcard.card_id, subcard.category_id);

    let mut active: subcards::ActiveModel = subcard.into();
    active.is_active = Set(false);
    active.amount = Set(Decimal::ZERO);
    active.updated_at = Set(Utc::now().into());
    active.update(txn).await?;

    if amount.is_zero() {
        return Ok(None);
    }

    aggregate::apply_delta(txn, cell.card_id, cell.category_id, -amount).await?;
    let row = ledger_log::append(
        txn,
        LogEntry {
            from: Some(cell),
            to: None,
            amount,
            description: Some(description),
        },
    )
    .await?;

    Ok(Some(row))
}
