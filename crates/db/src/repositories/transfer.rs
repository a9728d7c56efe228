//! The transfer engine: the atomic money-movement operations.
//!
//! Every operation here is one database transaction. Cells are locked
//! (`FOR UPDATE`, or the row lock taken by the registry upsert) before any
//! read-then-write, so two concurrent operations cannot race past the same
//! sufficiency check. Card and category totals and the audit rows are
//! written inside that same transaction; a failure at any step rolls the
//! whole operation back, log rows included.

use std::collections::BTreeMap;

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DatabaseTransaction,
    EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use subledger_core::rules;
use subledger_shared::Cell;
use tracing::debug;
use uuid::Uuid;

use super::aggregate;
use super::error::LedgerError;
use super::ledger_log::{self, LogEntry};
use super::subcard::{self, SubcardRepository};
use crate::entities::{cards, categories, subcards, transactions};

// Descriptions stamped on auto-created subcards.
const CREATED_ON_CREDIT: &str = "Created automatically on credit";
const CREATED_ON_TRANSFER: &str = "Created automatically on transfer";
const CREATED_ON_DISTRIBUTION: &str = "Created automatically on distribution";
const CREATED_ON_COLLECTION: &str = "Created automatically on collection";
const CREATED_ON_MERGE: &str = "Created automatically on category merge";

// Default audit descriptions for the batch operations.
const DISTRIBUTION_DESCRIPTION: &str = "Distribution credit";
const COLLECTION_DESCRIPTION: &str = "Category collected onto one card";
const MERGE_DESCRIPTION: &str = "Category closed and merged";

/// Destination of a category merge.
#[derive(Debug, Clone)]
pub enum MergeTarget {
    /// Merge into an existing category (reactivated if needed).
    Existing(Uuid),
    /// Create a fresh category under the old category's owner and merge
    /// into it.
    New {
        /// Name for the new category.
        name: String,
        /// Description for the new category.
        description: Option<String>,
    },
}

/// Result of a category merge.
#[derive(Debug, Clone)]
pub struct MergeOutcome {
    /// The destination category id (freshly created for `MergeTarget::New`).
    pub category_id: Uuid,
    /// One audit row per card whose balance moved.
    pub moved: Vec<transactions::Model>,
}

/// The atomic money-movement operations over the ledger.
#[derive(Debug, Clone)]
pub struct TransferEngine {
    db: DatabaseConnection,
}

impl TransferEngine {
    /// Creates a new transfer engine.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Credits `amount` from outside the system onto a cell.
    ///
    /// The card must exist and be active. The category must exist; a
    /// deactivated one is force-activated. The subcard is created or
    /// reactivated on demand. Returns the audit row.
    ///
    /// # Errors
    ///
    /// Returns `InvalidAmount`, `CardNotFound`, `CardInactive` or
    /// `CategoryNotFound`.
    pub async fn credit(
        &self,
        cell: Cell,
        amount: Decimal,
        description: &str,
    ) -> Result<transactions::Model, LedgerError> {
        rules::ensure_positive(amount)?;
        let txn = self.db.begin().await?;

        require_active_card(&txn, cell.card_id).await?;
        ensure_category_usable(&txn, cell.category_id).await?;

        let target =
            SubcardRepository::resolve(&txn, cell.card_id, cell.category_id, Some(CREATED_ON_CREDIT))
                .await?;
        add_to_subcard(&txn, target, amount).await?;
        aggregate::apply_delta(&txn, cell.card_id, cell.category_id, amount).await?;

        let row = ledger_log::append(
            &txn,
            LogEntry {
                from: None,
                to: Some(cell),
                amount,
                description: Some(description),
            },
        )
        .await?;

        txn.commit().await?;
        debug!(%cell, %amount, "credited");
        Ok(row)
    }

    /// Debits `amount` from a cell out of the system.
    ///
    /// The subcard must exist, be active and cover the amount. Returns the
    /// audit row.
    ///
    /// # Errors
    ///
    /// Returns `InvalidAmount`, `NoSubcardAtCell` or `InsufficientFunds`.
    pub async fn debit(
        &self,
        cell: Cell,
        amount: Decimal,
        description: &str,
    ) -> Result<transactions::Model, LedgerError> {
        rules::ensure_positive(amount)?;
        let txn = self.db.begin().await?;

        let source = lock_active_subcard(&txn, cell).await?;
        rules::ensure_covered(source.amount, amount)?;

        add_to_subcard(&txn, source, -amount).await?;
        aggregate::apply_delta(&txn, cell.card_id, cell.category_id, -amount).await?;

        let row = ledger_log::append(
            &txn,
            LogEntry {
                from: Some(cell),
                to: None,
                amount,
                description: Some(description),
            },
        )
        .await?;

        txn.commit().await?;
        debug!(%cell, %amount, "debited");
        Ok(row)
    }

    /// Moves `amount` between two cells, creating or reactivating the
    /// destination subcard on demand. Returns the single audit row
    /// recording both endpoints.
    ///
    /// # Errors
    ///
    /// Returns `InvalidAmount`, `SameCell`, `NoSubcardAtCell`,
    /// `InsufficientFunds`, `CardNotFound`, `CardInactive` or
    /// `CategoryNotFound`.
    pub async fn transfer(
        &self,
        from: Cell,
        to: Cell,
        amount: Decimal,
        description: &str,
    ) -> Result<transactions::Model, LedgerError> {
        rules::ensure_positive(amount)?;
        rules::ensure_distinct_cells(from, to)?;

        let txn = self.db.begin().await?;

        // Destination container checks precede any cell lock.
        require_active_card(&txn, to.card_id).await?;
        ensure_category_usable(&txn, to.category_id).await?;

        // Fixed lock order over the two cells: opposite transfers on the
        // same pair cannot deadlock.
        let (source, destination) = if (to.card_id, to.category_id)
            < (from.card_id, from.category_id)
        {
            let destination =
                SubcardRepository::resolve(&txn, to.card_id, to.category_id, Some(CREATED_ON_TRANSFER))
                    .await?;
            let source = lock_active_subcard(&txn, from).await?;
            (source, destination)
        } else {
            let source = lock_active_subcard(&txn, from).await?;
            let destination =
                SubcardRepository::resolve(&txn, to.card_id, to.category_id, Some(CREATED_ON_TRANSFER))
                    .await?;
            (source, destination)
        };

        rules::ensure_covered(source.amount, amount)?;

        add_to_subcard(&txn, source, -amount).await?;
        add_to_subcard(&txn, destination, amount).await?;
        aggregate::apply_delta(&txn, from.card_id, from.category_id, -amount).await?;
        aggregate::apply_delta(&txn, to.card_id, to.category_id, amount).await?;

        let row = ledger_log::append(
            &txn,
            LogEntry {
                from: Some(from),
                to: Some(to),
                amount,
                description: Some(description),
            },
        )
        .await?;

        txn.commit().await?;
        debug!(%from, %to, %amount, "transferred");
        Ok(row)
    }

    /// Credits a batch of per-category amounts onto one card: the
    /// application of a distribution request built from a template.
    ///
    /// Deactivated categories are force-activated; subcards are created or
    /// reactivated on demand. All entries apply atomically: one bad entry
    /// fails the whole call with nothing persisted. Returns one audit row
    /// per entry.
    ///
    /// # Errors
    ///
    /// Returns `InvalidAmount` if any amount is non-positive,
    /// `CardNotFound`, `CardInactive` or `CategoryNotFound`.
    pub async fn distribute(
        &self,
        card_id: Uuid,
        amounts: &BTreeMap<Uuid, Decimal>,
        description: Option<&str>,
    ) -> Result<Vec<transactions::Model>, LedgerError> {
        for &amount in amounts.values() {
            rules::ensure_positive(amount)?;
        }
        let description = description.unwrap_or(DISTRIBUTION_DESCRIPTION);

        let txn = self.db.begin().await?;
        require_active_card(&txn, card_id).await?;

        let mut rows = Vec::with_capacity(amounts.len());
        // Ascending category ids out of the BTreeMap: deterministic lock
        // order across concurrent distributions.
        for (&category_id, &amount) in amounts {
            ensure_category_usable(&txn, category_id).await?;

            let target =
                SubcardRepository::resolve(&txn, card_id, category_id, Some(CREATED_ON_DISTRIBUTION))
                    .await?;
            add_to_subcard(&txn, target, amount).await?;
            aggregate::apply_delta(&txn, card_id, category_id, amount).await?;

            let row = ledger_log::append(
                &txn,
                LogEntry {
                    from: None,
                    to: Some(Cell::new(card_id, category_id)),
                    amount,
                    description: Some(description),
                },
            )
            .await?;
            rows.push(row);
        }

        txn.commit().await?;
        debug!(%card_id, entries = rows.len(), "distributed");
        Ok(rows)
    }

    /// Gathers a category's money from the owner's other cards onto
    /// `target`. Every active same-category subcard with a nonzero balance
    /// is zeroed; the sum lands on the target cell, created or reactivated
    /// on demand. Returns one audit row per source.
    ///
    /// With no nonzero sources this is a no-op success: nothing is
    /// persisted, not even the target subcard.
    ///
    /// # Errors
    ///
    /// Returns `CardNotFound`, `CardInactive` or `CategoryNotFound`.
    pub async fn collect(
        &self,
        target: Cell,
        description: Option<&str>,
    ) -> Result<Vec<transactions::Model>, LedgerError> {
        let description = description.unwrap_or(COLLECTION_DESCRIPTION);
        let txn = self.db.begin().await?;

        let card = require_active_card(&txn, target.card_id).await?;
        let category = categories::Entity::find_by_id(target.category_id)
            .one(&txn)
            .await?
            .ok_or(LedgerError::CategoryNotFound(target.category_id))?;

        let owner_card_ids: Vec<Uuid> = cards::Entity::find()
            .filter(cards::Column::OwnerId.eq(card.owner_id))
            .all(&txn)
            .await?
            .into_iter()
            .map(|card| card.id)
            .collect();

        // One locking pass over every cell of the category on the owner's
        // cards, ascending id: a fixed order shared with any concurrent
        // collect, including one aimed at a different target card.
        let cells = subcards::Entity::find()
            .filter(subcards::Column::CategoryId.eq(target.category_id))
            .filter(subcards::Column::CardId.is_in(owner_card_ids))
            .order_by_asc(subcards::Column::Id)
            .lock_exclusive()
            .all(&txn)
            .await?;

        let sources: Vec<subcards::Model> = cells
            .into_iter()
            .filter(|subcard| {
                subcard.card_id != target.card_id && subcard.is_active && !subcard.amount.is_zero()
            })
            .collect();

        if sources.is_empty() {
            txn.commit().await?;
            return Ok(Vec::new());
        }

        if !category.is_active {
            reactivate_category(&txn, category).await?;
        }

        let destination =
            SubcardRepository::resolve(&txn, target.card_id, target.category_id, Some(CREATED_ON_COLLECTION))
                .await?;

        let mut total = Decimal::ZERO;
        let mut rows = Vec::with_capacity(sources.len());
        for source in sources {
            let amount = source.amount;
            let source_cell = Cell::new(source.card_id, source.category_id);

            add_to_subcard(&txn, source, -amount).await?;
            aggregate::apply_delta(&txn, source_cell.card_id, source_cell.category_id, -amount)
                .await?;

            let row = ledger_log::append(
                &txn,
                LogEntry {
                    from: Some(source_cell),
                    to: Some(target),
                    amount,
                    description: Some(description),
                },
            )
            .await?;
            rows.push(row);
            total += amount;
        }

        add_to_subcard(&txn, destination, total).await?;
        aggregate::apply_delta(&txn, target.card_id, target.category_id, total).await?;

        txn.commit().await?;
        debug!(%target, %total, sources = rows.len(), "collected");
        Ok(rows)
    }

    /// Closes a category, migrating its funds into another one.
    ///
    /// The old category and all its active subcards are deactivated. Each
    /// nonzero balance moves onto the same card's subcard under the target
    /// category (created or reactivated on demand, summing with existing
    /// funds), with one audit row per card. Zero-balance subcards are
    /// deactivated silently.
    ///
    /// A `MergeTarget::New` category is created first, inheriting the old
    /// category's owner; a name collision aborts the whole merge.
    ///
    /// # Errors
    ///
    /// Returns `CategoryNotFound`, `SameCategory` or `UniquenessConflict`.
    pub async fn merge_category(
        &self,
        old_category_id: Uuid,
        target: MergeTarget,
        description: Option<&str>,
    ) -> Result<MergeOutcome, LedgerError> {
        if let MergeTarget::Existing(id) = &target {
            if *id == old_category_id {
                return Err(LedgerError::SameCategory(old_category_id));
            }
        }
        let description = description.unwrap_or(MERGE_DESCRIPTION);

        let txn = self.db.begin().await?;

        let old = categories::Entity::find_by_id(old_category_id)
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or(LedgerError::CategoryNotFound(old_category_id))?;

        let destination_category = match target {
            MergeTarget::Existing(id) => {
                let category = categories::Entity::find_by_id(id)
                    .one(&txn)
                    .await?
                    .ok_or(LedgerError::CategoryNotFound(id))?;
                if category.is_active {
                    category
                } else {
                    reactivate_category(&txn, category).await?
                }
            }
            MergeTarget::New { name, description } => {
                let now = Utc::now().into();
                let category = categories::ActiveModel {
                    id: Set(Uuid::new_v4()),
                    owner_id: Set(old.owner_id),
                    name: Set(name.clone()),
                    amount: Set(Decimal::ZERO),
                    is_active: Set(true),
                    description: Set(description),
                    created_at: Set(now),
                    updated_at: Set(now),
                };
                category.insert(&txn).await.map_err(|e| {
                    LedgerError::from_insert(e, &format!("category name '{name}' is taken"))
                })?
            }
        };

        // The old category's live cells, ascending id for a stable lock
        // order.
        let old_subcards = subcards::Entity::find()
            .filter(subcards::Column::CategoryId.eq(old_category_id))
            .filter(subcards::Column::IsActive.eq(true))
            .order_by_asc(subcards::Column::Id)
            .lock_exclusive()
            .all(&txn)
            .await?;

        let mut moved = Vec::new();
        for old_subcard in old_subcards {
            let amount = old_subcard.amount;
            let card_id = old_subcard.card_id;

            let mut active: subcards::ActiveModel = old_subcard.into();
            active.is_active = Set(false);
            active.amount = Set(Decimal::ZERO);
            active.updated_at = Set(Utc::now().into());
            active.update(&txn).await?;

            if amount.is_zero() {
                continue;
            }

            aggregate::apply_delta(&txn, card_id, old_category_id, -amount).await?;

            let destination =
                SubcardRepository::resolve(&txn, card_id, destination_category.id, Some(CREATED_ON_MERGE))
                    .await?;
            add_to_subcard(&txn, destination, amount).await?;
            aggregate::apply_delta(&txn, card_id, destination_category.id, amount).await?;

            let row = ledger_log::append(
                &txn,
                LogEntry {
                    from: Some(Cell::new(card_id, old_category_id)),
                    to: Some(Cell::new(card_id, destination_category.id)),
                    amount,
                    description: Some(description),
                },
            )
            .await?;
            moved.push(row);
        }

        if old.is_active {
            let mut active: categories::ActiveModel = old.into();
            active.is_active = Set(false);
            active.updated_at = Set(Utc::now().into());
            active.update(&txn).await?;
        }

        txn.commit().await?;
        debug!(
            %old_category_id,
            new_category_id = %destination_category.id,
            moved = moved.len(),
            "category merged"
        );
        Ok(MergeOutcome {
            category_id: destination_category.id,
            moved,
        })
    }
}

/// Loads a card, requiring it to exist and be active.
async fn require_active_card<C: ConnectionTrait>(
    conn: &C,
    card_id: Uuid,
) -> Result<cards::Model, LedgerError> {
    let card = cards::Entity::find_by_id(card_id)
        .one(conn)
        .await?
        .ok_or(LedgerError::CardNotFound(card_id))?;
    if !card.is_active {
        return Err(LedgerError::CardInactive(card_id));
    }
    Ok(card)
}

/// Loads a category, force-activating a deactivated one.
///
/// A deactivated category named as a destination comes back; a deactivated
/// card never does and must be reactivated explicitly first.
async fn ensure_category_usable<C: ConnectionTrait>(
    conn: &C,
    category_id: Uuid,
) -> Result<categories::Model, LedgerError> {
    let category = categories::Entity::find_by_id(category_id)
        .one(conn)
        .await?
        .ok_or(LedgerError::CategoryNotFound(category_id))?;
    if category.is_active {
        return Ok(category);
    }
    reactivate_category(conn, category).await
}

async fn reactivate_category<C: ConnectionTrait>(
    conn: &C,
    category: categories::Model,
) -> Result<categories::Model, LedgerError> {
    let mut active: categories::ActiveModel = category.into();
    active.is_active = Set(true);
    active.updated_at = Set(Utc::now().into());
    Ok(active.update(conn).await?)
}

/// Locks the subcard at `cell` for the rest of the transaction, requiring
/// it to exist and be active.
async fn lock_active_subcard(
    txn: &DatabaseTransaction,
    cell: Cell,
) -> Result<subcards::Model, LedgerError> {
    subcard::find_pair(cell.card_id, cell.category_id)
        .lock_exclusive()
        .one(txn)
        .await?
        .filter(|subcard| subcard.is_active)
        .ok_or(LedgerError::NoSubcardAtCell(cell))
}

/// Applies a delta to an already-locked subcard row.
async fn add_to_subcard<C: ConnectionTrait>(
    conn: &C,
    subcard: subcards::Model,
    delta: Decimal,
) -> Result<subcards::Model, LedgerError> {
    let new_amount = subcard.amount + delta;
    let mut active: subcards::ActiveModel = subcard.into();
    active.amount = Set(new_amount);
    active.updated_at = Set(Utc::now().into());
    Ok(active.update(conn).await?)
}
