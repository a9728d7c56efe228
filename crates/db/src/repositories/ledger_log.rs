//! The append-only transaction log.
//!
//! One row per money movement, written inside the movement's own database
//! transaction. Rows are never updated or deleted; replaying them
//! reconstructs every balance in the system.

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection, DbErr,
    EntityTrait, QueryFilter, QueryOrder, Set,
};
use subledger_shared::{Cell, SortOrder, TimeRange};
use uuid::Uuid;

use super::error::LedgerError;
use crate::entities::transactions;

/// One movement to record: `None` endpoints are the outside world.
#[derive(Debug, Clone, Copy)]
pub(crate) struct LogEntry<'a> {
    /// Source cell, `None` for money entering the system.
    pub from: Option<Cell>,
    /// Destination cell, `None` for money leaving the system.
    pub to: Option<Cell>,
    /// Moved amount, strictly positive (validated by the caller).
    pub amount: Decimal,
    /// Free-text reason.
    pub description: Option<&'a str>,
}

/// Appends one audit row inside the caller's transaction.
pub(crate) async fn append<C: ConnectionTrait>(
    conn: &C,
    entry: LogEntry<'_>,
) -> Result<transactions::Model, DbErr> {
    debug_assert!(entry.amount > Decimal::ZERO);
    debug_assert!(entry.from.is_some() || entry.to.is_some());

    let row = transactions::ActiveModel {
        id: Set(Uuid::new_v4()),
        occurred_at: Set(Utc::now().into()),
        card_id_from: Set(entry.from.map(|cell| cell.card_id)),
        category_id_from: Set(entry.from.map(|cell| cell.category_id)),
        card_id_to: Set(entry.to.map(|cell| cell.card_id)),
        category_id_to: Set(entry.to.map(|cell| cell.category_id)),
        amount: Set(entry.amount),
        description: Set(entry.description.map(ToString::to_string)),
    };

    row.insert(conn).await
}

/// Read-only queries over the audit log.
#[derive(Debug, Clone)]
pub struct TransactionLogRepository {
    db: DatabaseConnection,
}

impl TransactionLogRepository {
    /// Creates a new transaction log repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Lists the movements touching a card as source or destination,
    /// optionally bounded to `[range.from, range.to)`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn by_card(
        &self,
        card_id: Uuid,
        range: Option<TimeRange>,
        order: SortOrder,
    ) -> Result<Vec<transactions::Model>, LedgerError> {
        let endpoint = Condition::any()
            .add(transactions::Column::CardIdFrom.eq(card_id))
            .add(transactions::Column::CardIdTo.eq(card_id));

        self.list(endpoint, range, order).await
    }

    /// Lists the movements touching a category as source or destination,
    /// optionally bounded to `[range.from, range.to)`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn by_category(
        &self,
        category_id: Uuid,
        range: Option<TimeRange>,
        order: SortOrder,
    ) -> Result<Vec<transactions::Model>, LedgerError> {
        let endpoint = Condition::any()
            .add(transactions::Column::CategoryIdFrom.eq(category_id))
            .add(transactions::Column::CategoryIdTo.eq(category_id));

        self.list(endpoint, range, order).await
    }

    async fn list(
        &self,
        endpoint: Condition,
        range: Option<TimeRange>,
        order: SortOrder,
    ) -> Result<Vec<transactions::Model>, LedgerError> {
        let mut query = transactions::Entity::find().filter(endpoint);

        if let Some(range) = range {
            query = query
                .filter(transactions::Column::OccurredAt.gte(range.from))
                .filter(transactions::Column::OccurredAt.lt(range.to));
        }

        let query = match order {
            SortOrder::Ascending => query.order_by_asc(transactions::Column::OccurredAt),
            SortOrder::Descending => query.order_by_desc(transactions::Column::OccurredAt),
        };

        Ok(query.all(&self.db).await?)
    }
}
