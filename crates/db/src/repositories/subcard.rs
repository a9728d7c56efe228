//! Subcard registry and reads.
//!
//! The registry owns the uniqueness of the (card, category) pair: a cell is
//! created on first use and reactivated in place on reuse; a subcard row
//! is never duplicated. Reactivation happens only here, as a side effect of
//! a ledger operation; there is no user-facing undelete, and it never
//! restores a balance (an inactive subcard always holds 0).

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
};
use uuid::Uuid;

use super::error::LedgerError;
use crate::entities::subcards;

/// Subcard repository: pair resolution and reads.
#[derive(Debug, Clone)]
pub struct SubcardRepository {
    db: DatabaseConnection,
}

impl SubcardRepository {
    /// Creates a new subcard repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Finds a subcard by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<subcards::Model>, LedgerError> {
        Ok(subcards::Entity::find_by_id(id).one(&self.db).await?)
    }

    /// Finds the unique subcard at a (card, category) cell, active or not.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_pair(
        &self,
        card_id: Uuid,
        category_id: Uuid,
    ) -> Result<Option<subcards::Model>, LedgerError> {
        Ok(find_pair(card_id, category_id).one(&self.db).await?)
    }

    /// Lists the active subcards on a card.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_active_by_card(
        &self,
        card_id: Uuid,
    ) -> Result<Vec<subcards::Model>, LedgerError> {
        Ok(subcards::Entity::find()
            .filter(subcards::Column::CardId.eq(card_id))
            .filter(subcards::Column::IsActive.eq(true))
            .all(&self.db)
            .await?)
    }

    /// User-facing add of a category onto a card.
    ///
    /// Creates the subcard, or reactivates the existing row for the pair.
    /// The caller cannot know a soft-deleted cell already sits there, so
    /// unlike [`Self::resolve`] the supplied description wins either way.
    /// Doubles as the description editor for an already-active cell.
    ///
    /// # Errors
    ///
    /// Returns an error if the upsert fails.
    pub async fn register(
        &self,
        card_id: Uuid,
        category_id: Uuid,
        description: Option<&str>,
    ) -> Result<subcards::Model, LedgerError> {
        upsert_pair(&self.db, card_id, category_id, description, true).await
    }

    /// Resolves a (card, category) cell for a ledger operation.
    ///
    /// Absent → inserted active with amount 0 and `create_description`.
    /// Present but inactive → reactivated in place, keeping its existing
    /// description and (zero) amount. Present and active → returned
    /// unchanged. The row comes back locked for the remainder of `conn`'s
    /// transaction, so the caller's balance mutation cannot be interleaved.
    ///
    /// # Errors
    ///
    /// Returns an error if the upsert fails.
    pub async fn resolve<C: ConnectionTrait>(
        conn: &C,
        card_id: Uuid,
        category_id: Uuid,
        create_description: Option<&str>,
    ) -> Result<subcards::Model, LedgerError> {
        upsert_pair(conn, card_id, category_id, create_description, false).await
    }
}

/// Select builder for the unique (card, category) row.
pub(crate) fn find_pair(card_id: Uuid, category_id: Uuid) -> sea_orm::Select<subcards::Entity> {
    subcards::Entity::find()
        .filter(subcards::Column::CardId.eq(card_id))
        .filter(subcards::Column::CategoryId.eq(category_id))
}

async fn upsert_pair<C: ConnectionTrait>(
    conn: &C,
    card_id: Uuid,
    category_id: Uuid,
    description: Option<&str>,
    override_description: bool,
) -> Result<subcards::Model, LedgerError> {
    let now = Utc::now().into();
    let subcard = subcards::ActiveModel {
        id: Set(Uuid::new_v4()),
        card_id: Set(card_id),
        category_id: Set(category_id),
        amount: Set(Decimal::ZERO),
        description: Set(description.map(ToString::to_string)),
        is_active: Set(true),
        created_at: Set(now),
        updated_at: Set(now),
    };

    let mut on_conflict = OnConflict::columns([
        subcards::Column::CardId,
        subcards::Column::CategoryId,
    ]);
    on_conflict.update_columns([subcards::Column::IsActive, subcards::Column::UpdatedAt]);
    if override_description {
        on_conflict.update_column(subcards::Column::Description);
    }

    let model = subcards::Entity::insert(subcard)
        .on_conflict(on_conflict)
        .exec_with_returning(conn)
        .await?;

    Ok(model)
}
