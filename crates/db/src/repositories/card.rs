//! Card repository for database operations.
//!
//! Cards are created active with amount 0; the amount column is a derived
//! total owned by the ledger engine and is never set through this
//! repository. Deactivation and reactivation live with the lifecycle
//! manager, not here.

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use super::error::LedgerError;
use crate::entities::cards;

/// Card repository for CRUD operations.
#[derive(Debug, Clone)]
pub struct CardRepository {
    db: DatabaseConnection,
}

impl CardRepository {
    /// Creates a new card repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a new card, active with amount 0.
    ///
    /// Never resurrects an existing inactive card of the same name.
    ///
    /// # Errors
    ///
    /// Returns `UniquenessConflict` if the owner already has a card with
    /// this name (active or not).
    pub async fn create(
        &self,
        owner_id: Uuid,
        name: &str,
        description: Option<&str>,
    ) -> Result<cards::Model, LedgerError> {
        let now = Utc::now().into();
        let card = cards::ActiveModel {
            id: Set(Uuid::new_v4()),
            owner_id: Set(owner_id),
            name: Set(name.to_string()),
            amount: Set(Decimal::ZERO),
            is_active: Set(true),
            description: Set(description.map(ToString::to_string)),
            created_at: Set(now),
            updated_at: Set(now),
        };

        card.insert(&self.db)
            .await
            .map_err(|e| LedgerError::from_insert(e, &format!("card name '{name}' is taken")))
    }

    /// Finds a card by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<cards::Model>, LedgerError> {
        Ok(cards::Entity::find_by_id(id).one(&self.db).await?)
    }

    /// Lists an owner's active cards in creation order.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_active_by_owner(
        &self,
        owner_id: Uuid,
    ) -> Result<Vec<cards::Model>, LedgerError> {
        self.list_by_owner(owner_id, true).await
    }

    /// Lists an owner's deactivated cards in creation order.
    ///
    /// Shown when adding a card, so the owner can reactivate instead of
    /// creating a duplicate name.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_inactive_by_owner(
        &self,
        owner_id: Uuid,
    ) -> Result<Vec<cards::Model>, LedgerError> {
        self.list_by_owner(owner_id, false).await
    }

    async fn list_by_owner(
        &self,
        owner_id: Uuid,
        is_active: bool,
    ) -> Result<Vec<cards::Model>, LedgerError> {
        Ok(cards::Entity::find()
            .filter(cards::Column::OwnerId.eq(owner_id))
            .filter(cards::Column::IsActive.eq(is_active))
            .order_by_asc(cards::Column::CreatedAt)
            .all(&self.db)
            .await?)
    }

    /// Renames a card and replaces its description.
    ///
    /// # Errors
    ///
    /// Returns `CardNotFound` if the card does not exist, or
    /// `UniquenessConflict` if the new name is taken.
    pub async fn update_details(
        &self,
        id: Uuid,
        name: &str,
        description: Option<&str>,
    ) -> Result<cards::Model, LedgerError> {
        let card = cards::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(LedgerError::CardNotFound(id))?;

        let mut active: cards::ActiveModel = card.into();
        active.name = Set(name.to_string());
        active.description = Set(description.map(ToString::to_string));
        active.updated_at = Set(Utc::now().into());

        active
            .update(&self.db)
            .await
            .map_err(|e| LedgerError::from_insert(e, &format!("card name '{name}' is taken")))
    }
}
