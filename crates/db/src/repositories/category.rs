//! Category repository for database operations.
//!
//! Categories share the card lifecycle shape: created active with amount 0,
//! soft-deactivated, never deleted. The amount column is a derived total
//! owned by the ledger engine.

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use super::error::LedgerError;
use crate::entities::categories;

/// Category repository for CRUD operations.
#[derive(Debug, Clone)]
pub struct CategoryRepository {
    db: DatabaseConnection,
}

impl CategoryRepository {
    /// Creates a new category repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a new category, active with amount 0.
    ///
    /// # Errors
    ///
    /// Returns `UniquenessConflict` if the owner already has a category
    /// with this name (active or not).
    pub async fn create(
        &self,
        owner_id: Uuid,
        name: &str,
        description: Option<&str>,
    ) -> Result<categories::Model, LedgerError> {
        let now = Utc::now().into();
        let category = categories::ActiveModel {
            id: Set(Uuid::new_v4()),
            owner_id: Set(owner_id),
            name: Set(name.to_string()),
            amount: Set(Decimal::ZERO),
            is_active: Set(true),
            description: Set(description.map(ToString::to_string)),
            created_at: Set(now),
            updated_at: Set(now),
        };

        category
            .insert(&self.db)
            .await
            .map_err(|e| LedgerError::from_insert(e, &format!("category name '{name}' is taken")))
    }

    /// Finds a category by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<categories::Model>, LedgerError> {
        Ok(categories::Entity::find_by_id(id).one(&self.db).await?)
    }

    /// Lists an owner's active categories in creation order.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_active_by_owner(
        &self,
        owner_id: Uuid,
    ) -> Result<Vec<categories::Model>, LedgerError> {
        self.list_by_owner(owner_id, true).await
    }

    /// Lists an owner's deactivated categories in creation order.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_inactive_by_owner(
        &self,
        owner_id: Uuid,
    ) -> Result<Vec<categories::Model>, LedgerError> {
        self.list_by_owner(owner_id, false).await
    }

    async fn list_by_owner(
        &self,
        owner_id: Uuid,
        is_active: bool,
    ) -> Result<Vec<categories::Model>, LedgerError> {
        Ok(categories::Entity::find()
            .filter(categories::Column::OwnerId.eq(owner_id))
            .filter(categories::Column::IsActive.eq(is_active))
            .order_by_asc(categories::Column::CreatedAt)
            .all(&self.db)
            .await?)
    }

    /// Renames a category and replaces its description.
    ///
    /// # Errors
    ///
    /// Returns `CategoryNotFound` if the category does not exist, or
    /// `UniquenessConflict` if the new name is taken.
    pub async fn update_details(
        &self,
        id: Uuid,
        name: &str,
        description: Option<&str>,
    ) -> Result<categories::Model, LedgerError> {
        let category = categories::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(LedgerError::CategoryNotFound(id))?;

        let mut active: categories::ActiveModel = category.into();
        active.name = Set(name.to_string());
        active.description = Set(description.map(ToString::to_string));
        active.updated_at = Set(Utc::now().into());

        active
            .update(&self.db)
            .await
            .map_err(|e| LedgerError::from_insert(e, &format!("category name '{name}' is taken")))
    }
}
