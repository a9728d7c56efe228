//! Template repository for database operations.
//!
//! Templates are pure configuration: a percent per category, stored as
//! JSON. They hold no balance, so this is the one entity that supports a
//! hard delete. Percent sums are never validated here or anywhere in the
//! engine; a template may intentionally distribute only part of an
//! incoming amount.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QueryOrder, Set,
};
use subledger_core::distribution::Percents;
use uuid::Uuid;

use super::error::LedgerError;
use crate::entities::templates;

/// Template repository for CRUD operations.
#[derive(Debug, Clone)]
pub struct TemplateRepository {
    db: DatabaseConnection,
}

impl TemplateRepository {
    /// Creates a new template repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a new template from a percent mapping.
    ///
    /// # Errors
    ///
    /// Returns an error if the database insert fails.
    pub async fn create(
        &self,
        owner_id: Uuid,
        percents: &Percents,
        description: Option<&str>,
    ) -> Result<templates::Model, LedgerError> {
        let now = Utc::now().into();
        let template = templates::ActiveModel {
            id: Set(Uuid::new_v4()),
            owner_id: Set(owner_id),
            percents: Set(encode_percents(percents)?),
            description: Set(description.map(ToString::to_string)),
            created_at: Set(now),
            updated_at: Set(now),
        };

        Ok(template.insert(&self.db).await?)
    }

    /// Finds a template by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<templates::Model>, LedgerError> {
        Ok(templates::Entity::find_by_id(id).one(&self.db).await?)
    }

    /// Lists an owner's templates in creation order.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_by_owner(&self, owner_id: Uuid) -> Result<Vec<templates::Model>, LedgerError> {
        Ok(templates::Entity::find()
            .filter(templates::Column::OwnerId.eq(owner_id))
            .order_by_asc(templates::Column::CreatedAt)
            .all(&self.db)
            .await?)
    }

    /// Replaces a template's percent mapping and description.
    ///
    /// # Errors
    ///
    /// Returns `TemplateNotFound` if the template does not exist.
    pub async fn update(
        &self,
        id: Uuid,
        percents: &Percents,
        description: Option<&str>,
    ) -> Result<templates::Model, LedgerError> {
        let template = templates::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(LedgerError::TemplateNotFound(id))?;

        let mut active: templates::ActiveModel = template.into();
        active.percents = Set(encode_percents(percents)?);
        active.description = Set(description.map(ToString::to_string));
        active.updated_at = Set(Utc::now().into());

        Ok(active.update(&self.db).await?)
    }

    /// Hard-deletes a template.
    ///
    /// # Errors
    ///
    /// Returns `TemplateNotFound` if the template does not exist.
    pub async fn delete(&self, id: Uuid) -> Result<(), LedgerError> {
        let result = templates::Entity::delete_by_id(id).exec(&self.db).await?;
        if result.rows_affected == 0 {
            return Err(LedgerError::TemplateNotFound(id));
        }
        Ok(())
    }

    /// Decodes a template's stored percent mapping.
    ///
    /// # Errors
    ///
    /// Returns an error if the stored JSON is not a valid percent mapping.
    pub fn decode_percents(template: &templates::Model) -> Result<Percents, LedgerError> {
        subledger_core::distribution::percents_from_json(&template.percents)
            .map_err(|e| LedgerError::Store(DbErr::Custom(format!("malformed percents: {e}"))))
    }
}

fn encode_percents(percents: &Percents) -> Result<serde_json::Value, LedgerError> {
    serde_json::to_value(percents)
        .map_err(|e| LedgerError::Store(DbErr::Custom(format!("unencodable percents: {e}"))))
}
