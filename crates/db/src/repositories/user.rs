//! User repository for database operations.
//!
//! Users are created by the external auth collaborator; the ledger treats
//! the credential reference as an opaque string.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
};
use uuid::Uuid;

use super::error::LedgerError;
use crate::entities::users;

/// User repository for CRUD operations.
#[derive(Debug, Clone)]
pub struct UserRepository {
    db: DatabaseConnection,
}

impl UserRepository {
    /// Creates a new user repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a new user.
    ///
    /// # Errors
    ///
    /// Returns `UniquenessConflict` if the login is taken.
    pub async fn create(
        &self,
        login: &str,
        password_hash: &str,
        display_name: &str,
    ) -> Result<users::Model, LedgerError> {
        let now = Utc::now().into();
        let user = users::ActiveModel {
            id: Set(Uuid::new_v4()),
            login: Set(login.to_string()),
            password_hash: Set(password_hash.to_string()),
            display_name: Set(display_name.to_string()),
            created_at: Set(now),
            updated_at: Set(now),
        };

        user.insert(&self.db)
            .await
            .map_err(|e| LedgerError::from_insert(e, &format!("login '{login}' is taken")))
    }

    /// Finds a user by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<users::Model>, LedgerError> {
        Ok(users::Entity::find_by_id(id).one(&self.db).await?)
    }

    /// Finds a user by login.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_login(&self, login: &str) -> Result<Option<users::Model>, LedgerError> {
        Ok(users::Entity::find()
            .filter(users::Column::Login.eq(login))
            .one(&self.db)
            .await?)
    }

    /// Updates a user's credential reference and display name.
    ///
    /// # Errors
    ///
    /// Returns `UserNotFound` if the user does not exist.
    pub async fn update_profile(
        &self,
        id: Uuid,
        password_hash: &str,
        display_name: &str,
    ) -> Result<users::Model, LedgerError> {
        let user = users::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(LedgerError::UserNotFound(id))?;

        let mut active: users::ActiveModel = user.into();
        active.password_hash = Set(password_hash.to_string());
        active.display_name = Set(display_name.to_string());
        active.updated_at = Set(Utc::now().into());

        Ok(active.update(&self.db).await?)
    }
}
