//! Database layer with `SeaORM` entities and the ledger repositories.
//!
//! This crate provides:
//! - `SeaORM` entity definitions for the six ledger relations
//! - Repository abstractions for data access
//! - The transfer engine and lifecycle operations, each a single
//!   database transaction
//! - Database migrations

pub mod entities;
pub mod migration;
pub mod repositories;

pub use repositories::{
    CardRepository, CategoryRepository, LedgerError, LifecycleManager, SubcardRepository,
    TemplateRepository, TransactionLogRepository, TransferEngine, UserRepository,
};

use sea_orm::{Database, DatabaseConnection, DbErr};

/// Establishes a connection to the database.
///
/// # Errors
///
/// Returns an error if the connection cannot be established.
pub async fn connect(database_url: &str) -> Result<DatabaseConnection, DbErr> {
    Database::connect(database_url).await
}
