//! `SeaORM` Entity for the transactions table (the audit log).

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// One immutable audit record of a single money movement.
///
/// A NULL from-pair means money entered the system from outside; a NULL
/// to-pair means money left it (a debit or a deactivation sweep). Rows are
/// append-only: never updated, never deleted.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    /// Primary key.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    /// When the movement happened.
    pub occurred_at: DateTimeWithTimeZone,
    /// Source card, NULL for money entering the system.
    pub card_id_from: Option<Uuid>,
    /// Source category, NULL for money entering the system.
    pub category_id_from: Option<Uuid>,
    /// Destination card, NULL for money leaving the system.
    pub card_id_to: Option<Uuid>,
    /// Destination category, NULL for money leaving the system.
    pub category_id_to: Option<Uuid>,
    /// Moved amount, strictly positive.
    pub amount: Decimal,
    /// Free-text reason.
    pub description: Option<String>,
}

/// Entity relations.
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Source card.
    #[sea_orm(
        belongs_to = "super::cards::Entity",
        from = "Column::CardIdFrom",
        to = "super::cards::Column::Id"
    )]
    CardFrom,
    /// Destination card.
    #[sea_orm(
        belongs_to = "super::cards::Entity",
        from = "Column::CardIdTo",
        to = "super::cards::Column::Id"
    )]
    CardTo,
    /// Source category.
    #[sea_orm(
        belongs_to = "super::categories::Entity",
        from = "Column::CategoryIdFrom",
        to = "super::categories::Column::Id"
    )]
    CategoryFrom,
    /// Destination category.
    #[sea_orm(
        belongs_to = "super::categories::Entity",
        from = "Column::CategoryIdTo",
        to = "super::categories::Column::Id"
    )]
    CategoryTo,
}

impl ActiveModelBehavior for ActiveModel {}
