//! `SeaORM` Entity for the cards table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A physical money container (e.g. a bank account).
///
/// `amount` is a derived aggregate over the card's active subcards and is
/// maintained in the same database transaction as every subcard change;
/// it is never written directly by callers.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "cards")]
pub struct Model {
    /// Primary key.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    /// Owning user.
    pub owner_id: Uuid,
    /// Card name, unique per owner.
    pub name: String,
    /// Derived total over active subcards.
    pub amount: Decimal,
    /// Soft-deletion flag.
    pub is_active: bool,
    /// Free-text purpose description.
    pub description: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTimeWithTimeZone,
    /// Last update timestamp.
    pub updated_at: DateTimeWithTimeZone,
}

/// Entity relations.
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// The owning user.
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::OwnerId",
        to = "super::users::Column::Id"
    )]
    Users,
    /// Subcards on this card.
    #[sea_orm(has_many = "super::subcards::Entity")]
    Subcards,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl Related<super::subcards::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Subcards.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
