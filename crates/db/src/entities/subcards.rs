//! `SeaORM` Entity for the subcards table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// The (card, category) intersection cell: the only place money is stored.
///
/// The (card_id, category_id) pair is unique regardless of activity state:
/// a soft-deleted subcard is reactivated in place, never duplicated. An
/// inactive subcard always has amount 0.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "subcards")]
pub struct Model {
    /// Primary key.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    /// The card holding this cell.
    pub card_id: Uuid,
    /// The budget category of this cell.
    pub category_id: Uuid,
    /// Authoritative balance, never negative at rest.
    pub amount: Decimal,
    /// Free-text description.
    pub description: Option<String>,
    /// Soft-deletion flag.
    pub is_active: bool,
    /// Creation timestamp.
    pub created_at: DateTimeWithTimeZone,
    /// Last update timestamp.
    pub updated_at: DateTimeWithTimeZone,
}

/// Entity relations.
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// The holding card.
    #[sea_orm(
        belongs_to = "super::cards::Entity",
        from = "Column::CardId",
        to = "super::cards::Column::Id"
    )]
    Cards,
    /// The budget category.
    #[sea_orm(
        belongs_to = "super::categories::Entity",
        from = "Column::CategoryId",
        to = "super::categories::Column::Id"
    )]
    Categories,
}

impl Related<super::cards::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Cards.def()
    }
}

impl Related<super::categories::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Categories.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
