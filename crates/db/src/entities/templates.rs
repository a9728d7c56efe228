//! `SeaORM` Entity for the templates table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A saved percentage split across categories.
///
/// Pure configuration: holds no balance and has no effect until a caller
/// builds a distribution request from it. The only entity that may be
/// hard-deleted.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "templates")]
pub struct Model {
    /// Primary key.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    /// Owning user.
    pub owner_id: Uuid,
    /// JSON object mapping category id → percent. Percents need not sum
    /// to 100; validation is the request builder's concern.
    pub percents: Json,
    /// Free-text description.
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
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
