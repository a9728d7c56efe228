//! `SeaORM` Entity for the users table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// An account owner. Credentials are opaque to the ledger: `password_hash`
/// is written by the external auth collaborator and never interpreted here.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    /// Primary key.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    /// Unique login.
    pub login: String,
    /// Opaque credential reference managed by the auth collaborator.
    pub password_hash: String,
    /// Display name.
    pub display_name: String,
    /// Creation timestamp.
    pub created_at: DateTimeWithTimeZone,
    /// Last update timestamp.
    pub updated_at: DateTimeWithTimeZone,
}

/// Entity relations.
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Cards owned by this user.
    #[sea_orm(has_many = "super::cards::Entity")]
    Cards,
    /// Categories owned by this user.
    #[sea_orm(has_many = "super::categories::Entity")]
    Categories,
    /// Templates owned by this user.
    #[sea_orm(has_many = "super::templates::Entity")]
    Templates,
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

impl Related<super::templates::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Templates.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
