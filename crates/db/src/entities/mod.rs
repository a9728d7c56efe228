//! `SeaORM` entity definitions for the six ledger relations.

pub mod cards;
pub mod categories;
pub mod subcards;
pub mod templates;
pub mod transactions;
pub mod users;
