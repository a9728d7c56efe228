//! Keeps card and category totals equal to the sum of their active
//! subcards' balances.
//!
//! Called inside the same database transaction as every subcard amount
//! change, so no committed state can hold a stale total. The increments are
//! single-statement and atomic; they never read-modify-write.

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::sea_query::{Expr, ExprTrait};
use sea_orm::{ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter};
use uuid::Uuid;

use crate::entities::{cards, categories};

/// Applies a subcard balance delta to the owning card and category totals.
pub(crate) async fn apply_delta<C: ConnectionTrait>(
    conn: &C,
    card_id: Uuid,
    category_id: Uuid,
    delta: Decimal,
) -> Result<(), DbErr> {
    if delta.is_zero() {
        return Ok(());
    }

    cards::Entity::update_many()
        .col_expr(
            cards::Column::Amount,
            Expr::col(cards::Column::Amount).add(delta),
        )
        .col_expr(cards::Column::UpdatedAt, Expr::value(Utc::now()))
        .filter(cards::Column::Id.eq(card_id))
        .exec(conn)
        .await?;

    categories::Entity::update_many()
        .col_expr(
            categories::Column::Amount,
            Expr::col(categories::Column::Amount).add(delta),
        )
        .col_expr(categories::Column::UpdatedAt, Expr::value(Utc::now()))
        .filter(categories::Column::Id.eq(category_id))
        .exec(conn)
        .await?;

    Ok(())
}
