//! Integration tests for the transaction log query surface.

mod common;

use chrono::Utc;
use rust_decimal_macros::dec;
use subledger_db::repositories::{TransactionLogRepository, TransferEngine};
use subledger_shared::{Cell, SortOrder, TimeRange};

#[tokio::test]
async fn test_by_card_ordering_follows_requested_order() {
    let Some(db) = common::connect_or_skip().await else {
        return;
    };
    let user = common::make_user(&db).await;
    let card = common::make_card(&db, user.id, "main").await;
    let category = common::make_category(&db, user.id, "food").await;
    let engine = TransferEngine::new(db.clone());
    let log_repo = TransactionLogRepository::new(db.clone());

    let cell = Cell::new(card.id, category.id);
    let first = engine.credit(cell, dec!(10), "first").await.expect("credit failed");
    let second = engine.credit(cell, dec!(20), "second").await.expect("credit failed");
    let third = engine.debit(cell, dec!(5), "third").await.expect("debit failed");

    let ascending = log_repo
        .by_card(card.id, None, SortOrder::Ascending)
        .await
        .expect("log query failed");
    assert_eq!(
        ascending.iter().map(|row| row.id).collect::<Vec<_>>(),
        vec![first.id, second.id, third.id]
    );

    let descending = log_repo
        .by_card(card.id, None, SortOrder::Descending)
        .await
        .expect("log query failed");
    assert_eq!(
        descending.iter().map(|row| row.id).collect::<Vec<_>>(),
        vec![third.id, second.id, first.id]
    );

    common::cleanup_user(&db, user.id).await;
}

#[tokio::test]
async fn test_time_bounds_are_half_open() {
    let Some(db) = common::connect_or_skip().await else {
        return;
    };
    let user = common::make_user(&db).await;
    let card = common::make_card(&db, user.id, "main").await;
    let category = common::make_category(&db, user.id, "food").await;
    let engine = TransferEngine::new(db.clone());
    let log_repo = TransactionLogRepository::new(db.clone());

    let cell = Cell::new(card.id, category.id);
    let first = engine.credit(cell, dec!(10), "first").await.expect("credit failed");
    let second = engine.credit(cell, dec!(20), "second").await.expect("credit failed");
    let third = engine.credit(cell, dec!(30), "third").await.expect("credit failed");

    // [first, third): the lower bound is included, the upper is not.
    let range = TimeRange::new(
        first.occurred_at.with_timezone(&Utc),
        third.occurred_at.with_timezone(&Utc),
    );
    let bounded = log_repo
        .by_card(card.id, Some(range), SortOrder::Ascending)
        .await
        .expect("log query failed");
    assert_eq!(
        bounded.iter().map(|row| row.id).collect::<Vec<_>>(),
        vec![first.id, second.id]
    );

    common::cleanup_user(&db, user.id).await;
}

#[tokio::test]
async fn test_by_category_sees_both_endpoints() {
    let Some(db) = common::connect_or_skip().await else {
        return;
    };
    let user = common::make_user(&db).await;
    let card = common::make_card(&db, user.id, "main").await;
    let food = common::make_category(&db, user.id, "food").await;
    let transport = common::make_category(&db, user.id, "transport").await;
    let engine = TransferEngine::new(db.clone());
    let log_repo = TransactionLogRepository::new(db.clone());

    engine
        .credit(Cell::new(card.id, food.id), dec!(50), "seed")
        .await
        .expect("credit failed");
    let moved = engine
        .transfer(
            Cell::new(card.id, food.id),
            Cell::new(card.id, transport.id),
            dec!(15),
            "reshuffle",
        )
        .await
        .expect("transfer failed");

    // The transfer is visible from the source category...
    let food_rows = log_repo
        .by_category(food.id, None, SortOrder::Ascending)
        .await
        .expect("log query failed");
    assert!(food_rows.iter().any(|row| row.id == moved.id));

    // ...and from the destination category, exactly once.
    let transport_rows = log_repo
        .by_category(transport.id, None, SortOrder::Ascending)
        .await
        .expect("log query failed");
    assert_eq!(
        transport_rows
            .iter()
            .filter(|row| row.id == moved.id)
            .count(),
        1
    );

    common::cleanup_user(&db, user.id).await;
}
