//! Integration tests for the entity CRUD repositories.

mod common;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use subledger_core::distribution::Percents;
use subledger_db::repositories::{
    CardRepository, LedgerError, SubcardRepository, TemplateRepository, UserRepository,
};
use uuid::Uuid;

#[tokio::test]
async fn test_user_login_is_unique() {
    let Some(db) = common::connect_or_skip().await else {
        return;
    };
    let users = UserRepository::new(db.clone());

    let login = format!("test-{}", &Uuid::new_v4().simple().to_string()[..12]);
    let user = users
        .create(&login, "hash", "First")
        .await
        .expect("create failed");

    let err = users
        .create(&login, "other-hash", "Second")
        .await
        .expect_err("duplicate login must fail");
    assert!(matches!(err, LedgerError::UniquenessConflict(_)));

    let found = users
        .find_by_login(&login)
        .await
        .expect("query failed")
        .expect("user missing");
    assert_eq!(found.id, user.id);

    common::cleanup_user(&db, user.id).await;
}

#[tokio::test]
async fn test_user_profile_update() {
    let Some(db) = common::connect_or_skip().await else {
        return;
    };
    let users = UserRepository::new(db.clone());
    let user = common::make_user(&db).await;

    let updated = users
        .update_profile(user.id, "new-hash", "Renamed")
        .await
        .expect("update failed");
    assert_eq!(updated.password_hash, "new-hash");
    assert_eq!(updated.display_name, "Renamed");
    assert_eq!(updated.login, user.login);

    let missing = Uuid::new_v4();
    assert!(matches!(
        users.update_profile(missing, "x", "y").await,
        Err(LedgerError::UserNotFound(id)) if id == missing
    ));

    common::cleanup_user(&db, user.id).await;
}

#[tokio::test]
async fn test_card_name_unique_per_owner_even_when_inactive() {
    let Some(db) = common::connect_or_skip().await else {
        return;
    };
    let cards = CardRepository::new(db.clone());
    let lifecycle = subledger_db::repositories::LifecycleManager::new(db.clone());
    let user = common::make_user(&db).await;
    let other = common::make_user(&db).await;

    let name = format!("wallet-{}", Uuid::new_v4());
    let card = cards
        .create(user.id, &name, Some("daily spending"))
        .await
        .expect("create failed");
    assert!(card.is_active);
    assert_eq!(card.amount, Decimal::ZERO);

    // Deactivation does not free the name.
    lifecycle
        .deactivate_card(card.id, None)
        .await
        .expect("deactivate failed");
    let err = cards
        .create(user.id, &name, None)
        .await
        .expect_err("duplicate name must fail");
    assert!(matches!(err, LedgerError::UniquenessConflict(_)));

    // A different owner may reuse it.
    let theirs = cards
        .create(other.id, &name, None)
        .await
        .expect("create failed");
    assert_eq!(theirs.name, name);

    common::cleanup_user(&db, user.id).await;
    common::cleanup_user(&db, other.id).await;
}

#[tokio::test]
async fn test_card_listings_split_by_activity() {
    let Some(db) = common::connect_or_skip().await else {
        return;
    };
    let cards = CardRepository::new(db.clone());
    let lifecycle = subledger_db::repositories::LifecycleManager::new(db.clone());
    let user = common::make_user(&db).await;

    let first = common::make_card(&db, user.id, "first").await;
    let second = common::make_card(&db, user.id, "second").await;
    lifecycle
        .deactivate_card(second.id, None)
        .await
        .expect("deactivate failed");

    let active = cards
        .list_active_by_owner(user.id)
        .await
        .expect("query failed");
    assert_eq!(active.iter().map(|c| c.id).collect::<Vec<_>>(), vec![first.id]);

    let inactive = cards
        .list_inactive_by_owner(user.id)
        .await
        .expect("query failed");
    assert_eq!(
        inactive.iter().map(|c| c.id).collect::<Vec<_>>(),
        vec![second.id]
    );

    common::cleanup_user(&db, user.id).await;
}

#[tokio::test]
async fn test_card_rename() {
    let Some(db) = common::connect_or_skip().await else {
        return;
    };
    let cards = CardRepository::new(db.clone());
    let user = common::make_user(&db).await;
    let card = common::make_card(&db, user.id, "old-name").await;

    let new_name = format!("new-name-{}", Uuid::new_v4());
    let renamed = cards
        .update_details(card.id, &new_name, Some("fresh purpose"))
        .await
        .expect("rename failed");
    assert_eq!(renamed.name, new_name);
    assert_eq!(renamed.description.as_deref(), Some("fresh purpose"));

    common::cleanup_user(&db, user.id).await;
}

#[tokio::test]
async fn test_template_round_trip_and_delete() {
    let Some(db) = common::connect_or_skip().await else {
        return;
    };
    let templates = TemplateRepository::new(db.clone());
    let user = common::make_user(&db).await;

    let category_a = Uuid::new_v4();
    let category_b = Uuid::new_v4();
    let percents = Percents::from([(category_a, dec!(30)), (category_b, dec!(70))]);

    let template = templates
        .create(user.id, &percents, Some("salary split"))
        .await
        .expect("create failed");

    let decoded =
        TemplateRepository::decode_percents(&template).expect("stored percents must decode");
    assert_eq!(decoded, percents);

    let replacement = Percents::from([(category_a, dec!(100))]);
    let updated = templates
        .update(template.id, &replacement, None)
        .await
        .expect("update failed");
    assert_eq!(
        TemplateRepository::decode_percents(&updated).expect("decode failed"),
        replacement
    );

    let listed = templates.list_by_owner(user.id).await.expect("query failed");
    assert_eq!(listed.len(), 1);

    templates.delete(template.id).await.expect("delete failed");
    assert!(matches!(
        templates.delete(template.id).await,
        Err(LedgerError::TemplateNotFound(id)) if id == template.id
    ));

    common::cleanup_user(&db, user.id).await;
}

#[tokio::test]
async fn test_subcard_reads() {
    let Some(db) = common::connect_or_skip().await else {
        return;
    };
    let subcards = SubcardRepository::new(db.clone());
    let user = common::make_user(&db).await;
    let card = common::make_card(&db, user.id, "main").await;
    let food = common::make_category(&db, user.id, "food").await;
    let transport = common::make_category(&db, user.id, "transport").await;

    let registered = subcards
        .register(card.id, food.id, Some("groceries"))
        .await
        .expect("register failed");
    subcards
        .register(card.id, transport.id, None)
        .await
        .expect("register failed");

    let by_id = subcards
        .find_by_id(registered.id)
        .await
        .expect("query failed")
        .expect("subcard missing");
    assert_eq!(by_id.description.as_deref(), Some("groceries"));

    let listed = subcards
        .list_active_by_card(card.id)
        .await
        .expect("query failed");
    assert_eq!(listed.len(), 2);

    assert!(
        subcards
            .find_by_pair(card.id, Uuid::new_v4())
            .await
            .expect("query failed")
            .is_none()
    );

    common::cleanup_user(&db, user.id).await;
}
