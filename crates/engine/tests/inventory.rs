use chrono::Utc;

use engine::{AddInventoryCmd, EngineError, EntryKind, Money, ProductType};
use sea_orm::DatabaseConnection;
use uuid::Uuid;

mod common;
use common::{engine_with_db, seed_admin, seed_user, user_balance};

async fn coop_with_pooled_rice(
    engine: &engine::Engine,
    db: &DatabaseConnection,
) -> (Uuid, Uuid, Uuid, Uuid) {
    seed_user(db, "alice", 2_000_000).await;
    seed_user(db, "bob", 100_000).await;
    seed_admin(db, "root").await;

    let coop = engine
        .register_cooperative("Green Farm", "alice", 10, Utc::now())
        .await
        .unwrap();
    let coop = engine
        .approve_cooperative(coop.id, "root", Utc::now())
        .await
        .unwrap();
    engine
        .join_by_invite_code(&coop.invite_code.clone().unwrap(), "bob", Utc::now())
        .await
        .unwrap();
    engine
        .deposit(coop.id, "alice", Money::new(1_000_000), None, Utc::now())
        .await
        .unwrap();

    let cmd = AddInventoryCmd::new(
        coop.id,
        "alice",
        ProductType::Crop,
        "rice-st25",
        "Rice ST25",
        "kg",
        30,
        Money::new(60_000),
    );
    let from_alice = engine.add_inventory(cmd, Utc::now()).await.unwrap();

    let cmd = AddInventoryCmd::new(
        coop.id,
        "bob",
        ProductType::Crop,
        "rice-st25",
        "Rice ST25",
        "kg",
        70,
        Money::new(140_000),
    )
    .notes("late harvest");
    let from_bob = engine.add_inventory(cmd, Utc::now()).await.unwrap();

    assert_eq!(from_alice.item_id, from_bob.item_id);
    (coop.id, from_alice.item_id, from_alice.id, from_bob.id)
}

#[tokio::test]
async fn contributions_pool_into_one_item() {
    let (engine, db) = engine_with_db().await;
    let (coop_id, item_id, _, _) = coop_with_pooled_rice(&engine, &db).await;

    let items = engine.inventory(coop_id, "alice").await.unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].id, item_id);
    assert_eq!(items[0].quantity, 100);
    assert_eq!(items[0].total_value, Money::new(200_000));

    // Stock movements show in the ledger without touching the fund.
    let entries = engine.ledger(coop_id, "alice").await.unwrap();
    let pooled: Vec<_> = entries
        .iter()
        .filter(|e| e.kind == EntryKind::ContributeProduct)
        .collect();
    assert_eq!(pooled.len(), 2);
    assert_eq!(entries.last().unwrap().balance_after, Money::new(1_000_000));
}

#[tokio::test]
async fn earnings_split_proportionally_with_remainder_to_the_last_claim() {
    let (engine, db) = engine_with_db().await;
    let (coop_id, _item_id, alice_contribution, bob_contribution) =
        coop_with_pooled_rice(&engine, &db).await;

    let earnings = engine
        .claim_earnings(
            alice_contribution,
            "alice",
            Money::new(1_000_000),
            Utc::now(),
        )
        .await
        .unwrap();
    assert_eq!(earnings, Money::new(300_000));

    let earnings = engine
        .claim_earnings(bob_contribution, "bob", Money::new(1_000_000), Utc::now())
        .await
        .unwrap();
    assert_eq!(earnings, Money::new(700_000));

    assert_eq!(user_balance(&db, "alice").await, 1_300_000);
    assert_eq!(user_balance(&db, "bob").await, 800_000);

    // Both claims were debited from the fund.
    let balance = engine.recompute_balance(coop_id, "root").await.unwrap();
    assert_eq!(balance, Money::new(0));

    let err = engine
        .claim_earnings(
            alice_contribution,
            "alice",
            Money::new(1_000_000),
            Utc::now(),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::AlreadyClaimed(_)));
}

#[tokio::test]
async fn only_the_contributor_may_claim() {
    let (engine, db) = engine_with_db().await;
    let (_coop_id, _item_id, alice_contribution, _) = coop_with_pooled_rice(&engine, &db).await;

    let err = engine
        .claim_earnings(alice_contribution, "bob", Money::new(1_000_000), Utc::now())
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Forbidden(_)));
}

#[tokio::test]
async fn withdrawal_removes_a_proportional_slice_of_value() {
    let (engine, db) = engine_with_db().await;
    let (coop_id, item_id, _, _) = coop_with_pooled_rice(&engine, &db).await;

    let err = engine
        .withdraw_inventory(item_id, "bob", 40, Utc::now())
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Forbidden(_)));

    let err = engine
        .withdraw_inventory(item_id, "alice", 150, Utc::now())
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InsufficientStock(_)));

    let removed = engine
        .withdraw_inventory(item_id, "alice", 40, Utc::now())
        .await
        .unwrap();
    assert_eq!(removed, Money::new(80_000));

    let items = engine.inventory(coop_id, "alice").await.unwrap();
    assert_eq!(items[0].quantity, 60);
    assert_eq!(items[0].total_value, Money::new(120_000));
}
