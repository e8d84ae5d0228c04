use chrono::Utc;

use engine::{EngineError, EntryKind, Money};

mod common;
use common::{engine_with_db, seed_admin, seed_user, user_balance};

#[tokio::test]
async fn deposit_and_withdraw_move_the_shared_fund() {
    let (engine, db) = engine_with_db().await;
    seed_user(&db, "alice", 500_000).await;
    seed_user(&db, "bob", 200_000).await;
    seed_admin(&db, "root").await;

    let coop = engine
        .register_cooperative("Green Farm", "alice", 10, Utc::now())
        .await
        .unwrap();
    let coop = engine
        .approve_cooperative(coop.id, "root", Utc::now())
        .await
        .unwrap();
    let code = coop.invite_code.clone().unwrap();
    engine
        .join_by_invite_code(&code, "bob", Utc::now())
        .await
        .unwrap();

    let entry = engine
        .deposit(coop.id, "bob", Money::new(150_000), Some("seed"), Utc::now())
        .await
        .unwrap();
    assert_eq!(entry.kind, EntryKind::Deposit);
    assert_eq!(entry.balance_after, Money::new(150_000));
    assert_eq!(user_balance(&db, "bob").await, 50_000);

    let entry = engine
        .withdraw(
            coop.id,
            "alice",
            Money::new(100_000),
            Some("seedlings"),
            Utc::now(),
        )
        .await
        .unwrap();
    assert_eq!(entry.kind, EntryKind::Withdrawal);
    assert_eq!(entry.balance_after, Money::new(50_000));
    assert_eq!(user_balance(&db, "alice").await, 600_000);

    let entries = engine.ledger(coop.id, "bob").await.unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].kind, EntryKind::Deposit);
    assert_eq!(entries[1].kind, EntryKind::Withdrawal);

    let balance = engine.recompute_balance(coop.id, "root").await.unwrap();
    assert_eq!(balance, Money::new(50_000));
}

#[tokio::test]
async fn overdraft_withdrawal_is_rejected() {
    let (engine, db) = engine_with_db().await;
    seed_user(&db, "alice", 100_000).await;
    seed_admin(&db, "root").await;

    let coop = engine
        .register_cooperative("Green Farm", "alice", 10, Utc::now())
        .await
        .unwrap();
    engine
        .approve_cooperative(coop.id, "root", Utc::now())
        .await
        .unwrap();
    engine
        .deposit(coop.id, "alice", Money::new(50_000), None, Utc::now())
        .await
        .unwrap();

    let err = engine
        .withdraw(coop.id, "alice", Money::new(80_000), None, Utc::now())
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InsufficientFunds(_)));

    // Nothing was recorded and nothing moved.
    let entries = engine.ledger(coop.id, "alice").await.unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(user_balance(&db, "alice").await, 50_000);
}

#[tokio::test]
async fn only_the_leader_may_withdraw() {
    let (engine, db) = engine_with_db().await;
    seed_user(&db, "alice", 200_000).await;
    seed_user(&db, "bob", 200_000).await;
    seed_admin(&db, "root").await;

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
        .deposit(coop.id, "alice", Money::new(100_000), None, Utc::now())
        .await
        .unwrap();

    let err = engine
        .withdraw(coop.id, "bob", Money::new(10_000), None, Utc::now())
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Forbidden(_)));
}

#[tokio::test]
async fn outsiders_cannot_read_the_ledger() {
    let (engine, db) = engine_with_db().await;
    seed_user(&db, "alice", 0).await;
    seed_user(&db, "mallory", 0).await;
    seed_admin(&db, "root").await;

    let coop = engine
        .register_cooperative("Green Farm", "alice", 10, Utc::now())
        .await
        .unwrap();
    engine
        .approve_cooperative(coop.id, "root", Utc::now())
        .await
        .unwrap();

    let err = engine.ledger(coop.id, "mallory").await.unwrap_err();
    assert!(matches!(err, EngineError::Forbidden(_)));
}

#[tokio::test]
async fn duplicate_cooperative_name_is_rejected() {
    let (engine, db) = engine_with_db().await;
    seed_user(&db, "alice", 0).await;
    seed_user(&db, "bob", 0).await;

    engine
        .register_cooperative("Green Farm", "alice", 10, Utc::now())
        .await
        .unwrap();
    let err = engine
        .register_cooperative("green farm", "bob", 10, Utc::now())
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::ExistingKey(_)));
}

#[tokio::test]
async fn join_requires_an_approved_cooperative() {
    let (engine, db) = engine_with_db().await;
    seed_user(&db, "alice", 0).await;
    seed_user(&db, "bob", 0).await;
    seed_admin(&db, "root").await;

    let pending = engine
        .register_cooperative("Green Farm", "alice", 10, Utc::now())
        .await
        .unwrap();
    // No invite code exists before approval.
    assert!(pending.invite_code.is_none());

    let coop = engine
        .approve_cooperative(pending.id, "root", Utc::now())
        .await
        .unwrap();
    let code = coop.invite_code.clone().unwrap();

    engine
        .join_by_invite_code(&code, "bob", Utc::now())
        .await
        .unwrap();
    let err = engine
        .join_by_invite_code(&code, "bob", Utc::now())
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::ExistingKey(_)));

    let members = engine.members(coop.id).await.unwrap();
    assert_eq!(members.len(), 2);
}
