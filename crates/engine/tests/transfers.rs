use chrono::Utc;

use engine::{Engine, EngineError, Money, TransferStatus};

mod common;
use common::{engine_with_db, seed_admin, seed_user, user_balance};

#[tokio::test]
async fn small_transfers_settle_immediately() {
    let (engine, db) = engine_with_db().await;
    seed_user(&db, "alice", 2_000_000).await;
    seed_user(&db, "bob", 0).await;

    let transfer = engine
        .request_transfer("alice", "bob", Money::new(500_000), Utc::now())
        .await
        .unwrap();
    assert_eq!(transfer.status, TransferStatus::Completed);
    assert!(!transfer.requires_verification);
    assert!(transfer.processed_at.is_some());

    assert_eq!(user_balance(&db, "alice").await, 1_500_000);
    assert_eq!(user_balance(&db, "bob").await, 500_000);
}

#[tokio::test]
async fn large_transfers_wait_for_admin_approval() {
    let (engine, db) = engine_with_db().await;
    seed_user(&db, "alice", 2_000_000).await;
    seed_user(&db, "bob", 0).await;
    seed_admin(&db, "root").await;

    let transfer = engine
        .request_transfer("alice", "bob", Money::new(1_500_000), Utc::now())
        .await
        .unwrap();
    assert_eq!(transfer.status, TransferStatus::AwaitingAdmin);
    assert!(transfer.requires_verification);

    // Nothing moves until the admin signs off.
    assert_eq!(user_balance(&db, "alice").await, 2_000_000);
    assert_eq!(user_balance(&db, "bob").await, 0);

    let queue = engine.transfers_awaiting_review("root").await.unwrap();
    assert_eq!(queue.len(), 1);
    assert_eq!(queue[0].id, transfer.id);

    let transfer = engine
        .approve_transfer(transfer.id, "root", Utc::now())
        .await
        .unwrap();
    assert_eq!(transfer.status, TransferStatus::Approved);
    assert!(transfer.status.is_settled());
    assert_eq!(user_balance(&db, "alice").await, 500_000);
    assert_eq!(user_balance(&db, "bob").await, 1_500_000);

    // An already-settled transfer cannot be approved twice.
    let err = engine
        .approve_transfer(transfer.id, "root", Utc::now())
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidStatus(_)));
}

#[tokio::test]
async fn rejection_leaves_balances_untouched() {
    let (engine, db) = engine_with_db().await;
    seed_user(&db, "alice", 2_000_000).await;
    seed_user(&db, "bob", 0).await;
    seed_admin(&db, "root").await;

    let transfer = engine
        .request_transfer("alice", "bob", Money::new(1_500_000), Utc::now())
        .await
        .unwrap();
    let transfer = engine
        .reject_transfer(transfer.id, "root", "unverified receiver", Utc::now())
        .await
        .unwrap();
    assert_eq!(transfer.status, TransferStatus::Rejected);
    assert_eq!(
        transfer.rejection_reason.as_deref(),
        Some("unverified receiver")
    );

    assert_eq!(user_balance(&db, "alice").await, 2_000_000);
    assert_eq!(user_balance(&db, "bob").await, 0);
}

#[tokio::test]
async fn only_the_sender_may_cancel() {
    let (engine, db) = engine_with_db().await;
    seed_user(&db, "alice", 2_000_000).await;
    seed_user(&db, "bob", 0).await;

    let transfer = engine
        .request_transfer("alice", "bob", Money::new(1_500_000), Utc::now())
        .await
        .unwrap();

    let err = engine
        .cancel_transfer(transfer.id, "bob", Utc::now())
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Forbidden(_)));

    let transfer = engine
        .cancel_transfer(transfer.id, "alice", Utc::now())
        .await
        .unwrap();
    assert_eq!(transfer.status, TransferStatus::Cancelled);
}

#[tokio::test]
async fn transfers_validate_sender_funds_and_counterparty() {
    let (engine, db) = engine_with_db().await;
    seed_user(&db, "alice", 100).await;
    seed_user(&db, "bob", 0).await;

    let err = engine
        .request_transfer("bob", "alice", Money::new(100), Utc::now())
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InsufficientFunds(_)));

    let err = engine
        .request_transfer("alice", "alice", Money::new(100), Utc::now())
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidAmount(_)));

    let err = engine
        .request_transfer("alice", "ghost", Money::new(100), Utc::now())
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));
}

#[tokio::test]
async fn review_threshold_is_configurable() {
    let (_engine, db) = engine_with_db().await;
    seed_user(&db, "alice", 10_000).await;
    seed_user(&db, "bob", 0).await;

    let engine = Engine::builder()
        .database(db.clone())
        .transfer_review_threshold(Money::new(1_000))
        .build()
        .await
        .unwrap();

    let transfer = engine
        .request_transfer("alice", "bob", Money::new(1_000), Utc::now())
        .await
        .unwrap();
    assert_eq!(transfer.status, TransferStatus::AwaitingAdmin);

    let transfer = engine
        .request_transfer("alice", "bob", Money::new(999), Utc::now())
        .await
        .unwrap();
    assert_eq!(transfer.status, TransferStatus::Completed);
}

#[tokio::test]
async fn review_queue_is_admin_only() {
    let (engine, db) = engine_with_db().await;
    seed_user(&db, "alice", 0).await;

    let err = engine.transfers_awaiting_review("alice").await.unwrap_err();
    assert!(matches!(err, EngineError::Forbidden(_)));
}
