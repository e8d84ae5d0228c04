use chrono::{Duration, Utc};

use engine::{
    BuyStatus, CloseReason, CreateBuyCampaignCmd, CreateSellCampaignCmd, EngineError, EntryKind,
    Money, SellStatus,
};
use sea_orm::DatabaseConnection;
use uuid::Uuid;

mod common;
use common::{engine_with_db, seed_admin, seed_user};

async fn approved_coop(engine: &engine::Engine, db: &DatabaseConnection) -> Uuid {
    seed_user(db, "alice", 2_000_000).await;
    seed_user(db, "bob", 2_000_000).await;
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
    coop.id
}

#[tokio::test]
async fn group_buy_runs_from_open_to_ordered() {
    let (engine, db) = engine_with_db().await;
    let coop_id = approved_coop(&engine, &db).await;
    engine
        .deposit(coop_id, "alice", Money::new(500_000), None, Utc::now())
        .await
        .unwrap();

    let cmd = CreateBuyCampaignCmd::new(
        "alice",
        "Fertilizer run",
        "shop-item-17",
        Money::new(20_000),
        Money::new(15_000),
        10,
    )
    .cooperative_id(coop_id);
    let campaign = engine.create_buy_campaign(cmd, Utc::now()).await.unwrap();
    assert_eq!(campaign.status, BuyStatus::Open);

    engine
        .contribute_buy(campaign.id, "alice", 8, Some("farm gate"), Utc::now())
        .await
        .unwrap();
    // The overshoot is accepted in full and completes the campaign.
    engine
        .contribute_buy(campaign.id, "bob", 3, None, Utc::now())
        .await
        .unwrap();

    let campaign = engine.buy_campaign(campaign.id).await.unwrap();
    assert_eq!(campaign.current_quantity, 11);
    assert_eq!(campaign.status, BuyStatus::Completed);
    assert_eq!(campaign.closed_reason, Some(CloseReason::AutoCompleted));

    // Completed campaigns accept no further pledges.
    let err = engine
        .contribute_buy(campaign.id, "bob", 1, None, Utc::now())
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidStatus(_)));

    let campaign = engine
        .place_order(campaign.id, "alice", Utc::now())
        .await
        .unwrap();
    assert_eq!(campaign.status, BuyStatus::Ordered);

    // 11 units at the wholesale price, charged to the fund.
    let entries = engine.ledger(coop_id, "alice").await.unwrap();
    let purchase = entries
        .iter()
        .find(|e| e.kind == EntryKind::Purchase)
        .unwrap();
    assert_eq!(purchase.amount, Money::new(165_000));
    assert_eq!(purchase.balance_after, Money::new(335_000));

    engine
        .record_order_ref(campaign.id, "alice", "PO-2031")
        .await
        .unwrap();
    let campaign = engine.buy_campaign(campaign.id).await.unwrap();
    assert_eq!(campaign.order_ref.as_deref(), Some("PO-2031"));

    let contributions = engine.buy_contributions(campaign.id).await.unwrap();
    assert_eq!(contributions.len(), 2);
    assert!(
        contributions
            .iter()
            .all(|c| c.order_ref.as_deref() == Some("PO-2031"))
    );
}

#[tokio::test]
async fn ordering_without_funds_fails_and_keeps_the_campaign() {
    let (engine, db) = engine_with_db().await;
    let coop_id = approved_coop(&engine, &db).await;

    let cmd = CreateBuyCampaignCmd::new(
        "alice",
        "Fertilizer run",
        "shop-item-17",
        Money::new(20_000),
        Money::new(15_000),
        2,
    )
    .cooperative_id(coop_id);
    let campaign = engine.create_buy_campaign(cmd, Utc::now()).await.unwrap();
    engine
        .contribute_buy(campaign.id, "bob", 2, None, Utc::now())
        .await
        .unwrap();

    let err = engine
        .place_order(campaign.id, "alice", Utc::now())
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InsufficientFunds(_)));

    // The rollback leaves the campaign ready for a retry.
    let campaign = engine.buy_campaign(campaign.id).await.unwrap();
    assert_eq!(campaign.status, BuyStatus::Completed);
}

#[tokio::test]
async fn members_cannot_open_campaigns() {
    let (engine, db) = engine_with_db().await;
    let coop_id = approved_coop(&engine, &db).await;

    let cmd = CreateBuyCampaignCmd::new(
        "bob",
        "Fertilizer run",
        "shop-item-17",
        Money::new(20_000),
        Money::new(15_000),
        10,
    )
    .cooperative_id(coop_id);
    let err = engine.create_buy_campaign(cmd, Utc::now()).await.unwrap_err();
    assert!(matches!(err, EngineError::Forbidden(_)));
}

#[tokio::test]
async fn group_sell_credits_the_fund_when_sold() {
    let (engine, db) = engine_with_db().await;
    let coop_id = approved_coop(&engine, &db).await;

    let cmd = CreateSellCampaignCmd::new("alice", "Rice", "kg", Money::new(800_000), 50)
        .cooperative_id(coop_id);
    let campaign = engine.create_sell_campaign(cmd, Utc::now()).await.unwrap();

    engine
        .contribute_sell(campaign.id, "alice", 30, None, Utc::now())
        .await
        .unwrap();
    engine
        .contribute_sell(campaign.id, "bob", 20, Some("late harvest"), Utc::now())
        .await
        .unwrap();

    let campaign = engine.sell_campaign(campaign.id).await.unwrap();
    assert_eq!(campaign.status, SellStatus::Ready);

    // Selling under the agreed floor is refused.
    let err = engine
        .mark_sold(campaign.id, "alice", Money::new(700_000), None, Utc::now())
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidAmount(_)));

    let campaign = engine
        .mark_sold(
            campaign.id,
            "alice",
            Money::new(1_000_000),
            Some("wholesale market"),
            Utc::now(),
        )
        .await
        .unwrap();
    assert_eq!(campaign.status, SellStatus::Sold);
    assert_eq!(campaign.final_price, Some(Money::new(1_000_000)));

    let entries = engine.ledger(coop_id, "alice").await.unwrap();
    let sale = entries.iter().find(|e| e.kind == EntryKind::Sale).unwrap();
    assert_eq!(sale.amount, Money::new(1_000_000));
}

#[tokio::test]
async fn force_close_needs_leader_or_admin() {
    let (engine, db) = engine_with_db().await;
    let coop_id = approved_coop(&engine, &db).await;

    let cmd = CreateBuyCampaignCmd::new(
        "alice",
        "Fertilizer run",
        "shop-item-17",
        Money::new(20_000),
        Money::new(15_000),
        10,
    )
    .cooperative_id(coop_id);
    let campaign = engine.create_buy_campaign(cmd, Utc::now()).await.unwrap();

    let err = engine
        .force_close_buy(campaign.id, "bob", Some("nope"), Utc::now())
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Forbidden(_)));

    let campaign = engine
        .force_close_buy(campaign.id, "root", Some("supplier folded"), Utc::now())
        .await
        .unwrap();
    assert_eq!(campaign.status, BuyStatus::Cancelled);
    assert_eq!(campaign.closed_reason, Some(CloseReason::AdminForced));
    assert_eq!(campaign.close_note.as_deref(), Some("supplier folded"));
}

#[tokio::test]
async fn sweep_expires_campaigns_past_their_deadline() {
    let (engine, db) = engine_with_db().await;
    let coop_id = approved_coop(&engine, &db).await;

    let past = Utc::now() - Duration::hours(1);
    let cmd = CreateBuyCampaignCmd::new(
        "alice",
        "Fertilizer run",
        "shop-item-17",
        Money::new(20_000),
        Money::new(15_000),
        10,
    )
    .cooperative_id(coop_id)
    .deadline(past);
    let stale = engine.create_buy_campaign(cmd, Utc::now()).await.unwrap();

    let cmd = CreateSellCampaignCmd::new("alice", "Rice", "kg", Money::new(800_000), 50)
        .cooperative_id(coop_id);
    let fresh = engine.create_sell_campaign(cmd, Utc::now()).await.unwrap();

    let report = engine.sweep_expired(Utc::now()).await.unwrap();
    assert_eq!(report.expired, 1);
    assert_eq!(report.skipped, 0);

    let stale = engine.buy_campaign(stale.id).await.unwrap();
    assert_eq!(stale.status, BuyStatus::Expired);
    assert_eq!(stale.closed_reason, Some(CloseReason::Expired));
    let fresh = engine.sell_campaign(fresh.id).await.unwrap();
    assert_eq!(fresh.status, SellStatus::Open);

    // A second pass finds nothing left to expire.
    let report = engine.sweep_expired(Utc::now()).await.unwrap();
    assert_eq!(report.expired, 0);
}

#[tokio::test]
async fn simultaneous_contributions_complete_the_campaign_exactly_once() {
    let (engine, db) = engine_with_db().await;
    let coop_id = approved_coop(&engine, &db).await;

    let cmd = CreateBuyCampaignCmd::new(
        "alice",
        "Seed order",
        "shop-item-3",
        Money::new(20_000),
        Money::new(15_000),
        10,
    )
    .cooperative_id(coop_id);
    let campaign = engine.create_buy_campaign(cmd, Utc::now()).await.unwrap();

    let (first, second) = tokio::join!(
        engine.contribute_buy(campaign.id, "alice", 6, None, Utc::now()),
        engine.contribute_buy(campaign.id, "bob", 6, None, Utc::now()),
    );
    first.unwrap();
    second.unwrap();

    let campaign = engine.buy_campaign(campaign.id).await.unwrap();
    assert_eq!(campaign.status, BuyStatus::Completed);
    assert_eq!(campaign.closed_reason, Some(CloseReason::AutoCompleted));
    assert_eq!(campaign.current_quantity, 12);

    // The cached quantity stays in lockstep with the pledge rows.
    let pledged: i64 = engine
        .buy_contributions(campaign.id)
        .await
        .unwrap()
        .iter()
        .map(|c| c.quantity)
        .sum();
    assert_eq!(pledged, campaign.current_quantity);

    // The crossing pledge closed the campaign; a late one bounces off it.
    let err = engine
        .contribute_buy(campaign.id, "alice", 1, None, Utc::now())
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidStatus(_)));
}
