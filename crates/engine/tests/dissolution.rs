use chrono::Utc;

use engine::{
    BuyStatus, CloseReason, CooperativeStatus, CreateBuyCampaignCmd, CreateSellCampaignCmd,
    DissolutionStatus, EngineError, Money, SellStatus,
};
use sea_orm::DatabaseConnection;
use uuid::Uuid;

mod common;
use common::{engine_with_db, seed_admin, seed_user};

async fn approved_coop(engine: &engine::Engine, db: &DatabaseConnection) -> (Uuid, String) {
    seed_user(db, "alice", 1_000_000).await;
    seed_user(db, "bob", 1_000_000).await;
    seed_admin(db, "root").await;

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
    (coop.id, code)
}

#[tokio::test]
async fn only_the_leader_may_request_dissolution() {
    let (engine, db) = engine_with_db().await;
    let (coop_id, _) = approved_coop(&engine, &db).await;

    let err = engine
        .request_dissolution(coop_id, "bob", "bad harvest", Utc::now())
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Forbidden(_)));

    let request = engine
        .request_dissolution(coop_id, "alice", "bad harvest", Utc::now())
        .await
        .unwrap();
    assert_eq!(request.status, DissolutionStatus::Pending);

    let err = engine
        .request_dissolution(coop_id, "alice", "still bad", Utc::now())
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::DuplicateRequest(_)));
}

#[tokio::test]
async fn rejection_keeps_the_cooperative_running() {
    let (engine, db) = engine_with_db().await;
    let (coop_id, _) = approved_coop(&engine, &db).await;

    let request = engine
        .request_dissolution(coop_id, "alice", "bad harvest", Utc::now())
        .await
        .unwrap();

    let err = engine
        .resolve_dissolution(request.id, "bob", false, None, Utc::now())
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Forbidden(_)));

    let request = engine
        .resolve_dissolution(
            request.id,
            "root",
            false,
            Some("work it out first"),
            Utc::now(),
        )
        .await
        .unwrap();
    assert_eq!(request.status, DissolutionStatus::Rejected);
    assert_eq!(request.admin_note.as_deref(), Some("work it out first"));

    let coop = engine.cooperative(coop_id, "alice").await.unwrap();
    assert_eq!(coop.status, CooperativeStatus::Approved);
}

#[tokio::test]
async fn approval_closes_campaigns_and_revokes_the_invite_code() {
    let (engine, db) = engine_with_db().await;
    let (coop_id, code) = approved_coop(&engine, &db).await;

    let cmd = CreateBuyCampaignCmd::new(
        "alice",
        "Fertilizer run",
        "shop-item-17",
        Money::new(20_000),
        Money::new(15_000),
        10,
    )
    .cooperative_id(coop_id);
    let buy = engine.create_buy_campaign(cmd, Utc::now()).await.unwrap();

    let cmd = CreateSellCampaignCmd::new("alice", "Rice", "kg", Money::new(800_000), 50)
        .cooperative_id(coop_id);
    let sell = engine.create_sell_campaign(cmd, Utc::now()).await.unwrap();
    engine
        .contribute_sell(sell.id, "bob", 50, None, Utc::now())
        .await
        .unwrap();

    let request = engine
        .request_dissolution(coop_id, "alice", "bad harvest", Utc::now())
        .await
        .unwrap();
    let request = engine
        .resolve_dissolution(request.id, "root", true, None, Utc::now())
        .await
        .unwrap();
    assert_eq!(request.status, DissolutionStatus::Approved);

    let coop = engine.cooperative(coop_id, "alice").await.unwrap();
    assert_eq!(coop.status, CooperativeStatus::Dissolved);
    assert!(coop.invite_code.is_none());

    let buy = engine.buy_campaign(buy.id).await.unwrap();
    assert_eq!(buy.status, BuyStatus::Cancelled);
    assert_eq!(buy.closed_reason, Some(CloseReason::AdminForced));
    assert_eq!(buy.close_note.as_deref(), Some("cooperative dissolved"));

    // READY campaigns are swept up by the same cascade.
    let sell = engine.sell_campaign(sell.id).await.unwrap();
    assert_eq!(sell.status, SellStatus::Cancelled);

    let err = engine
        .join_by_invite_code(&code, "bob", Utc::now())
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));
}

#[tokio::test]
async fn pending_cooperatives_cannot_be_dissolved() {
    let (engine, db) = engine_with_db().await;
    seed_user(&db, "alice", 0).await;

    let coop = engine
        .register_cooperative("Green Farm", "alice", 10, Utc::now())
        .await
        .unwrap();
    let err = engine
        .request_dissolution(coop.id, "alice", "never mind", Utc::now())
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidStatus(_)));
}
