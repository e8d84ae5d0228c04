//! Group-buy and group-sell campaign endpoints.

use api_types::campaign::{
    BuyCampaignNew, CampaignView, Contribute, ForceClose, MarkSold, OrderRef, SellCampaignNew,
};
use axum::extract::{Path, State};
use axum::{Extension, Json};
use chrono::Utc;
use engine::users;
use engine::{
    BuyCampaign, CreateBuyCampaignCmd, CreateSellCampaignCmd, EngineError, Money, SellCampaign,
};
use serde::Serialize;
use uuid::Uuid;

use crate::ServerError;
use crate::server::ServerState;

fn buy_view(campaign: &BuyCampaign) -> CampaignView {
    CampaignView {
        id: campaign.id,
        cooperative_id: campaign.cooperative_id,
        title: campaign.title.clone(),
        status: campaign.status.as_str().to_string(),
        target_quantity: campaign.target_quantity,
        current_quantity: campaign.current_quantity,
        deadline: campaign.deadline,
        closed_reason: campaign.closed_reason.map(|reason| reason.as_str().to_string()),
    }
}

fn sell_view(campaign: &SellCampaign) -> CampaignView {
    CampaignView {
        id: campaign.id,
        cooperative_id: campaign.cooperative_id,
        title: campaign.product_name.clone(),
        status: campaign.status.as_str().to_string(),
        target_quantity: campaign.target_quantity,
        current_quantity: campaign.current_quantity,
        deadline: campaign.deadline,
        closed_reason: campaign.closed_reason.map(|reason| reason.as_str().to_string()),
    }
}

pub async fn buy_new(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<BuyCampaignNew>,
) -> Result<Json<CampaignView>, ServerError> {
    let mut cmd = CreateBuyCampaignCmd::new(
        &user.username,
        &payload.title,
        &payload.shop_item_ref,
        Money::new(payload.retail_price_minor),
        Money::new(payload.wholesale_price_minor),
        payload.target_quantity,
    );
    if let Some(cooperative_id) = payload.cooperative_id {
        cmd = cmd.cooperative_id(cooperative_id);
    }
    if let Some(deadline) = payload.deadline {
        cmd = cmd.deadline(deadline);
    }
    let campaign = state.engine.create_buy_campaign(cmd, Utc::now()).await?;
    Ok(Json(buy_view(&campaign)))
}

pub async fn buy_get(
    Extension(_user): Extension<users::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<CampaignView>, ServerError> {
    let campaign = state.engine.buy_campaign(id).await?;
    Ok(Json(buy_view(&campaign)))
}

pub async fn buy_contribute(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<Contribute>,
) -> Result<Json<CampaignView>, ServerError> {
    state
        .engine
        .contribute_buy(
            id,
            &user.username,
            payload.quantity,
            payload.shipping_address.as_deref(),
            Utc::now(),
        )
        .await?;
    let campaign = state.engine.buy_campaign(id).await?;
    Ok(Json(buy_view(&campaign)))
}

pub async fn buy_order(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<CampaignView>, ServerError> {
    let campaign = state.engine.place_order(id, &user.username, Utc::now()).await?;
    Ok(Json(buy_view(&campaign)))
}

pub async fn buy_order_ref(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<OrderRef>,
) -> Result<Json<CampaignView>, ServerError> {
    state
        .engine
        .record_order_ref(id, &user.username, &payload.order_ref)
        .await?;
    let campaign = state.engine.buy_campaign(id).await?;
    Ok(Json(buy_view(&campaign)))
}

pub async fn buy_close(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ForceClose>,
) -> Result<Json<CampaignView>, ServerError> {
    let campaign = state
        .engine
        .force_close_buy(id, &user.username, payload.note.as_deref(), Utc::now())
        .await?;
    Ok(Json(buy_view(&campaign)))
}

pub async fn sell_new(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<SellCampaignNew>,
) -> Result<Json<CampaignView>, ServerError> {
    let mut cmd = CreateSellCampaignCmd::new(
        &user.username,
        &payload.product_name,
        &payload.unit,
        Money::new(payload.min_price_minor),
        payload.target_quantity,
    );
    if let Some(cooperative_id) = payload.cooperative_id {
        cmd = cmd.cooperative_id(cooperative_id);
    }
    if let Some(deadline) = payload.deadline {
        cmd = cmd.deadline(deadline);
    }
    let campaign = state.engine.create_sell_campaign(cmd, Utc::now()).await?;
    Ok(Json(sell_view(&campaign)))
}

pub async fn sell_get(
    Extension(_user): Extension<users::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<CampaignView>, ServerError> {
    let campaign = state.engine.sell_campaign(id).await?;
    Ok(Json(sell_view(&campaign)))
}

pub async fn sell_contribute(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<Contribute>,
) -> Result<Json<CampaignView>, ServerError> {
    state
        .engine
        .contribute_sell(
            id,
            &user.username,
            payload.quantity,
            payload.notes.as_deref(),
            Utc::now(),
        )
        .await?;
    let campaign = state.engine.sell_campaign(id).await?;
    Ok(Json(sell_view(&campaign)))
}

pub async fn sell_sold(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<MarkSold>,
) -> Result<Json<CampaignView>, ServerError> {
    let campaign = state
        .engine
        .mark_sold(
            id,
            &user.username,
            Money::new(payload.final_price_minor),
            payload.buyer_info.as_deref(),
            Utc::now(),
        )
        .await?;
    Ok(Json(sell_view(&campaign)))
}

pub async fn sell_close(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ForceClose>,
) -> Result<Json<CampaignView>, ServerError> {
    let campaign = state
        .engine
        .force_close_sell(id, &user.username, payload.note.as_deref(), Utc::now())
        .await?;
    Ok(Json(sell_view(&campaign)))
}

#[derive(Debug, Serialize)]
pub struct PledgeView {
    pub user: String,
    pub quantity: i64,
    pub shipping_address: Option<String>,
    pub notes: Option<String>,
    pub order_ref: Option<String>,
}

pub async fn buy_contributions_get(
    Extension(_user): Extension<users::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<PledgeView>>, ServerError> {
    let contributions = state.engine.buy_contributions(id).await?;
    Ok(Json(
        contributions
            .into_iter()
            .map(|c| PledgeView {
                user: c.user_id,
                quantity: c.quantity,
                shipping_address: c.shipping_address,
                notes: None,
                order_ref: c.order_ref,
            })
            .collect(),
    ))
}

pub async fn sell_contributions_get(
    Extension(_user): Extension<users::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<PledgeView>>, ServerError> {
    let contributions = state.engine.sell_contributions(id).await?;
    Ok(Json(
        contributions
            .into_iter()
            .map(|c| PledgeView {
                user: c.user_id,
                quantity: c.quantity,
                shipping_address: None,
                notes: c.notes,
                order_ref: None,
            })
            .collect(),
    ))
}

#[derive(Debug, Serialize)]
pub struct SweepView {
    pub expired: usize,
    pub skipped: usize,
}

/// Expires campaigns past their deadline. Admin-only maintenance hook;
/// deployments without a scheduler call it from cron.
pub async fn sweep_expired(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
) -> Result<Json<SweepView>, ServerError> {
    if !user.is_admin {
        return Err(ServerError::Engine(EngineError::Forbidden(
            "admin privileges required".to_string(),
        )));
    }
    let report = state.engine.sweep_expired(Utc::now()).await?;
    Ok(Json(SweepView {
        expired: report.expired,
        skipped: report.skipped,
    }))
}
