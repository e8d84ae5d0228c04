//! Shared inventory pool endpoints.

use api_types::inventory::{
    ClaimEarnings, ContributionView, InventoryAdd, InventoryWithdraw, ItemView,
};
use axum::extract::{Path, State};
use axum::{Extension, Json};
use chrono::Utc;
use engine::users;
use engine::{AddInventoryCmd, InventoryContribution, InventoryItem, Money, ProductType};
use serde::Serialize;
use uuid::Uuid;

use crate::ServerError;
use crate::server::ServerState;

fn item_view(item: &InventoryItem) -> ItemView {
    ItemView {
        id: item.id,
        product_name: item.product_name.clone(),
        product_type: item.product_type.as_str().to_string(),
        unit: item.unit.clone(),
        quantity: item.quantity,
        total_value_minor: item.total_value.minor(),
    }
}

fn contribution_view(contribution: &InventoryContribution) -> ContributionView {
    ContributionView {
        id: contribution.id,
        user: contribution.user_id.clone(),
        quantity: contribution.quantity,
        earnings_minor: contribution.earnings.map(Money::minor),
        is_claimed: contribution.is_claimed,
    }
}

pub async fn inventory_add(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<InventoryAdd>,
) -> Result<Json<ContributionView>, ServerError> {
    let product_type = ProductType::try_from(payload.product_type.as_str())?;
    let mut cmd = AddInventoryCmd::new(
        id,
        &user.username,
        product_type,
        &payload.product_ref,
        &payload.product_name,
        &payload.unit,
        payload.quantity,
        Money::new(payload.value_minor),
    );
    if let Some(campaign_id) = payload.campaign_id {
        cmd = cmd.campaign_id(campaign_id);
    }
    if let Some(notes) = payload.notes {
        cmd = cmd.notes(notes);
    }
    let contribution = state.engine.add_inventory(cmd, Utc::now()).await?;
    Ok(Json(contribution_view(&contribution)))
}

pub async fn inventory_get(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<ItemView>>, ServerError> {
    let items = state.engine.inventory(id, &user.username).await?;
    Ok(Json(items.iter().map(item_view).collect()))
}

#[derive(Debug, Serialize)]
pub struct WithdrawnView {
    pub removed_value_minor: i64,
}

pub async fn inventory_withdraw(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<InventoryWithdraw>,
) -> Result<Json<WithdrawnView>, ServerError> {
    let removed = state
        .engine
        .withdraw_inventory(id, &user.username, payload.quantity, Utc::now())
        .await?;
    Ok(Json(WithdrawnView {
        removed_value_minor: removed.minor(),
    }))
}

pub async fn contributions_get(
    Extension(_user): Extension<users::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<ContributionView>>, ServerError> {
    let contributions = state.engine.inventory_contributions(id).await?;
    Ok(Json(contributions.iter().map(contribution_view).collect()))
}

#[derive(Debug, Serialize)]
pub struct ClaimedView {
    pub earnings_minor: i64,
}

pub async fn claim_earnings(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ClaimEarnings>,
) -> Result<Json<ClaimedView>, ServerError> {
    let earnings = state
        .engine
        .claim_earnings(
            id,
            &user.username,
            Money::new(payload.total_proceeds_minor),
            Utc::now(),
        )
        .await?;
    Ok(Json(ClaimedView {
        earnings_minor: earnings.minor(),
    }))
}
