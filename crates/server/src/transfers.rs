//! Peer transfer endpoints.

use api_types::transfer::{TransferNew, TransferReject, TransferView};
use axum::extract::{Path, State};
use axum::{Extension, Json};
use chrono::Utc;
use engine::users;
use engine::{Money, TransferRequest};
use uuid::Uuid;

use crate::ServerError;
use crate::server::ServerState;

fn view(transfer: &TransferRequest) -> TransferView {
    TransferView {
        id: transfer.id,
        sender: transfer.sender_id.clone(),
        receiver: transfer.receiver_id.clone(),
        amount_minor: transfer.amount.minor(),
        status: transfer.status.as_str().to_string(),
        requires_verification: transfer.requires_verification,
    }
}

pub async fn transfer_new(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<TransferNew>,
) -> Result<Json<TransferView>, ServerError> {
    let transfer = state
        .engine
        .request_transfer(
            &user.username,
            &payload.receiver,
            Money::new(payload.amount_minor),
            Utc::now(),
        )
        .await?;
    Ok(Json(view(&transfer)))
}

pub async fn awaiting_review_get(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
) -> Result<Json<Vec<TransferView>>, ServerError> {
    let transfers = state.engine.transfers_awaiting_review(&user.username).await?;
    Ok(Json(transfers.iter().map(view).collect()))
}

pub async fn transfer_approve(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<TransferView>, ServerError> {
    let transfer = state
        .engine
        .approve_transfer(id, &user.username, Utc::now())
        .await?;
    Ok(Json(view(&transfer)))
}

pub async fn transfer_reject(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<TransferReject>,
) -> Result<Json<TransferView>, ServerError> {
    let transfer = state
        .engine
        .reject_transfer(id, &user.username, &payload.reason, Utc::now())
        .await?;
    Ok(Json(view(&transfer)))
}

pub async fn transfer_cancel(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<TransferView>, ServerError> {
    let transfer = state
        .engine
        .cancel_transfer(id, &user.username, Utc::now())
        .await?;
    Ok(Json(view(&transfer)))
}
