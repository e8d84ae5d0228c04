//! Fund ledger endpoints.

use api_types::ledger::{EntryView, FundMovement, LedgerResponse};
use axum::extract::{Path, State};
use axum::{Extension, Json};
use chrono::Utc;
use engine::users;
use engine::{LedgerEntry, Money};
use serde::Serialize;
use uuid::Uuid;

use crate::ServerError;
use crate::server::ServerState;

fn entry_view(entry: &LedgerEntry) -> EntryView {
    EntryView {
        id: entry.id.unwrap_or_default(),
        kind: entry.kind.as_str().to_string(),
        amount_minor: entry.amount.minor(),
        balance_after_minor: entry.balance_after.minor(),
        actor: entry.actor_id.clone(),
        description: entry.description.clone(),
        created_at: entry.created_at,
    }
}

pub async fn deposit(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<FundMovement>,
) -> Result<Json<EntryView>, ServerError> {
    let entry = state
        .engine
        .deposit(
            id,
            &user.username,
            Money::new(payload.amount_minor),
            payload.description.as_deref(),
            Utc::now(),
        )
        .await?;
    Ok(Json(entry_view(&entry)))
}

pub async fn withdraw(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<FundMovement>,
) -> Result<Json<EntryView>, ServerError> {
    let entry = state
        .engine
        .withdraw(
            id,
            &user.username,
            Money::new(payload.amount_minor),
            payload.description.as_deref(),
            Utc::now(),
        )
        .await?;
    Ok(Json(entry_view(&entry)))
}

pub async fn ledger_get(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<LedgerResponse>, ServerError> {
    let entries = state.engine.ledger(id, &user.username).await?;
    Ok(Json(LedgerResponse {
        entries: entries.iter().map(entry_view).collect(),
    }))
}

#[derive(Debug, Serialize)]
pub struct BalanceView {
    pub balance_minor: i64,
}

pub async fn recompute_balance(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<BalanceView>, ServerError> {
    let balance = state.engine.recompute_balance(id, &user.username).await?;
    Ok(Json(BalanceView {
        balance_minor: balance.minor(),
    }))
}
