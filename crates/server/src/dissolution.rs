//! Cooperative dissolution endpoints.

use api_types::dissolution::{DissolutionNew, DissolutionResolve, DissolutionView};
use axum::extract::{Path, State};
use axum::{Extension, Json};
use chrono::Utc;
use engine::DissolutionRequest;
use engine::users;
use uuid::Uuid;

use crate::ServerError;
use crate::server::ServerState;

fn view(request: &DissolutionRequest) -> DissolutionView {
    DissolutionView {
        id: request.id,
        cooperative_id: request.cooperative_id,
        requested_by: request.requested_by.clone(),
        status: request.status.as_str().to_string(),
        admin_note: request.admin_note.clone(),
    }
}

pub async fn dissolution_new(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<DissolutionNew>,
) -> Result<Json<DissolutionView>, ServerError> {
    let request = state
        .engine
        .request_dissolution(id, &user.username, &payload.reason, Utc::now())
        .await?;
    Ok(Json(view(&request)))
}

pub async fn dissolution_resolve(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<DissolutionResolve>,
) -> Result<Json<DissolutionView>, ServerError> {
    let request = state
        .engine
        .resolve_dissolution(
            id,
            &user.username,
            payload.approve,
            payload.note.as_deref(),
            Utc::now(),
        )
        .await?;
    Ok(Json(view(&request)))
}
