//! Cooperative lifecycle endpoints: registration, platform review, joining.

use api_types::cooperative::{
    CooperativeNew, CooperativeView, JoinByCode, MemberView, MembersResponse,
};
use axum::extract::{Path, State};
use axum::{Extension, Json};
use chrono::Utc;
use engine::users;
use engine::{Cooperative, Member};
use uuid::Uuid;

use crate::ServerError;
use crate::server::ServerState;

pub(crate) fn view(cooperative: &Cooperative) -> CooperativeView {
    CooperativeView {
        id: cooperative.id,
        name: cooperative.name.clone(),
        code: cooperative.code.clone(),
        invite_code: cooperative.invite_code.clone(),
        status: cooperative.status.as_str().to_string(),
        max_members: cooperative.max_members,
        balance_minor: cooperative.balance_minor,
        leader: cooperative.leader_id.clone(),
    }
}

fn member_view(member: &Member) -> MemberView {
    MemberView {
        username: member.user_id.clone(),
        role: member.role.as_str().to_string(),
        joined_at: member.joined_at,
        contribution_minor: member.contribution_minor,
    }
}

pub async fn cooperative_new(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<CooperativeNew>,
) -> Result<Json<CooperativeView>, ServerError> {
    let cooperative = state
        .engine
        .register_cooperative(&payload.name, &user.username, payload.max_members, Utc::now())
        .await?;
    Ok(Json(view(&cooperative)))
}

pub async fn cooperative_get(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<CooperativeView>, ServerError> {
    let cooperative = state.engine.cooperative(id, &user.username).await?;
    Ok(Json(view(&cooperative)))
}

pub async fn cooperative_approve(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<CooperativeView>, ServerError> {
    let cooperative = state
        .engine
        .approve_cooperative(id, &user.username, Utc::now())
        .await?;
    Ok(Json(view(&cooperative)))
}

pub async fn cooperative_reject(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<CooperativeView>, ServerError> {
    let cooperative = state
        .engine
        .reject_cooperative(id, &user.username, Utc::now())
        .await?;
    Ok(Json(view(&cooperative)))
}

pub async fn join(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<JoinByCode>,
) -> Result<Json<MemberView>, ServerError> {
    let member = state
        .engine
        .join_by_invite_code(&payload.invite_code, &user.username, Utc::now())
        .await?;
    Ok(Json(member_view(&member)))
}

pub async fn members_get(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<MembersResponse>, ServerError> {
    // Membership check piggybacks on the cooperative read.
    state.engine.cooperative(id, &user.username).await?;
    let members = state.engine.members(id).await?;
    Ok(Json(MembersResponse {
        members: members.iter().map(member_view).collect(),
    }))
}
