//! Cooperative registry: registration, admin review, membership joins.

use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveValue, DatabaseTransaction, PaginatorTrait, QueryFilter, QueryOrder, TransactionTrait,
    prelude::*, sea_query::Expr,
};
use uuid::Uuid;

use crate::{
    Cooperative, CooperativeStatus, EngineError, Member, MemberRole, ResultEngine, cooperatives,
    members,
};

use super::{Engine, normalize_required_name, with_tx};

/// Unambiguous alphabet for invite codes (no 0/O, 1/I).
const INVITE_CODE_CHARSET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";
const INVITE_CODE_LEN: usize = 6;

fn generate_invite_code() -> String {
    Uuid::new_v4()
        .as_bytes()
        .iter()
        .take(INVITE_CODE_LEN)
        .map(|b| INVITE_CODE_CHARSET[*b as usize % INVITE_CODE_CHARSET.len()] as char)
        .collect()
}

impl Engine {
    /// Registers a PENDING cooperative and enrolls the founder as its leader.
    pub async fn register_cooperative(
        &self,
        name: &str,
        leader_id: &str,
        max_members: i32,
        now: DateTime<Utc>,
    ) -> ResultEngine<Cooperative> {
        let name = normalize_required_name(name, "cooperative")?;
        with_tx!(self, |db_tx| {
            self.require_user(&db_tx, leader_id).await?;

            let duplicate = cooperatives::Entity::find()
                .filter(Expr::cust("LOWER(name)").eq(name.to_lowercase()))
                .one(&db_tx)
                .await?;
            if duplicate.is_some() {
                return Err(EngineError::ExistingKey(name));
            }

            let count = cooperatives::Entity::find().count(&db_tx).await?;
            let code = format!("HTX-{:04}", count + 1);

            let coop = Cooperative::new(name, code, leader_id.to_string(), max_members, now)?;
            cooperatives::ActiveModel::from(&coop).insert(&db_tx).await?;

            let leader = Member::new(coop.id, leader_id.to_string(), MemberRole::Leader, now);
            members::ActiveModel::from(&leader).insert(&db_tx).await?;

            tracing::info!(code = %coop.code, leader = leader_id, "cooperative registered");
            Ok(coop)
        })
    }

    /// Admin review: PENDING → APPROVED, stamps the audit fields and issues
    /// an invite code.
    pub async fn approve_cooperative(
        &self,
        cooperative_id: Uuid,
        admin: &str,
        now: DateTime<Utc>,
    ) -> ResultEngine<Cooperative> {
        with_tx!(self, |db_tx| {
            self.require_admin(&db_tx, admin).await?;
            let model = self.require_cooperative(&db_tx, cooperative_id).await?;
            self.review_cooperative(&db_tx, model, CooperativeStatus::Approved, admin, now)
                .await
        })
    }

    /// Admin review: PENDING → REJECTED.
    pub async fn reject_cooperative(
        &self,
        cooperative_id: Uuid,
        admin: &str,
        now: DateTime<Utc>,
    ) -> ResultEngine<Cooperative> {
        with_tx!(self, |db_tx| {
            self.require_admin(&db_tx, admin).await?;
            let model = self.require_cooperative(&db_tx, cooperative_id).await?;
            self.review_cooperative(&db_tx, model, CooperativeStatus::Rejected, admin, now)
                .await
        })
    }

    async fn review_cooperative(
        &self,
        db: &DatabaseTransaction,
        model: cooperatives::Model,
        verdict: CooperativeStatus,
        admin: &str,
        now: DateTime<Utc>,
    ) -> ResultEngine<Cooperative> {
        if CooperativeStatus::try_from(model.status.as_str())? != CooperativeStatus::Pending {
            return Err(EngineError::InvalidStatus(format!(
                "cooperative {} is not pending review",
                model.code
            )));
        }

        let invite_code = match verdict {
            CooperativeStatus::Approved => Some(generate_invite_code()),
            _ => None,
        };

        let mut active = cooperatives::ActiveModel {
            id: ActiveValue::Set(model.id.clone()),
            status: ActiveValue::Set(verdict.as_str().to_string()),
            approved_at: ActiveValue::Set(Some(now)),
            approved_by: ActiveValue::Set(Some(admin.to_string())),
            ..Default::default()
        };
        if invite_code.is_some() {
            active.invite_code = ActiveValue::Set(invite_code);
        }
        let updated = active.update(db).await?;

        tracing::info!(code = %updated.code, verdict = verdict.as_str(), "cooperative reviewed");
        Cooperative::try_from(updated)
    }

    /// Joins an APPROVED cooperative through its invite code.
    pub async fn join_by_invite_code(
        &self,
        invite_code: &str,
        user_id: &str,
        now: DateTime<Utc>,
    ) -> ResultEngine<Member> {
        let invite_code = invite_code.trim().to_uppercase();
        with_tx!(self, |db_tx| {
            self.require_user(&db_tx, user_id).await?;

            let model = cooperatives::Entity::find()
                .filter(cooperatives::Column::InviteCode.eq(invite_code.clone()))
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound("invite code not exists".to_string()))?;

            if CooperativeStatus::try_from(model.status.as_str())? != CooperativeStatus::Approved {
                return Err(EngineError::InvalidStatus(
                    "cooperative is not accepting members".to_string(),
                ));
            }

            let cooperative_id = Uuid::parse_str(&model.id)
                .map_err(|_| EngineError::KeyNotFound("cooperative not exists".to_string()))?;
            if self
                .find_membership(&db_tx, cooperative_id, user_id)
                .await?
                .is_some()
            {
                return Err(EngineError::ExistingKey(user_id.to_string()));
            }

            let member_count = members::Entity::find()
                .filter(members::Column::CooperativeId.eq(model.id.clone()))
                .count(&db_tx)
                .await?;
            if member_count >= model.max_members as u64 {
                return Err(EngineError::InvalidStatus(format!(
                    "cooperative {} is full",
                    model.code
                )));
            }

            let member = Member::new(cooperative_id, user_id.to_string(), MemberRole::Member, now);
            members::ActiveModel::from(&member).insert(&db_tx).await?;

            tracing::info!(code = %model.code, user = user_id, "member joined");
            Ok(member)
        })
    }

    /// A cooperative's membership roster, oldest members first.
    pub async fn members(&self, cooperative_id: Uuid) -> ResultEngine<Vec<Member>> {
        with_tx!(self, |db_tx| {
            self.require_cooperative(&db_tx, cooperative_id).await?;
            let models = members::Entity::find()
                .filter(members::Column::CooperativeId.eq(cooperative_id.to_string()))
                .order_by_asc(members::Column::JoinedAt)
                .all(&db_tx)
                .await?;
            models.into_iter().map(Member::try_from).collect()
        })
    }

    /// A cooperative by id, as seen by one of its members.
    pub async fn cooperative(
        &self,
        cooperative_id: Uuid,
        user_id: &str,
    ) -> ResultEngine<Cooperative> {
        with_tx!(self, |db_tx| {
            let model = self.require_cooperative(&db_tx, cooperative_id).await?;
            self.require_member(&db_tx, cooperative_id, user_id)
                .await?;
            Cooperative::try_from(model)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invite_codes_use_the_unambiguous_charset() {
        for _ in 0..50 {
            let code = generate_invite_code();
            assert_eq!(code.len(), INVITE_CODE_LEN);
            assert!(code.bytes().all(|b| INVITE_CODE_CHARSET.contains(&b)));
        }
    }
}
