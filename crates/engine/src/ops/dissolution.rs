//! Cooperative dissolution workflow.

use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveValue, QueryFilter, TransactionTrait, prelude::*,
};
use uuid::Uuid;

use crate::{
    BuyCampaign, BuyStatus, CooperativeStatus, DissolutionRequest, DissolutionStatus, EngineError,
    Money, ResultEngine, SellCampaign, SellStatus, buy_campaigns, cooperatives, dissolutions,
    sell_campaigns,
};

use super::{Engine, normalize_optional_text, normalize_required_name, with_tx};

impl Engine {
    /// Files a dissolution request. Leader-only; a cooperative may have at
    /// most one pending request at a time.
    pub async fn request_dissolution(
        &self,
        cooperative_id: Uuid,
        user_id: &str,
        reason: &str,
        now: DateTime<Utc>,
    ) -> ResultEngine<DissolutionRequest> {
        let reason = normalize_required_name(reason, "dissolution reason")?;
        with_tx!(self, |db_tx| {
            let coop = self.require_cooperative(&db_tx, cooperative_id).await?;
            self.require_leader(&db_tx, cooperative_id, user_id).await?;

            if CooperativeStatus::try_from(coop.status.as_str())? != CooperativeStatus::Approved {
                return Err(EngineError::InvalidStatus(
                    "only an approved cooperative can be dissolved".to_string(),
                ));
            }

            let pending = dissolutions::Entity::find()
                .filter(dissolutions::Column::CooperativeId.eq(cooperative_id.to_string()))
                .filter(dissolutions::Column::Status.eq(DissolutionStatus::Pending.as_str()))
                .one(&db_tx)
                .await?;
            if pending.is_some() {
                return Err(EngineError::DuplicateRequest(format!(
                    "cooperative {} already has a pending dissolution request",
                    coop.code
                )));
            }

            let request =
                DissolutionRequest::new(cooperative_id, user_id.to_string(), reason, now);
            dissolutions::ActiveModel::from(&request)
                .insert(&db_tx)
                .await?;

            tracing::info!(code = %coop.code, by = user_id, "dissolution requested");
            Ok(request)
        })
    }

    /// Admin decision on a pending request. Approval runs the ordered
    /// cascade: every OPEN/READY campaign of the cooperative is force-closed,
    /// the cooperative becomes DISSOLVED, its invite code is revoked and any
    /// remaining fund balance is flagged for external payout. Rejection
    /// records the note only.
    pub async fn resolve_dissolution(
        &self,
        request_id: Uuid,
        admin: &str,
        approve: bool,
        note: Option<&str>,
        now: DateTime<Utc>,
    ) -> ResultEngine<DissolutionRequest> {
        let note = normalize_optional_text(note);
        with_tx!(self, |db_tx| {
            self.require_admin(&db_tx, admin).await?;

            let model = dissolutions::Entity::find_by_id(request_id.to_string())
                .one(&db_tx)
                .await?
                .ok_or_else(|| {
                    EngineError::KeyNotFound("dissolution request not exists".to_string())
                })?;
            let mut request = DissolutionRequest::try_from(model)?;
            request.resolve(admin, approve, note, now)?;

            dissolutions::ActiveModel {
                id: ActiveValue::Set(request.id.to_string()),
                status: ActiveValue::Set(request.status.as_str().to_string()),
                admin_note: ActiveValue::Set(request.admin_note.clone()),
                processed_by: ActiveValue::Set(request.processed_by.clone()),
                processed_at: ActiveValue::Set(request.processed_at),
                ..Default::default()
            }
            .update(&db_tx)
            .await?;

            if approve {
                let coop = self
                    .require_cooperative(&db_tx, request.cooperative_id)
                    .await?;

                // Ordered cascade, each step explicit.
                let open_buys = buy_campaigns::Entity::find()
                    .filter(
                        buy_campaigns::Column::CooperativeId
                            .eq(request.cooperative_id.to_string()),
                    )
                    .filter(buy_campaigns::Column::Status.eq(BuyStatus::Open.as_str()))
                    .all(&db_tx)
                    .await?;
                for model in open_buys {
                    let version = model.version;
                    let mut campaign = BuyCampaign::try_from(model)?;
                    campaign.force_close(admin, Some("cooperative dissolved".to_string()), now)?;
                    self.store_buy_campaign(&db_tx, &campaign, version).await?;
                }

                let open_sells = sell_campaigns::Entity::find()
                    .filter(
                        sell_campaigns::Column::CooperativeId
                            .eq(request.cooperative_id.to_string()),
                    )
                    .filter(
                        sell_campaigns::Column::Status.is_in([
                            SellStatus::Open.as_str(),
                            SellStatus::Ready.as_str(),
                        ]),
                    )
                    .all(&db_tx)
                    .await?;
                for model in open_sells {
                    let version = model.version;
                    let mut campaign = SellCampaign::try_from(model)?;
                    campaign.force_close(admin, Some("cooperative dissolved".to_string()), now)?;
                    self.store_sell_campaign(&db_tx, &campaign, version).await?;
                }

                cooperatives::ActiveModel {
                    id: ActiveValue::Set(coop.id.clone()),
                    status: ActiveValue::Set(CooperativeStatus::Dissolved.as_str().to_string()),
                    invite_code: ActiveValue::Set(None),
                    ..Default::default()
                }
                .update(&db_tx)
                .await?;

                if coop.balance_minor > 0 {
                    // Payout happens outside this core; the remainder is
                    // surfaced for whoever runs it.
                    tracing::warn!(
                        code = %coop.code,
                        balance = %Money::new(coop.balance_minor),
                        "dissolved cooperative holds a remaining fund balance"
                    );
                }
                tracing::info!(code = %coop.code, by = admin, "cooperative dissolved");
            }

            Ok(request)
        })
    }
}
