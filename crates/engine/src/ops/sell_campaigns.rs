//! Group-sell campaign operations.

use chrono::{DateTime, Utc};
use sea_orm::{
    DatabaseTransaction, QueryFilter, QueryOrder, TransactionTrait, prelude::*, sea_query::Expr,
};
use uuid::Uuid;

use crate::{
    CreateSellCampaignCmd, EngineError, EntryKind, Money, ResultEngine, SellCampaign,
    SellContribution, sell_campaigns, sell_contributions,
};

use super::{Engine, normalize_optional_text, normalize_required_name, with_tx};

impl Engine {
    /// Creates an OPEN group-sell campaign. Cooperative campaigns are
    /// leader-only; platform-wide campaigns are admin-only.
    pub async fn create_sell_campaign(
        &self,
        cmd: CreateSellCampaignCmd,
        now: DateTime<Utc>,
    ) -> ResultEngine<SellCampaign> {
        let product_name = normalize_required_name(&cmd.product_name, "product")?;
        with_tx!(self, |db_tx| {
            match cmd.cooperative_id {
                Some(cooperative_id) => {
                    self.require_cooperative(&db_tx, cooperative_id).await?;
                    self.require_leader_or_admin(&db_tx, cooperative_id, &cmd.user_id)
                        .await?;
                }
                None => {
                    self.require_admin(&db_tx, &cmd.user_id).await?;
                }
            }

            let campaign = SellCampaign::new(
                cmd.cooperative_id,
                product_name.clone(),
                cmd.unit,
                cmd.min_price,
                cmd.target_quantity,
                cmd.deadline,
                cmd.user_id,
                now,
            )?;
            sell_campaigns::ActiveModel::from(&campaign)
                .insert(&db_tx)
                .await?;

            tracing::info!(
                campaign = %campaign.id,
                product = %product_name,
                "group-sell campaign opened"
            );
            Ok(campaign)
        })
    }

    /// Pledges `quantity` units toward an OPEN campaign; the OPEN → READY
    /// transition rides the same version-checked update as the quantity
    /// bump.
    pub async fn contribute_sell(
        &self,
        campaign_id: Uuid,
        user_id: &str,
        quantity: i64,
        notes: Option<&str>,
        now: DateTime<Utc>,
    ) -> ResultEngine<SellContribution> {
        let notes = normalize_optional_text(notes);
        with_tx!(self, |db_tx| {
            let model = self.require_sell_campaign(&db_tx, campaign_id).await?;
            let version = model.version;
            let mut campaign = SellCampaign::try_from(model)?;

            if let Some(cooperative_id) = campaign.cooperative_id {
                self.require_member(&db_tx, cooperative_id, user_id).await?;
            } else {
                self.require_user(&db_tx, user_id).await?;
            }

            let ready = campaign.register_contribution(quantity, now)?;
            self.store_sell_campaign(&db_tx, &campaign, version).await?;

            let contribution =
                SellContribution::new(campaign.id, user_id.to_string(), quantity, notes, now);
            sell_contributions::ActiveModel::from(&contribution)
                .insert(&db_tx)
                .await?;

            if ready {
                tracing::info!(
                    campaign = %campaign.id,
                    current = campaign.current_quantity,
                    target = campaign.target_quantity,
                    "group-sell campaign ready for sale"
                );
            }
            Ok(contribution)
        })
    }

    /// READY → SOLD: records the final price and buyer, and credits the
    /// proceeds to the fund as a SALE entry. Platform-wide campaigns have no
    /// fund; the sale is recorded on the campaign alone.
    pub async fn mark_sold(
        &self,
        campaign_id: Uuid,
        user_id: &str,
        final_price: Money,
        buyer_info: Option<&str>,
        now: DateTime<Utc>,
    ) -> ResultEngine<SellCampaign> {
        let buyer_info = normalize_optional_text(buyer_info);
        with_tx!(self, |db_tx| {
            let model = self.require_sell_campaign(&db_tx, campaign_id).await?;
            let version = model.version;
            let mut campaign = SellCampaign::try_from(model)?;

            match campaign.cooperative_id {
                Some(cooperative_id) => {
                    self.require_leader_or_admin(&db_tx, cooperative_id, user_id)
                        .await?;
                }
                None => {
                    self.require_admin(&db_tx, user_id).await?;
                }
            }

            campaign.mark_sold(user_id, final_price, buyer_info, now)?;

            if let Some(cooperative_id) = campaign.cooperative_id {
                let coop = self.require_cooperative(&db_tx, cooperative_id).await?;
                self.post_entry(
                    &db_tx,
                    &coop,
                    EntryKind::Sale,
                    final_price,
                    user_id,
                    Some(format!("group-sell proceeds: {}", campaign.product_name)),
                    now,
                )
                .await?;
            }

            self.store_sell_campaign(&db_tx, &campaign, version).await?;

            tracing::info!(campaign = %campaign.id, price = %final_price, "group-sell lot sold");
            Ok(campaign)
        })
    }

    /// OPEN/READY → CANCELLED by an admin or the owning cooperative's
    /// leader.
    pub async fn force_close_sell(
        &self,
        campaign_id: Uuid,
        user_id: &str,
        note: Option<&str>,
        now: DateTime<Utc>,
    ) -> ResultEngine<SellCampaign> {
        let note = normalize_optional_text(note);
        with_tx!(self, |db_tx| {
            let model = self.require_sell_campaign(&db_tx, campaign_id).await?;
            let version = model.version;
            let mut campaign = SellCampaign::try_from(model)?;

            match campaign.cooperative_id {
                Some(cooperative_id) => {
                    self.require_leader_or_admin(&db_tx, cooperative_id, user_id)
                        .await?;
                }
                None => {
                    self.require_admin(&db_tx, user_id).await?;
                }
            }

            campaign.force_close(user_id, note, now)?;
            self.store_sell_campaign(&db_tx, &campaign, version).await?;

            tracing::warn!(campaign = %campaign.id, by = user_id, "group-sell campaign cancelled");
            Ok(campaign)
        })
    }

    /// A campaign snapshot by id.
    pub async fn sell_campaign(&self, campaign_id: Uuid) -> ResultEngine<SellCampaign> {
        with_tx!(self, |db_tx| {
            let model = self.require_sell_campaign(&db_tx, campaign_id).await?;
            SellCampaign::try_from(model)
        })
    }

    /// Contributions of a campaign, oldest first.
    pub async fn sell_contributions(
        &self,
        campaign_id: Uuid,
    ) -> ResultEngine<Vec<SellContribution>> {
        with_tx!(self, |db_tx| {
            self.require_sell_campaign(&db_tx, campaign_id).await?;
            let models = sell_contributions::Entity::find()
                .filter(sell_contributions::Column::CampaignId.eq(campaign_id.to_string()))
                .order_by_asc(sell_contributions::Column::CreatedAt)
                .all(&db_tx)
                .await?;
            models
                .into_iter()
                .map(SellContribution::try_from)
                .collect()
        })
    }

    pub(super) async fn require_sell_campaign(
        &self,
        db: &DatabaseTransaction,
        campaign_id: Uuid,
    ) -> ResultEngine<sell_campaigns::Model> {
        sell_campaigns::Entity::find_by_id(campaign_id.to_string())
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("campaign not exists".to_string()))
    }

    pub(super) async fn store_sell_campaign(
        &self,
        db: &DatabaseTransaction,
        campaign: &SellCampaign,
        read_version: i64,
    ) -> ResultEngine<()> {
        let updated = sell_campaigns::Entity::update_many()
            .col_expr(
                sell_campaigns::Column::CurrentQuantity,
                Expr::value(campaign.current_quantity),
            )
            .col_expr(
                sell_campaigns::Column::Status,
                Expr::value(campaign.status.as_str()),
            )
            .col_expr(
                sell_campaigns::Column::FinalPriceMinor,
                Expr::value(campaign.final_price.map(Money::minor)),
            )
            .col_expr(
                sell_campaigns::Column::BuyerInfo,
                Expr::value(campaign.buyer_info.clone()),
            )
            .col_expr(
                sell_campaigns::Column::ClosedReason,
                Expr::value(campaign.closed_reason.map(|r| r.as_str())),
            )
            .col_expr(
                sell_campaigns::Column::ClosedBy,
                Expr::value(campaign.closed_by.clone()),
            )
            .col_expr(
                sell_campaigns::Column::ClosedAt,
                Expr::value(campaign.closed_at),
            )
            .col_expr(
                sell_campaigns::Column::CloseNote,
                Expr::value(campaign.close_note.clone()),
            )
            .col_expr(
                sell_campaigns::Column::Version,
                Expr::value(read_version + 1),
            )
            .filter(sell_campaigns::Column::Id.eq(campaign.id.to_string()))
            .filter(sell_campaigns::Column::Version.eq(read_version))
            .exec(db)
            .await?;
        if updated.rows_affected == 0 {
            return Err(EngineError::Conflict(
                "campaign was updated concurrently".to_string(),
            ));
        }
        Ok(())
    }
}
