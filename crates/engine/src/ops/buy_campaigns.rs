//! Group-buy campaign operations.

use chrono::{DateTime, Utc};
use sea_orm::{
    DatabaseTransaction, QueryFilter, QueryOrder, TransactionTrait, prelude::*, sea_query::Expr,
};
use uuid::Uuid;

use crate::{
    BuyCampaign, BuyContribution, CreateBuyCampaignCmd, EngineError, EntryKind, ResultEngine,
    buy_campaigns, buy_contributions,
};

use super::{Engine, normalize_optional_text, normalize_required_name, with_tx};

impl Engine {
    /// Creates an OPEN group-buy campaign. Cooperative campaigns are
    /// leader-only; platform-wide campaigns (no owning cooperative) are
    /// admin-only.
    pub async fn create_buy_campaign(
        &self,
        cmd: CreateBuyCampaignCmd,
        now: DateTime<Utc>,
    ) -> ResultEngine<BuyCampaign> {
        let title = normalize_required_name(&cmd.title, "campaign")?;
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

            let campaign = BuyCampaign::new(
                cmd.cooperative_id,
                title.clone(),
                cmd.shop_item_ref,
                cmd.retail_price,
                cmd.wholesale_price,
                cmd.target_quantity,
                cmd.deadline,
                cmd.user_id,
                now,
            )?;
            buy_campaigns::ActiveModel::from(&campaign)
                .insert(&db_tx)
                .await?;

            tracing::info!(campaign = %campaign.id, title = %title, "group-buy campaign opened");
            Ok(campaign)
        })
    }

    /// Pledges `quantity` units toward an OPEN campaign. The quantity bump
    /// and the OPEN → COMPLETED transition (when the target is crossed) land
    /// in one version-checked update, so concurrent contributions cannot
    /// double-fire the transition.
    pub async fn contribute_buy(
        &self,
        campaign_id: Uuid,
        user_id: &str,
        quantity: i64,
        shipping_address: Option<&str>,
        now: DateTime<Utc>,
    ) -> ResultEngine<BuyContribution> {
        let shipping_address = normalize_optional_text(shipping_address);
        with_tx!(self, |db_tx| {
            let model = self.require_buy_campaign(&db_tx, campaign_id).await?;
            let version = model.version;
            let mut campaign = BuyCampaign::try_from(model)?;

            if let Some(cooperative_id) = campaign.cooperative_id {
                self.require_member(&db_tx, cooperative_id, user_id).await?;
            } else {
                self.require_user(&db_tx, user_id).await?;
            }

            let completed = campaign.register_contribution(quantity, now)?;
            self.store_buy_campaign(&db_tx, &campaign, version).await?;

            let contribution = BuyContribution::new(
                campaign.id,
                user_id.to_string(),
                quantity,
                shipping_address,
                now,
            );
            buy_contributions::ActiveModel::from(&contribution)
                .insert(&db_tx)
                .await?;

            if completed {
                // Notification hook: the fulfillment side watches for this.
                tracing::info!(
                    campaign = %campaign.id,
                    current = campaign.current_quantity,
                    target = campaign.target_quantity,
                    "group-buy campaign completed"
                );
            }
            Ok(contribution)
        })
    }

    /// COMPLETED → ORDERED: charges the pooled wholesale total to the fund
    /// as a PURCHASE entry. Platform-wide campaigns have no fund to charge
    /// and just record the transition.
    pub async fn place_order(
        &self,
        campaign_id: Uuid,
        user_id: &str,
        now: DateTime<Utc>,
    ) -> ResultEngine<BuyCampaign> {
        with_tx!(self, |db_tx| {
            let model = self.require_buy_campaign(&db_tx, campaign_id).await?;
            let version = model.version;
            let mut campaign = BuyCampaign::try_from(model)?;

            match campaign.cooperative_id {
                Some(cooperative_id) => {
                    self.require_leader_or_admin(&db_tx, cooperative_id, user_id)
                        .await?;
                }
                None => {
                    self.require_admin(&db_tx, user_id).await?;
                }
            }

            let total = campaign.order_total()?;
            campaign.mark_ordered(user_id, now)?;

            if let Some(cooperative_id) = campaign.cooperative_id {
                let coop = self.require_cooperative(&db_tx, cooperative_id).await?;
                self.post_entry(
                    &db_tx,
                    &coop,
                    EntryKind::Purchase,
                    total,
                    user_id,
                    Some(format!("group-buy order: {}", campaign.title)),
                    now,
                )
                .await?;
            }

            self.store_buy_campaign(&db_tx, &campaign, version).await?;

            tracing::info!(campaign = %campaign.id, total = %total, "group-buy order placed");
            Ok(campaign)
        })
    }

    /// Stamps the order id reported back by the fulfillment collaborator on
    /// the campaign and all of its contributions.
    pub async fn record_order_ref(
        &self,
        campaign_id: Uuid,
        user_id: &str,
        order_ref: &str,
    ) -> ResultEngine<()> {
        let order_ref = normalize_required_name(order_ref, "order reference")?;
        with_tx!(self, |db_tx| {
            let model = self.require_buy_campaign(&db_tx, campaign_id).await?;
            let campaign = BuyCampaign::try_from(model)?;

            match campaign.cooperative_id {
                Some(cooperative_id) => {
                    self.require_leader_or_admin(&db_tx, cooperative_id, user_id)
                        .await?;
                }
                None => {
                    self.require_admin(&db_tx, user_id).await?;
                }
            }
            if campaign.status != crate::BuyStatus::Ordered {
                return Err(EngineError::InvalidStatus(
                    "order reference requires an ordered campaign".to_string(),
                ));
            }

            buy_campaigns::Entity::update_many()
                .col_expr(
                    buy_campaigns::Column::OrderRef,
                    Expr::value(Some(order_ref.clone())),
                )
                .filter(buy_campaigns::Column::Id.eq(campaign_id.to_string()))
                .exec(&db_tx)
                .await?;
            buy_contributions::Entity::update_many()
                .col_expr(
                    buy_contributions::Column::OrderRef,
                    Expr::value(Some(order_ref)),
                )
                .filter(buy_contributions::Column::CampaignId.eq(campaign_id.to_string()))
                .exec(&db_tx)
                .await?;
            Ok(())
        })
    }

    /// OPEN → CANCELLED by an admin or the owning cooperative's leader.
    /// Contributions are retained for the refund side to process.
    pub async fn force_close_buy(
        &self,
        campaign_id: Uuid,
        user_id: &str,
        note: Option<&str>,
        now: DateTime<Utc>,
    ) -> ResultEngine<BuyCampaign> {
        let note = normalize_optional_text(note);
        with_tx!(self, |db_tx| {
            let model = self.require_buy_campaign(&db_tx, campaign_id).await?;
            let version = model.version;
            let mut campaign = BuyCampaign::try_from(model)?;

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
            self.store_buy_campaign(&db_tx, &campaign, version).await?;

            tracing::warn!(campaign = %campaign.id, by = user_id, "group-buy campaign cancelled");
            Ok(campaign)
        })
    }

    /// A campaign snapshot by id.
    pub async fn buy_campaign(&self, campaign_id: Uuid) -> ResultEngine<BuyCampaign> {
        with_tx!(self, |db_tx| {
            let model = self.require_buy_campaign(&db_tx, campaign_id).await?;
            BuyCampaign::try_from(model)
        })
    }

    /// Contributions of a campaign, oldest first.
    pub async fn buy_contributions(
        &self,
        campaign_id: Uuid,
    ) -> ResultEngine<Vec<BuyContribution>> {
        with_tx!(self, |db_tx| {
            self.require_buy_campaign(&db_tx, campaign_id).await?;
            let models = buy_contributions::Entity::find()
                .filter(buy_contributions::Column::CampaignId.eq(campaign_id.to_string()))
                .order_by_asc(buy_contributions::Column::CreatedAt)
                .all(&db_tx)
                .await?;
            models.into_iter().map(BuyContribution::try_from).collect()
        })
    }

    pub(super) async fn require_buy_campaign(
        &self,
        db: &DatabaseTransaction,
        campaign_id: Uuid,
    ) -> ResultEngine<buy_campaigns::Model> {
        buy_campaigns::Entity::find_by_id(campaign_id.to_string())
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("campaign not exists".to_string()))
    }

    /// Persists the mutable campaign fields under the optimistic version
    /// check taken when the row was read.
    pub(super) async fn store_buy_campaign(
        &self,
        db: &DatabaseTransaction,
        campaign: &BuyCampaign,
        read_version: i64,
    ) -> ResultEngine<()> {
        let updated = buy_campaigns::Entity::update_many()
            .col_expr(
                buy_campaigns::Column::CurrentQuantity,
                Expr::value(campaign.current_quantity),
            )
            .col_expr(
                buy_campaigns::Column::Status,
                Expr::value(campaign.status.as_str()),
            )
            .col_expr(
                buy_campaigns::Column::ClosedReason,
                Expr::value(campaign.closed_reason.map(|r| r.as_str())),
            )
            .col_expr(
                buy_campaigns::Column::ClosedBy,
                Expr::value(campaign.closed_by.clone()),
            )
            .col_expr(
                buy_campaigns::Column::ClosedAt,
                Expr::value(campaign.closed_at),
            )
            .col_expr(
                buy_campaigns::Column::CloseNote,
                Expr::value(campaign.close_note.clone()),
            )
            .col_expr(
                buy_campaigns::Column::Version,
                Expr::value(read_version + 1),
            )
            .filter(buy_campaigns::Column::Id.eq(campaign.id.to_string()))
            .filter(buy_campaigns::Column::Version.eq(read_version))
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

#[cfg(test)]
mod tests {
    use migration::MigratorTrait;
    use sea_orm::{ConnectionTrait, Database, Statement};

    use super::*;
    use crate::Money;

    async fn engine_with_admin() -> Engine {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        migration::Migrator::up(&db, None).await.unwrap();
        db.execute(Statement::from_sql_and_values(
            db.get_database_backend(),
            "INSERT INTO users (username, password, is_admin) VALUES (?, ?, TRUE)",
            vec!["root".into(), "password".into()],
        ))
        .await
        .unwrap();
        Engine::builder().database(db).build().await.unwrap()
    }

    #[tokio::test]
    async fn losing_a_version_race_surfaces_a_conflict() {
        let engine = engine_with_admin().await;
        let cmd = CreateBuyCampaignCmd::new(
            "root",
            "Platform seed order",
            "shop-item-3",
            Money::new(20_000),
            Money::new(15_000),
            100,
        );
        let created = engine.create_buy_campaign(cmd, Utc::now()).await.unwrap();

        // Read the row as a racing writer would, then lose the race to a
        // contribution that bumps the version underneath it.
        let db_tx = engine.database.begin().await.unwrap();
        let model = engine.require_buy_campaign(&db_tx, created.id).await.unwrap();
        db_tx.commit().await.unwrap();
        let read_version = model.version;
        let mut stale = BuyCampaign::try_from(model).unwrap();

        engine
            .contribute_buy(created.id, "root", 5, None, Utc::now())
            .await
            .unwrap();

        stale.register_contribution(3, Utc::now()).unwrap();
        let db_tx = engine.database.begin().await.unwrap();
        let err = engine
            .store_buy_campaign(&db_tx, &stale, read_version)
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::Conflict(_)));
        drop(db_tx);

        // The winning write is untouched by the rejected one.
        let campaign = engine.buy_campaign(created.id).await.unwrap();
        assert_eq!(campaign.current_quantity, 5);
        assert_eq!(campaign.status, crate::BuyStatus::Open);
    }
}
