//! Background expiry sweep for both campaign variants.

use chrono::{DateTime, Utc};
use sea_orm::{QueryFilter, TransactionTrait, prelude::*};

use crate::{
    BuyCampaign, BuyStatus, EngineError, ResultEngine, SellCampaign, SellStatus, buy_campaigns,
    sell_campaigns,
};

use super::{Engine, with_tx};

/// Outcome of one sweep pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SweepReport {
    pub expired: usize,
    pub skipped: usize,
}

impl Engine {
    /// Scans OPEN campaigns past their deadline and transitions each to
    /// EXPIRED. Idempotent: already-terminal campaigns are left alone. A
    /// failure on one campaign (typically a lost version race with a
    /// concurrent contribution) is logged and skipped so it cannot block the
    /// rest of the sweep.
    pub async fn sweep_expired(&self, now: DateTime<Utc>) -> ResultEngine<SweepReport> {
        let mut report = SweepReport::default();

        let buy_models = with_tx!(self, |db_tx| {
            buy_campaigns::Entity::find()
                .filter(buy_campaigns::Column::Status.eq(BuyStatus::Open.as_str()))
                .filter(buy_campaigns::Column::Deadline.lte(now))
                .all(&db_tx)
                .await
                .map_err(EngineError::from)
        })?;

        for model in buy_models {
            let id = model.id.clone();
            match self.expire_buy_campaign(model, now).await {
                Ok(true) => report.expired += 1,
                Ok(false) => {}
                Err(err) => {
                    report.skipped += 1;
                    tracing::warn!(campaign = %id, error = %err, "sweep skipped group-buy campaign");
                }
            }
        }

        let sell_models = with_tx!(self, |db_tx| {
            sell_campaigns::Entity::find()
                .filter(sell_campaigns::Column::Status.eq(SellStatus::Open.as_str()))
                .filter(sell_campaigns::Column::Deadline.lte(now))
                .all(&db_tx)
                .await
                .map_err(EngineError::from)
        })?;

        for model in sell_models {
            let id = model.id.clone();
            match self.expire_sell_campaign(model, now).await {
                Ok(true) => report.expired += 1,
                Ok(false) => {}
                Err(err) => {
                    report.skipped += 1;
                    tracing::warn!(campaign = %id, error = %err, "sweep skipped group-sell campaign");
                }
            }
        }

        if report.expired > 0 || report.skipped > 0 {
            tracing::info!(
                expired = report.expired,
                skipped = report.skipped,
                "campaign expiry sweep finished"
            );
        }
        Ok(report)
    }

    async fn expire_buy_campaign(
        &self,
        model: buy_campaigns::Model,
        now: DateTime<Utc>,
    ) -> ResultEngine<bool> {
        with_tx!(self, |db_tx| {
            let version = model.version;
            let mut campaign = BuyCampaign::try_from(model)?;
            if !campaign.expire(now) {
                return Ok(false);
            }
            self.store_buy_campaign(&db_tx, &campaign, version).await?;
            Ok(true)
        })
    }

    async fn expire_sell_campaign(
        &self,
        model: sell_campaigns::Model,
        now: DateTime<Utc>,
    ) -> ResultEngine<bool> {
        with_tx!(self, |db_tx| {
            let version = model.version;
            let mut campaign = SellCampaign::try_from(model)?;
            if !campaign.expire(now) {
                return Ok(false);
            }
            self.store_sell_campaign(&db_tx, &campaign, version).await?;
            Ok(true)
        })
    }
}
