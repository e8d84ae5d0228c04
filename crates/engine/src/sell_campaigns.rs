//! Group-sell campaigns.
//!
//! Members pool harvested produce toward a quantity target; once READY the
//! lot is sold as one unit and the proceeds land in the shared fund.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{CloseReason, EngineError, Money, ResultEngine};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SellStatus {
    Open,
    Ready,
    Sold,
    Cancelled,
    Expired,
}

impl SellStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Ready => "ready",
            Self::Sold => "sold",
            Self::Cancelled => "cancelled",
            Self::Expired => "expired",
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Sold | Self::Cancelled | Self::Expired)
    }
}

impl TryFrom<&str> for SellStatus {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "open" => Ok(Self::Open),
            "ready" => Ok(Self::Ready),
            "sold" => Ok(Self::Sold),
            "cancelled" => Ok(Self::Cancelled),
            "expired" => Ok(Self::Expired),
            other => Err(EngineError::InvalidStatus(format!(
                "invalid group-sell status: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SellCampaign {
    pub id: Uuid,
    /// `None` for a platform-wide campaign run by an admin.
    pub cooperative_id: Option<Uuid>,
    pub product_name: String,
    pub unit: String,
    /// Floor below which the lot must not be sold.
    pub min_price: Money,
    pub target_quantity: i64,
    pub current_quantity: i64,
    pub status: SellStatus,
    pub deadline: Option<DateTime<Utc>>,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub final_price: Option<Money>,
    pub buyer_info: Option<String>,
    pub closed_reason: Option<CloseReason>,
    pub closed_by: Option<String>,
    pub closed_at: Option<DateTime<Utc>>,
    pub close_note: Option<String>,
}

impl SellCampaign {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        cooperative_id: Option<Uuid>,
        product_name: String,
        unit: String,
        min_price: Money,
        target_quantity: i64,
        deadline: Option<DateTime<Utc>>,
        created_by: String,
        created_at: DateTime<Utc>,
    ) -> ResultEngine<Self> {
        if target_quantity <= 0 {
            return Err(EngineError::InvalidAmount(
                "target quantity must be positive".to_string(),
            ));
        }
        if !min_price.is_positive() {
            return Err(EngineError::InvalidAmount(
                "minimum price must be positive".to_string(),
            ));
        }
        Ok(Self {
            id: Uuid::new_v4(),
            cooperative_id,
            product_name,
            unit,
            min_price,
            target_quantity,
            current_quantity: 0,
            status: SellStatus::Open,
            deadline,
            created_by,
            created_at,
            final_price: None,
            buyer_info: None,
            closed_reason: None,
            closed_by: None,
            closed_at: None,
            close_note: None,
        })
    }

    /// Registers a pledged quantity and transitions OPEN → READY in the same
    /// step when the target is reached. Returns `true` on transition. The
    /// crossing contribution is accepted in full (overshoot allowed).
    pub fn register_contribution(
        &mut self,
        quantity: i64,
        now: DateTime<Utc>,
    ) -> ResultEngine<bool> {
        if self.status != SellStatus::Open {
            return Err(EngineError::InvalidStatus(format!(
                "campaign is {}, contributions are only accepted while open",
                self.status.as_str()
            )));
        }
        if quantity <= 0 {
            return Err(EngineError::InvalidAmount(
                "contribution quantity must be positive".to_string(),
            ));
        }
        self.current_quantity = self
            .current_quantity
            .checked_add(quantity)
            .ok_or_else(|| EngineError::InvalidAmount("campaign quantity overflow".to_string()))?;
        if self.current_quantity >= self.target_quantity {
            self.status = SellStatus::Ready;
            self.closed_reason = Some(CloseReason::AutoCompleted);
            self.closed_at = Some(now);
            return Ok(true);
        }
        Ok(false)
    }

    /// READY → SOLD, recording the agreed price and buyer.
    pub fn mark_sold(
        &mut self,
        actor: &str,
        final_price: Money,
        buyer_info: Option<String>,
        now: DateTime<Utc>,
    ) -> ResultEngine<()> {
        if self.status != SellStatus::Ready {
            return Err(EngineError::InvalidStatus(format!(
                "cannot sell a {} campaign",
                self.status.as_str()
            )));
        }
        if final_price < self.min_price {
            return Err(EngineError::InvalidAmount(format!(
                "final price {final_price} is below the minimum {}",
                self.min_price
            )));
        }
        self.status = SellStatus::Sold;
        self.final_price = Some(final_price);
        self.buyer_info = buyer_info;
        self.closed_by = Some(actor.to_string());
        self.closed_at = Some(now);
        Ok(())
    }

    /// OPEN or READY → CANCELLED.
    pub fn force_close(
        &mut self,
        actor: &str,
        note: Option<String>,
        now: DateTime<Utc>,
    ) -> ResultEngine<()> {
        if !matches!(self.status, SellStatus::Open | SellStatus::Ready) {
            return Err(EngineError::InvalidStatus(format!(
                "cannot cancel a {} campaign",
                self.status.as_str()
            )));
        }
        self.status = SellStatus::Cancelled;
        self.closed_reason = Some(CloseReason::AdminForced);
        self.closed_by = Some(actor.to_string());
        self.closed_at = Some(now);
        self.close_note = note;
        Ok(())
    }

    /// OPEN past the deadline → EXPIRED. No-op unless both conditions hold.
    pub fn expire(&mut self, now: DateTime<Utc>) -> bool {
        if self.status != SellStatus::Open {
            return false;
        }
        match self.deadline {
            Some(deadline) if deadline <= now => {
                self.status = SellStatus::Expired;
                self.closed_reason = Some(CloseReason::Expired);
                self.closed_at = Some(now);
                true
            }
            _ => false,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "sell_campaigns")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub cooperative_id: Option<String>,
    pub product_name: String,
    pub unit: String,
    pub min_price_minor: i64,
    pub target_quantity: i64,
    pub current_quantity: i64,
    pub status: String,
    pub deadline: Option<DateTimeUtc>,
    pub created_by: String,
    pub created_at: DateTimeUtc,
    pub final_price_minor: Option<i64>,
    pub buyer_info: Option<String>,
    pub closed_reason: Option<String>,
    pub closed_by: Option<String>,
    pub closed_at: Option<DateTimeUtc>,
    pub close_note: Option<String>,
    pub version: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::cooperatives::Entity",
        from = "Column::CooperativeId",
        to = "super::cooperatives::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Cooperatives,
    #[sea_orm(has_many = "super::sell_contributions::Entity")]
    SellContributions,
}

impl Related<super::cooperatives::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Cooperatives.def()
    }
}

impl Related<super::sell_contributions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SellContributions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&SellCampaign> for ActiveModel {
    fn from(campaign: &SellCampaign) -> Self {
        Self {
            id: ActiveValue::Set(campaign.id.to_string()),
            cooperative_id: ActiveValue::Set(
                campaign.cooperative_id.map(|id| id.to_string()),
            ),
            product_name: ActiveValue::Set(campaign.product_name.clone()),
            unit: ActiveValue::Set(campaign.unit.clone()),
            min_price_minor: ActiveValue::Set(campaign.min_price.minor()),
            target_quantity: ActiveValue::Set(campaign.target_quantity),
            current_quantity: ActiveValue::Set(campaign.current_quantity),
            status: ActiveValue::Set(campaign.status.as_str().to_string()),
            deadline: ActiveValue::Set(campaign.deadline),
            created_by: ActiveValue::Set(campaign.created_by.clone()),
            created_at: ActiveValue::Set(campaign.created_at),
            final_price_minor: ActiveValue::Set(campaign.final_price.map(Money::minor)),
            buyer_info: ActiveValue::Set(campaign.buyer_info.clone()),
            closed_reason: ActiveValue::Set(
                campaign.closed_reason.map(|r| r.as_str().to_string()),
            ),
            closed_by: ActiveValue::Set(campaign.closed_by.clone()),
            closed_at: ActiveValue::Set(campaign.closed_at),
            close_note: ActiveValue::Set(campaign.close_note.clone()),
            version: ActiveValue::Set(0),
        }
    }
}

impl TryFrom<Model> for SellCampaign {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        let cooperative_id = match model.cooperative_id {
            Some(id) => Some(
                Uuid::parse_str(&id)
                    .map_err(|_| EngineError::KeyNotFound("cooperative not exists".to_string()))?,
            ),
            None => None,
        };
        Ok(Self {
            id: Uuid::parse_str(&model.id)
                .map_err(|_| EngineError::KeyNotFound("campaign not exists".to_string()))?,
            cooperative_id,
            product_name: model.product_name,
            unit: model.unit,
            min_price: Money::new(model.min_price_minor),
            target_quantity: model.target_quantity,
            current_quantity: model.current_quantity,
            status: SellStatus::try_from(model.status.as_str())?,
            deadline: model.deadline,
            created_by: model.created_by,
            created_at: model.created_at,
            final_price: model.final_price_minor.map(Money::new),
            buyer_info: model.buyer_info,
            closed_reason: model
                .closed_reason
                .as_deref()
                .map(CloseReason::try_from)
                .transpose()?,
            closed_by: model.closed_by,
            closed_at: model.closed_at,
            close_note: model.close_note,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn campaign(target: i64) -> SellCampaign {
        SellCampaign::new(
            Some(Uuid::new_v4()),
            "Jasmine rice".to_string(),
            "kg".to_string(),
            Money::new(18_000),
            target,
            None,
            "leader".to_string(),
            Utc::now(),
        )
        .unwrap()
    }

    #[test]
    fn reaching_target_transitions_to_ready() {
        let mut c = campaign(100);
        assert!(!c.register_contribution(60, Utc::now()).unwrap());
        assert!(c.register_contribution(50, Utc::now()).unwrap());
        assert_eq!(c.status, SellStatus::Ready);
        assert_eq!(c.current_quantity, 110);
        assert_eq!(c.closed_reason, Some(CloseReason::AutoCompleted));
    }

    #[test]
    fn overflowing_contribution_is_rejected() {
        let mut c = campaign(100);
        c.register_contribution(2, Utc::now()).unwrap();
        let err = c.register_contribution(i64::MAX, Utc::now()).unwrap_err();
        assert!(matches!(err, EngineError::InvalidAmount(_)));
        assert_eq!(c.current_quantity, 2);
        assert_eq!(c.status, SellStatus::Open);
    }

    #[test]
    fn selling_below_minimum_price_is_rejected() {
        let mut c = campaign(10);
        c.register_contribution(10, Utc::now()).unwrap();
        let err = c
            .mark_sold("leader", Money::new(17_999), None, Utc::now())
            .unwrap_err();
        assert!(matches!(err, EngineError::InvalidAmount(_)));
        assert_eq!(c.status, SellStatus::Ready);
    }

    #[test]
    fn ready_campaign_can_be_sold_once() {
        let mut c = campaign(10);
        c.register_contribution(10, Utc::now()).unwrap();
        c.mark_sold("leader", Money::new(200_000), Some("Cho Lon market".to_string()), Utc::now())
            .unwrap();
        assert_eq!(c.status, SellStatus::Sold);
        assert_eq!(c.final_price, Some(Money::new(200_000)));
        let err = c
            .mark_sold("leader", Money::new(200_000), None, Utc::now())
            .unwrap_err();
        assert!(matches!(err, EngineError::InvalidStatus(_)));
    }

    #[test]
    fn force_close_is_valid_from_ready() {
        let mut c = campaign(10);
        c.register_contribution(10, Utc::now()).unwrap();
        c.force_close("admin", None, Utc::now()).unwrap();
        assert_eq!(c.status, SellStatus::Cancelled);
        assert_eq!(c.closed_reason, Some(CloseReason::AdminForced));
    }

    #[test]
    fn sold_campaign_cannot_be_cancelled() {
        let mut c = campaign(10);
        c.register_contribution(10, Utc::now()).unwrap();
        c.mark_sold("leader", Money::new(200_000), None, Utc::now())
            .unwrap();
        assert!(c.force_close("admin", None, Utc::now()).is_err());
    }
}
