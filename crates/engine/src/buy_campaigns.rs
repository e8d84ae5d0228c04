//! Group-buy campaigns.
//!
//! Members pool intent-to-buy quantities against a shop item; once the
//! target is reached the cooperative places a single wholesale order from
//! the shared fund.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{CloseReason, EngineError, Money, ResultEngine};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuyStatus {
    Open,
    Completed,
    Ordered,
    Cancelled,
    Expired,
}

impl BuyStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Completed => "completed",
            Self::Ordered => "ordered",
            Self::Cancelled => "cancelled",
            Self::Expired => "expired",
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Ordered | Self::Cancelled | Self::Expired)
    }
}

impl TryFrom<&str> for BuyStatus {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "open" => Ok(Self::Open),
            "completed" => Ok(Self::Completed),
            "ordered" => Ok(Self::Ordered),
            "cancelled" => Ok(Self::Cancelled),
            "expired" => Ok(Self::Expired),
            other => Err(EngineError::InvalidStatus(format!(
                "invalid group-buy status: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BuyCampaign {
    pub id: Uuid,
    /// `None` for a platform-wide campaign run by an admin.
    pub cooperative_id: Option<Uuid>,
    pub title: String,
    /// Reference into the external shop-item master data.
    pub shop_item_ref: String,
    pub retail_price: Money,
    pub wholesale_price: Money,
    pub target_quantity: i64,
    pub current_quantity: i64,
    pub status: BuyStatus,
    pub deadline: Option<DateTime<Utc>>,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub closed_reason: Option<CloseReason>,
    pub closed_by: Option<String>,
    pub closed_at: Option<DateTime<Utc>>,
    pub close_note: Option<String>,
    /// Order id handed back by the fulfillment collaborator.
    pub order_ref: Option<String>,
}

impl BuyCampaign {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        cooperative_id: Option<Uuid>,
        title: String,
        shop_item_ref: String,
        retail_price: Money,
        wholesale_price: Money,
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
        if !wholesale_price.is_positive() || !retail_price.is_positive() {
            return Err(EngineError::InvalidAmount(
                "prices must be positive".to_string(),
            ));
        }
        Ok(Self {
            id: Uuid::new_v4(),
            cooperative_id,
            title,
            shop_item_ref,
            retail_price,
            wholesale_price,
            target_quantity,
            current_quantity: 0,
            status: BuyStatus::Open,
            deadline,
            created_by,
            created_at,
            closed_reason: None,
            closed_by: None,
            closed_at: None,
            close_note: None,
            order_ref: None,
        })
    }

    /// Registers a contribution of `quantity` and, if the target is reached,
    /// transitions OPEN → COMPLETED in the same step. Returns `true` when
    /// this contribution completed the campaign. The crossing contribution
    /// is accepted in full, so current quantity may overshoot the target.
    pub fn register_contribution(
        &mut self,
        quantity: i64,
        now: DateTime<Utc>,
    ) -> ResultEngine<bool> {
        if self.status != BuyStatus::Open {
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
            self.status = BuyStatus::Completed;
            self.closed_reason = Some(CloseReason::AutoCompleted);
            self.closed_at = Some(now);
            return Ok(true);
        }
        Ok(false)
    }

    /// COMPLETED → ORDERED. The fund charge is the caller's responsibility.
    pub fn mark_ordered(&mut self, actor: &str, now: DateTime<Utc>) -> ResultEngine<()> {
        if self.status != BuyStatus::Completed {
            return Err(EngineError::InvalidStatus(format!(
                "cannot order a {} campaign",
                self.status.as_str()
            )));
        }
        self.status = BuyStatus::Ordered;
        self.closed_by = Some(actor.to_string());
        self.closed_at = Some(now);
        Ok(())
    }

    /// OPEN → CANCELLED by an admin or the cooperative leader.
    pub fn force_close(
        &mut self,
        actor: &str,
        note: Option<String>,
        now: DateTime<Utc>,
    ) -> ResultEngine<()> {
        if self.status != BuyStatus::Open {
            return Err(EngineError::InvalidStatus(format!(
                "cannot cancel a {} campaign",
                self.status.as_str()
            )));
        }
        self.status = BuyStatus::Cancelled;
        self.closed_reason = Some(CloseReason::AdminForced);
        self.closed_by = Some(actor.to_string());
        self.closed_at = Some(now);
        self.close_note = note;
        Ok(())
    }

    /// OPEN past the deadline → EXPIRED. No-op unless both conditions hold.
    pub fn expire(&mut self, now: DateTime<Utc>) -> bool {
        if self.status != BuyStatus::Open {
            return false;
        }
        match self.deadline {
            Some(deadline) if deadline <= now => {
                self.status = BuyStatus::Expired;
                self.closed_reason = Some(CloseReason::Expired);
                self.closed_at = Some(now);
                true
            }
            _ => false,
        }
    }

    /// Total wholesale cost of the pooled order.
    pub fn order_total(&self) -> ResultEngine<Money> {
        self.wholesale_price
            .minor()
            .checked_mul(self.current_quantity)
            .map(Money::new)
            .ok_or_else(|| EngineError::InvalidAmount("order total overflow".to_string()))
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "buy_campaigns")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub cooperative_id: Option<String>,
    pub title: String,
    pub shop_item_ref: String,
    pub retail_price_minor: i64,
    pub wholesale_price_minor: i64,
    pub target_quantity: i64,
    pub current_quantity: i64,
    pub status: String,
    pub deadline: Option<DateTimeUtc>,
    pub created_by: String,
    pub created_at: DateTimeUtc,
    pub closed_reason: Option<String>,
    pub closed_by: Option<String>,
    pub closed_at: Option<DateTimeUtc>,
    pub close_note: Option<String>,
    pub order_ref: Option<String>,
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
    #[sea_orm(has_many = "super::buy_contributions::Entity")]
    BuyContributions,
}

impl Related<super::cooperatives::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Cooperatives.def()
    }
}

impl Related<super::buy_contributions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::BuyContributions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&BuyCampaign> for ActiveModel {
    fn from(campaign: &BuyCampaign) -> Self {
        Self {
            id: ActiveValue::Set(campaign.id.to_string()),
            cooperative_id: ActiveValue::Set(
                campaign.cooperative_id.map(|id| id.to_string()),
            ),
            title: ActiveValue::Set(campaign.title.clone()),
            shop_item_ref: ActiveValue::Set(campaign.shop_item_ref.clone()),
            retail_price_minor: ActiveValue::Set(campaign.retail_price.minor()),
            wholesale_price_minor: ActiveValue::Set(campaign.wholesale_price.minor()),
            target_quantity: ActiveValue::Set(campaign.target_quantity),
            current_quantity: ActiveValue::Set(campaign.current_quantity),
            status: ActiveValue::Set(campaign.status.as_str().to_string()),
            deadline: ActiveValue::Set(campaign.deadline),
            created_by: ActiveValue::Set(campaign.created_by.clone()),
            created_at: ActiveValue::Set(campaign.created_at),
            closed_reason: ActiveValue::Set(
                campaign.closed_reason.map(|r| r.as_str().to_string()),
            ),
            closed_by: ActiveValue::Set(campaign.closed_by.clone()),
            closed_at: ActiveValue::Set(campaign.closed_at),
            close_note: ActiveValue::Set(campaign.close_note.clone()),
            order_ref: ActiveValue::Set(campaign.order_ref.clone()),
            version: ActiveValue::Set(0),
        }
    }
}

impl TryFrom<Model> for BuyCampaign {
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
            title: model.title,
            shop_item_ref: model.shop_item_ref,
            retail_price: Money::new(model.retail_price_minor),
            wholesale_price: Money::new(model.wholesale_price_minor),
            target_quantity: model.target_quantity,
            current_quantity: model.current_quantity,
            status: BuyStatus::try_from(model.status.as_str())?,
            deadline: model.deadline,
            created_by: model.created_by,
            created_at: model.created_at,
            closed_reason: model
                .closed_reason
                .as_deref()
                .map(CloseReason::try_from)
                .transpose()?,
            closed_by: model.closed_by,
            closed_at: model.closed_at,
            close_note: model.close_note,
            order_ref: model.order_ref,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn campaign(target: i64) -> BuyCampaign {
        BuyCampaign::new(
            Some(Uuid::new_v4()),
            "Fertilizer bulk order".to_string(),
            "shop-17".to_string(),
            Money::new(120_000),
            Money::new(95_000),
            target,
            None,
            "leader".to_string(),
            Utc::now(),
        )
        .unwrap()
    }

    #[test]
    fn contribution_below_target_stays_open() {
        let mut c = campaign(10);
        let completed = c.register_contribution(8, Utc::now()).unwrap();
        assert!(!completed);
        assert_eq!(c.status, BuyStatus::Open);
        assert_eq!(c.current_quantity, 8);
        assert_eq!(c.closed_reason, None);
    }

    #[test]
    fn crossing_contribution_is_accepted_in_full() {
        let mut c = campaign(10);
        c.register_contribution(8, Utc::now()).unwrap();
        let completed = c.register_contribution(3, Utc::now()).unwrap();
        assert!(completed);
        assert_eq!(c.current_quantity, 11);
        assert_eq!(c.status, BuyStatus::Completed);
        assert_eq!(c.closed_reason, Some(CloseReason::AutoCompleted));
        assert!(c.closed_at.is_some());
    }

    #[test]
    fn completed_campaign_rejects_further_contributions() {
        let mut c = campaign(5);
        c.register_contribution(5, Utc::now()).unwrap();
        let err = c.register_contribution(1, Utc::now()).unwrap_err();
        assert!(matches!(err, EngineError::InvalidStatus(_)));
        assert_eq!(c.current_quantity, 5);
    }

    #[test]
    fn zero_and_negative_quantities_are_rejected() {
        let mut c = campaign(10);
        assert!(matches!(
            c.register_contribution(0, Utc::now()),
            Err(EngineError::InvalidAmount(_))
        ));
        assert!(matches!(
            c.register_contribution(-3, Utc::now()),
            Err(EngineError::InvalidAmount(_))
        ));
        assert_eq!(c.current_quantity, 0);
    }

    #[test]
    fn overflowing_contribution_is_rejected() {
        let mut c = campaign(10);
        c.register_contribution(1, Utc::now()).unwrap();
        let err = c.register_contribution(i64::MAX, Utc::now()).unwrap_err();
        assert!(matches!(err, EngineError::InvalidAmount(_)));
        assert_eq!(c.current_quantity, 1);
        assert_eq!(c.status, BuyStatus::Open);
    }

    #[test]
    fn expire_only_fires_once_past_deadline() {
        let now = Utc::now();
        let mut c = campaign(10);
        c.deadline = Some(now - chrono::Duration::hours(1));
        assert!(c.expire(now));
        assert_eq!(c.status, BuyStatus::Expired);
        assert_eq!(c.closed_reason, Some(CloseReason::Expired));
        // Already terminal: a second sweep is a no-op.
        assert!(!c.expire(now));
    }

    #[test]
    fn expire_leaves_open_campaign_before_deadline() {
        let now = Utc::now();
        let mut c = campaign(10);
        c.deadline = Some(now + chrono::Duration::hours(1));
        assert!(!c.expire(now));
        assert_eq!(c.status, BuyStatus::Open);
    }

    #[test]
    fn force_close_records_actor_and_note() {
        let now = Utc::now();
        let mut c = campaign(10);
        c.force_close("admin", Some("supplier folded".to_string()), now)
            .unwrap();
        assert_eq!(c.status, BuyStatus::Cancelled);
        assert_eq!(c.closed_reason, Some(CloseReason::AdminForced));
        assert_eq!(c.closed_by.as_deref(), Some("admin"));
        assert_eq!(c.close_note.as_deref(), Some("supplier folded"));
    }

    #[test]
    fn order_total_is_wholesale_times_quantity() {
        let mut c = campaign(10);
        c.register_contribution(11, Utc::now()).unwrap();
        assert_eq!(c.order_total().unwrap(), Money::new(11 * 95_000));
    }
}
