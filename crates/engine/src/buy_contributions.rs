//! Per-member pledges against a group-buy campaign.
//!
//! Append-only; quantities are binding once submitted. The sum of a
//! campaign's contribution quantities always equals its cached current
//! quantity.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::EngineError;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BuyContribution {
    pub id: Uuid,
    pub campaign_id: Uuid,
    pub user_id: String,
    pub quantity: i64,
    /// Fulfillment target for this member's share of the pooled order.
    pub shipping_address: Option<String>,
    /// Set by `record_order_ref` once the fulfillment collaborator reports
    /// back with the generated order id.
    pub order_ref: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl BuyContribution {
    pub fn new(
        campaign_id: Uuid,
        user_id: String,
        quantity: i64,
        shipping_address: Option<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            campaign_id,
            user_id,
            quantity,
            shipping_address,
            order_ref: None,
            created_at,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "buy_contributions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub campaign_id: String,
    pub user_id: String,
    pub quantity: i64,
    pub shipping_address: Option<String>,
    pub order_ref: Option<String>,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::buy_campaigns::Entity",
        from = "Column::CampaignId",
        to = "super::buy_campaigns::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    BuyCampaigns,
}

impl Related<super::buy_campaigns::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::BuyCampaigns.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&BuyContribution> for ActiveModel {
    fn from(contribution: &BuyContribution) -> Self {
        Self {
            id: ActiveValue::Set(contribution.id.to_string()),
            campaign_id: ActiveValue::Set(contribution.campaign_id.to_string()),
            user_id: ActiveValue::Set(contribution.user_id.clone()),
            quantity: ActiveValue::Set(contribution.quantity),
            shipping_address: ActiveValue::Set(contribution.shipping_address.clone()),
            order_ref: ActiveValue::Set(contribution.order_ref.clone()),
            created_at: ActiveValue::Set(contribution.created_at),
        }
    }
}

impl TryFrom<Model> for BuyContribution {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: Uuid::parse_str(&model.id)
                .map_err(|_| EngineError::KeyNotFound("contribution not exists".to_string()))?,
            campaign_id: Uuid::parse_str(&model.campaign_id)
                .map_err(|_| EngineError::KeyNotFound("campaign not exists".to_string()))?,
            user_id: model.user_id,
            quantity: model.quantity,
            shipping_address: model.shipping_address,
            order_ref: model.order_ref,
            created_at: model.created_at,
        })
    }
}
