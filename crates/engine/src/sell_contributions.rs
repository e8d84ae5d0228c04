//! Per-member pledges against a group-sell campaign.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::EngineError;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SellContribution {
    pub id: Uuid,
    pub campaign_id: Uuid,
    pub user_id: String,
    pub quantity: i64,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl SellContribution {
    pub fn new(
        campaign_id: Uuid,
        user_id: String,
        quantity: i64,
        notes: Option<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            campaign_id,
            user_id,
            quantity,
            notes,
            created_at,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "sell_contributions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub campaign_id: String,
    pub user_id: String,
    pub quantity: i64,
    pub notes: Option<String>,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::sell_campaigns::Entity",
        from = "Column::CampaignId",
        to = "super::sell_campaigns::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    SellCampaigns,
}

impl Related<super::sell_campaigns::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SellCampaigns.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&SellContribution> for ActiveModel {
    fn from(contribution: &SellContribution) -> Self {
        Self {
            id: ActiveValue::Set(contribution.id.to_string()),
            campaign_id: ActiveValue::Set(contribution.campaign_id.to_string()),
            user_id: ActiveValue::Set(contribution.user_id.clone()),
            quantity: ActiveValue::Set(contribution.quantity),
            notes: ActiveValue::Set(contribution.notes.clone()),
            created_at: ActiveValue::Set(contribution.created_at),
        }
    }
}

impl TryFrom<Model> for SellContribution {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: Uuid::parse_str(&model.id)
                .map_err(|_| EngineError::KeyNotFound("contribution not exists".to_string()))?,
            campaign_id: Uuid::parse_str(&model.campaign_id)
                .map_err(|_| EngineError::KeyNotFound("campaign not exists".to_string()))?,
            user_id: model.user_id,
            quantity: model.quantity,
            notes: model.notes,
            created_at: model.created_at,
        })
    }
}
