//! Provenance records for the shared inventory pool.
//!
//! Each row remembers which member supplied how much of an item, and carries
//! the earnings claim state used when sale proceeds are distributed
//! proportionally.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, Money};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct InventoryContribution {
    pub id: Uuid,
    pub item_id: Uuid,
    pub user_id: String,
    pub quantity: i64,
    /// Sell campaign this stock was pooled for, if any.
    pub campaign_id: Option<Uuid>,
    pub notes: Option<String>,
    /// Share of the sale proceeds, set when claimed.
    pub earnings: Option<Money>,
    pub is_claimed: bool,
    pub claimed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl InventoryContribution {
    pub fn new(
        item_id: Uuid,
        user_id: String,
        quantity: i64,
        campaign_id: Option<Uuid>,
        notes: Option<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            item_id,
            user_id,
            quantity,
            campaign_id,
            notes,
            earnings: None,
            is_claimed: false,
            claimed_at: None,
            created_at,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "inventory_contributions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub item_id: String,
    pub user_id: String,
    pub quantity: i64,
    pub campaign_id: Option<String>,
    pub notes: Option<String>,
    pub earnings_minor: Option<i64>,
    pub is_claimed: bool,
    pub claimed_at: Option<DateTimeUtc>,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::inventory::Entity",
        from = "Column::ItemId",
        to = "super::inventory::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    InventoryItems,
}

impl Related<super::inventory::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::InventoryItems.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&InventoryContribution> for ActiveModel {
    fn from(contribution: &InventoryContribution) -> Self {
        Self {
            id: ActiveValue::Set(contribution.id.to_string()),
            item_id: ActiveValue::Set(contribution.item_id.to_string()),
            user_id: ActiveValue::Set(contribution.user_id.clone()),
            quantity: ActiveValue::Set(contribution.quantity),
            campaign_id: ActiveValue::Set(contribution.campaign_id.map(|id| id.to_string())),
            notes: ActiveValue::Set(contribution.notes.clone()),
            earnings_minor: ActiveValue::Set(contribution.earnings.map(Money::minor)),
            is_claimed: ActiveValue::Set(contribution.is_claimed),
            claimed_at: ActiveValue::Set(contribution.claimed_at),
            created_at: ActiveValue::Set(contribution.created_at),
        }
    }
}

impl TryFrom<Model> for InventoryContribution {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        let campaign_id = match model.campaign_id {
            Some(id) => Some(
                Uuid::parse_str(&id)
                    .map_err(|_| EngineError::KeyNotFound("campaign not exists".to_string()))?,
            ),
            None => None,
        };
        Ok(Self {
            id: Uuid::parse_str(&model.id)
                .map_err(|_| EngineError::KeyNotFound("contribution not exists".to_string()))?,
            item_id: Uuid::parse_str(&model.item_id)
                .map_err(|_| EngineError::KeyNotFound("inventory item not exists".to_string()))?,
            user_id: model.user_id,
            quantity: model.quantity,
            campaign_id,
            notes: model.notes,
            earnings: model.earnings_minor.map(Money::new),
            is_claimed: model.is_claimed,
            claimed_at: model.claimed_at,
            created_at: model.created_at,
        })
    }
}
