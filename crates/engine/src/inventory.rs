//! Shared inventory pool.
//!
//! Goods a cooperative holds collectively, either bought through a campaign
//! or contributed from members' own harvests. Quantity never goes negative;
//! the aggregate value tracks what the stock on hand is worth.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, Money, ResultEngine};

/// Which external master-data table `product_ref` points into.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductType {
    ShopItem,
    Crop,
    Animal,
}

impl ProductType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ShopItem => "shop_item",
            Self::Crop => "crop",
            Self::Animal => "animal",
        }
    }
}

impl TryFrom<&str> for ProductType {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "shop_item" => Ok(Self::ShopItem),
            "crop" => Ok(Self::Crop),
            "animal" => Ok(Self::Animal),
            other => Err(EngineError::InvalidStatus(format!(
                "invalid product type: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct InventoryItem {
    pub id: Uuid,
    pub cooperative_id: Uuid,
    pub product_type: ProductType,
    pub product_ref: String,
    pub product_name: String,
    pub unit: String,
    pub quantity: i64,
    /// Aggregate worth of the stock on hand.
    pub total_value: Money,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl InventoryItem {
    pub fn new(
        cooperative_id: Uuid,
        product_type: ProductType,
        product_ref: String,
        product_name: String,
        unit: String,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            cooperative_id,
            product_type,
            product_ref,
            product_name,
            unit,
            quantity: 0,
            total_value: Money::ZERO,
            created_at: now,
            updated_at: now,
        }
    }

    /// Adds stock worth `value` to the pool.
    pub fn add(&mut self, quantity: i64, value: Money, now: DateTime<Utc>) -> ResultEngine<()> {
        if quantity <= 0 {
            return Err(EngineError::InvalidAmount(
                "quantity must be positive".to_string(),
            ));
        }
        if value.is_negative() {
            return Err(EngineError::InvalidAmount(
                "value must not be negative".to_string(),
            ));
        }
        self.quantity = self
            .quantity
            .checked_add(quantity)
            .ok_or_else(|| EngineError::InvalidAmount("inventory quantity overflow".to_string()))?;
        self.total_value = self
            .total_value
            .checked_add(value)
            .ok_or_else(|| EngineError::InvalidAmount("inventory value overflow".to_string()))?;
        self.updated_at = now;
        Ok(())
    }

    /// Removes stock from the pool, reducing the aggregate value
    /// proportionally. Rejects withdrawals exceeding the current holdings.
    pub fn remove(&mut self, quantity: i64, now: DateTime<Utc>) -> ResultEngine<Money> {
        if quantity <= 0 {
            return Err(EngineError::InvalidAmount(
                "quantity must be positive".to_string(),
            ));
        }
        if quantity > self.quantity {
            return Err(EngineError::InsufficientStock(format!(
                "requested {quantity}, only {} {} available",
                self.quantity, self.unit
            )));
        }
        let removed_value = if self.quantity == quantity {
            self.total_value
        } else {
            crate::money::proportional_share(quantity, self.quantity, self.total_value)?
        };
        self.quantity -= quantity;
        self.total_value = self.total_value - removed_value;
        self.updated_at = now;
        Ok(removed_value)
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "inventory_items")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub cooperative_id: String,
    pub product_type: String,
    pub product_ref: String,
    pub product_name: String,
    pub unit: String,
    pub quantity: i64,
    pub total_value_minor: i64,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
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
    #[sea_orm(has_many = "super::inventory_contributions::Entity")]
    InventoryContributions,
}

impl Related<super::cooperatives::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Cooperatives.def()
    }
}

impl Related<super::inventory_contributions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::InventoryContributions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&InventoryItem> for ActiveModel {
    fn from(item: &InventoryItem) -> Self {
        Self {
            id: ActiveValue::Set(item.id.to_string()),
            cooperative_id: ActiveValue::Set(item.cooperative_id.to_string()),
            product_type: ActiveValue::Set(item.product_type.as_str().to_string()),
            product_ref: ActiveValue::Set(item.product_ref.clone()),
            product_name: ActiveValue::Set(item.product_name.clone()),
            unit: ActiveValue::Set(item.unit.clone()),
            quantity: ActiveValue::Set(item.quantity),
            total_value_minor: ActiveValue::Set(item.total_value.minor()),
            created_at: ActiveValue::Set(item.created_at),
            updated_at: ActiveValue::Set(item.updated_at),
            version: ActiveValue::Set(0),
        }
    }
}

impl TryFrom<Model> for InventoryItem {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: Uuid::parse_str(&model.id)
                .map_err(|_| EngineError::KeyNotFound("inventory item not exists".to_string()))?,
            cooperative_id: Uuid::parse_str(&model.cooperative_id)
                .map_err(|_| EngineError::KeyNotFound("cooperative not exists".to_string()))?,
            product_type: ProductType::try_from(model.product_type.as_str())?,
            product_ref: model.product_ref,
            product_name: model.product_name,
            unit: model.unit,
            quantity: model.quantity,
            total_value: Money::new(model.total_value_minor),
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item() -> InventoryItem {
        InventoryItem::new(
            Uuid::new_v4(),
            ProductType::Crop,
            "crop-9".to_string(),
            "Mango".to_string(),
            "kg".to_string(),
            Utc::now(),
        )
    }

    #[test]
    fn add_accumulates_quantity_and_value() {
        let mut item = item();
        item.add(30, Money::new(300_000), Utc::now()).unwrap();
        item.add(70, Money::new(700_000), Utc::now()).unwrap();
        assert_eq!(item.quantity, 100);
        assert_eq!(item.total_value, Money::new(1_000_000));
    }

    #[test]
    fn add_rejects_quantity_overflow() {
        let mut item = item();
        item.add(5, Money::new(50_000), Utc::now()).unwrap();
        let err = item.add(i64::MAX, Money::new(1), Utc::now()).unwrap_err();
        assert!(matches!(err, EngineError::InvalidAmount(_)));
        assert_eq!(item.quantity, 5);
        assert_eq!(item.total_value, Money::new(50_000));
    }

    #[test]
    fn remove_rejects_more_than_available() {
        let mut item = item();
        item.add(10, Money::new(100_000), Utc::now()).unwrap();
        let err = item.remove(11, Utc::now()).unwrap_err();
        assert!(matches!(err, EngineError::InsufficientStock(_)));
        assert_eq!(item.quantity, 10);
        assert_eq!(item.total_value, Money::new(100_000));
    }

    #[test]
    fn removing_everything_zeroes_the_value() {
        let mut item = item();
        item.add(3, Money::new(100_000), Utc::now()).unwrap();
        let removed = item.remove(3, Utc::now()).unwrap();
        assert_eq!(removed, Money::new(100_000));
        assert_eq!(item.quantity, 0);
        assert_eq!(item.total_value, Money::ZERO);
    }

    #[test]
    fn partial_removal_takes_a_proportional_value() {
        let mut item = item();
        item.add(100, Money::new(1_000_000), Utc::now()).unwrap();
        let removed = item.remove(25, Utc::now()).unwrap();
        assert_eq!(removed, Money::new(250_000));
        assert_eq!(item.quantity, 75);
        assert_eq!(item.total_value, Money::new(750_000));
    }
}
