//! Command structs for engine operations.
//!
//! These types group parameters for campaign creation, keeping call sites
//! readable and avoiding long argument lists.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::Money;

/// Create a group-buy campaign.
#[derive(Clone, Debug)]
pub struct CreateBuyCampaignCmd {
    /// `None` creates a platform-wide campaign (admin only).
    pub cooperative_id: Option<Uuid>,
    pub title: String,
    pub shop_item_ref: String,
    pub retail_price: Money,
    pub wholesale_price: Money,
    pub target_quantity: i64,
    pub deadline: Option<DateTime<Utc>>,
    pub user_id: String,
}

impl CreateBuyCampaignCmd {
    #[must_use]
    pub fn new(
        user_id: impl Into<String>,
        title: impl Into<String>,
        shop_item_ref: impl Into<String>,
        retail_price: Money,
        wholesale_price: Money,
        target_quantity: i64,
    ) -> Self {
        Self {
            cooperative_id: None,
            title: title.into(),
            shop_item_ref: shop_item_ref.into(),
            retail_price,
            wholesale_price,
            target_quantity,
            deadline: None,
            user_id: user_id.into(),
        }
    }

    #[must_use]
    pub fn cooperative_id(mut self, cooperative_id: Uuid) -> Self {
        self.cooperative_id = Some(cooperative_id);
        self
    }

    #[must_use]
    pub fn deadline(mut self, deadline: DateTime<Utc>) -> Self {
        self.deadline = Some(deadline);
        self
    }
}

/// Create a group-sell campaign.
#[derive(Clone, Debug)]
pub struct CreateSellCampaignCmd {
    /// `None` creates a platform-wide campaign (admin only).
    pub cooperative_id: Option<Uuid>,
    pub product_name: String,
    pub unit: String,
    pub min_price: Money,
    pub target_quantity: i64,
    pub deadline: Option<DateTime<Utc>>,
    pub user_id: String,
}

impl CreateSellCampaignCmd {
    #[must_use]
    pub fn new(
        user_id: impl Into<String>,
        product_name: impl Into<String>,
        unit: impl Into<String>,
        min_price: Money,
        target_quantity: i64,
    ) -> Self {
        Self {
            cooperative_id: None,
            product_name: product_name.into(),
            unit: unit.into(),
            min_price,
            target_quantity,
            deadline: None,
            user_id: user_id.into(),
        }
    }

    #[must_use]
    pub fn cooperative_id(mut self, cooperative_id: Uuid) -> Self {
        self.cooperative_id = Some(cooperative_id);
        self
    }

    #[must_use]
    pub fn deadline(mut self, deadline: DateTime<Utc>) -> Self {
        self.deadline = Some(deadline);
        self
    }
}

/// Contribute stock to the shared inventory pool.
#[derive(Clone, Debug)]
pub struct AddInventoryCmd {
    pub cooperative_id: Uuid,
    pub user_id: String,
    pub product_type: crate::ProductType,
    pub product_ref: String,
    pub product_name: String,
    pub unit: String,
    pub quantity: i64,
    /// Worth of the contributed stock.
    pub value: Money,
    /// Sell campaign this stock is pooled for, if any.
    pub campaign_id: Option<Uuid>,
    pub notes: Option<String>,
}

impl AddInventoryCmd {
    #[must_use]
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        cooperative_id: Uuid,
        user_id: impl Into<String>,
        product_type: crate::ProductType,
        product_ref: impl Into<String>,
        product_name: impl Into<String>,
        unit: impl Into<String>,
        quantity: i64,
        value: Money,
    ) -> Self {
        Self {
            cooperative_id,
            user_id: user_id.into(),
            product_type,
            product_ref: product_ref.into(),
            product_name: product_name.into(),
            unit: unit.into(),
            quantity,
            value,
            campaign_id: None,
            notes: None,
        }
    }

    #[must_use]
    pub fn campaign_id(mut self, campaign_id: Uuid) -> Self {
        self.campaign_id = Some(campaign_id);
        self
    }

    #[must_use]
    pub fn notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }
}
