use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub mod cooperative {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CooperativeNew {
        pub name: String,
        pub max_members: i32,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct JoinByCode {
        pub invite_code: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CooperativeView {
        pub id: Uuid,
        pub name: String,
        pub code: String,
        pub invite_code: Option<String>,
        pub status: String,
        pub max_members: i32,
        pub balance_minor: i64,
        pub leader: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct MemberView {
        pub username: String,
        pub role: String,
        pub joined_at: DateTime<Utc>,
        pub contribution_minor: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct MembersResponse {
        pub members: Vec<MemberView>,
    }
}

pub mod ledger {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct FundMovement {
        pub amount_minor: i64,
        pub description: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct EntryView {
        pub id: i64,
        pub kind: String,
        pub amount_minor: i64,
        pub balance_after_minor: i64,
        pub actor: String,
        pub description: Option<String>,
        pub created_at: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct LedgerResponse {
        pub entries: Vec<EntryView>,
    }
}

pub mod campaign {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BuyCampaignNew {
        pub cooperative_id: Option<Uuid>,
        pub title: String,
        pub shop_item_ref: String,
        pub retail_price_minor: i64,
        pub wholesale_price_minor: i64,
        pub target_quantity: i64,
        pub deadline: Option<DateTime<Utc>>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct SellCampaignNew {
        pub cooperative_id: Option<Uuid>,
        pub product_name: String,
        pub unit: String,
        pub min_price_minor: i64,
        pub target_quantity: i64,
        pub deadline: Option<DateTime<Utc>>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct Contribute {
        pub quantity: i64,
        /// Group-buy: where this member's share ships to.
        pub shipping_address: Option<String>,
        /// Group-sell: free-text notes.
        pub notes: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct MarkSold {
        pub final_price_minor: i64,
        pub buyer_info: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ForceClose {
        pub note: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct OrderRef {
        pub order_ref: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CampaignView {
        pub id: Uuid,
        pub cooperative_id: Option<Uuid>,
        pub title: String,
        pub status: String,
        pub target_quantity: i64,
        pub current_quantity: i64,
        pub deadline: Option<DateTime<Utc>>,
        pub closed_reason: Option<String>,
    }
}

pub mod inventory {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct InventoryAdd {
        pub product_type: String,
        pub product_ref: String,
        pub product_name: String,
        pub unit: String,
        pub quantity: i64,
        pub value_minor: i64,
        pub campaign_id: Option<Uuid>,
        pub notes: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct InventoryWithdraw {
        pub quantity: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ClaimEarnings {
        pub total_proceeds_minor: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ItemView {
        pub id: Uuid,
        pub product_name: String,
        pub product_type: String,
        pub unit: String,
        pub quantity: i64,
        pub total_value_minor: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ContributionView {
        pub id: Uuid,
        pub user: String,
        pub quantity: i64,
        pub earnings_minor: Option<i64>,
        pub is_claimed: bool,
    }
}

pub mod transfer {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransferNew {
        pub receiver: String,
        pub amount_minor: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransferReject {
        pub reason: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransferView {
        pub id: Uuid,
        pub sender: String,
        pub receiver: String,
        pub amount_minor: i64,
        pub status: String,
        pub requires_verification: bool,
    }
}

pub mod dissolution {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct DissolutionNew {
        pub reason: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct DissolutionResolve {
        pub approve: bool,
        pub note: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct DissolutionView {
        pub id: Uuid,
        pub cooperative_id: Uuid,
        pub requested_by: String,
        pub status: String,
        pub admin_note: Option<String>,
    }
}
