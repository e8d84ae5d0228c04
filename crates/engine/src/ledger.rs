//! Append-only fund ledger.
//!
//! Every movement of a cooperative's shared fund is recorded here with the
//! balance snapshot taken after the movement. Rows are never updated or
//! deleted; the integer primary key gives a stable per-fund ordering even
//! when two entries share a timestamp.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, Money};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    /// Member deposit into the shared fund.
    Deposit,
    /// Admin-authorized withdrawal from the fund.
    Withdrawal,
    /// Fund spent on a completed group-buy order.
    Purchase,
    /// Proceeds of a group-sell credited to the fund.
    Sale,
    /// Refund credited back to the fund.
    Refund,
    /// Inventory sale proceeds credited to the fund.
    Revenue,
    /// Member claimed their share of inventory earnings.
    ClaimEarnings,
    /// Product moved into the shared inventory. No money moved.
    ContributeProduct,
    /// Product taken back out of the shared inventory. No money moved.
    WithdrawProduct,
}

impl EntryKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Deposit => "deposit",
            Self::Withdrawal => "withdrawal",
            Self::Purchase => "purchase",
            Self::Sale => "sale",
            Self::Refund => "refund",
            Self::Revenue => "revenue",
            Self::ClaimEarnings => "claim_earnings",
            Self::ContributeProduct => "contribute_product",
            Self::WithdrawProduct => "withdraw_product",
        }
    }

    /// Direction the fund balance moves: `+1` credit, `-1` debit, `0` for
    /// informational product movements.
    pub fn sign(self) -> i64 {
        match self {
            Self::Deposit | Self::Sale | Self::Refund | Self::Revenue => 1,
            Self::Withdrawal | Self::Purchase | Self::ClaimEarnings => -1,
            Self::ContributeProduct | Self::WithdrawProduct => 0,
        }
    }
}

impl TryFrom<&str> for EntryKind {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "deposit" => Ok(Self::Deposit),
            "withdrawal" => Ok(Self::Withdrawal),
            "purchase" => Ok(Self::Purchase),
            "sale" => Ok(Self::Sale),
            "refund" => Ok(Self::Refund),
            "revenue" => Ok(Self::Revenue),
            "claim_earnings" => Ok(Self::ClaimEarnings),
            "contribute_product" => Ok(Self::ContributeProduct),
            "withdraw_product" => Ok(Self::WithdrawProduct),
            other => Err(EngineError::InvalidStatus(format!(
                "invalid ledger entry kind: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LedgerEntry {
    /// Database-assigned sequence number, `None` until inserted.
    pub id: Option<i64>,
    pub cooperative_id: Uuid,
    pub kind: EntryKind,
    /// Always non-negative; direction comes from `kind.sign()`.
    pub amount: Money,
    pub balance_after: Money,
    pub actor_id: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "ledger_entries")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub cooperative_id: String,
    pub kind: String,
    pub amount_minor: i64,
    pub balance_after_minor: i64,
    pub actor_id: String,
    pub description: Option<String>,
    pub created_at: DateTimeUtc,
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
}

impl Related<super::cooperatives::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Cooperatives.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&LedgerEntry> for ActiveModel {
    fn from(entry: &LedgerEntry) -> Self {
        Self {
            id: match entry.id {
                Some(id) => ActiveValue::Set(id),
                None => ActiveValue::NotSet,
            },
            cooperative_id: ActiveValue::Set(entry.cooperative_id.to_string()),
            kind: ActiveValue::Set(entry.kind.as_str().to_string()),
            amount_minor: ActiveValue::Set(entry.amount.minor()),
            balance_after_minor: ActiveValue::Set(entry.balance_after.minor()),
            actor_id: ActiveValue::Set(entry.actor_id.clone()),
            description: ActiveValue::Set(entry.description.clone()),
            created_at: ActiveValue::Set(entry.created_at),
        }
    }
}

impl TryFrom<Model> for LedgerEntry {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: Some(model.id),
            cooperative_id: Uuid::parse_str(&model.cooperative_id)
                .map_err(|_| EngineError::KeyNotFound("cooperative not exists".to_string()))?,
            kind: EntryKind::try_from(model.kind.as_str())?,
            amount: Money::new(model.amount_minor),
            balance_after: Money::new(model.balance_after_minor),
            actor_id: model.actor_id,
            description: model.description,
            created_at: model.created_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signs_match_fund_direction() {
        assert_eq!(EntryKind::Deposit.sign(), 1);
        assert_eq!(EntryKind::Sale.sign(), 1);
        assert_eq!(EntryKind::Refund.sign(), 1);
        assert_eq!(EntryKind::Revenue.sign(), 1);
        assert_eq!(EntryKind::Withdrawal.sign(), -1);
        assert_eq!(EntryKind::Purchase.sign(), -1);
        assert_eq!(EntryKind::ClaimEarnings.sign(), -1);
        assert_eq!(EntryKind::ContributeProduct.sign(), 0);
        assert_eq!(EntryKind::WithdrawProduct.sign(), 0);
    }

    #[test]
    fn kind_round_trips_through_str() {
        for kind in [
            EntryKind::Deposit,
            EntryKind::Withdrawal,
            EntryKind::Purchase,
            EntryKind::Sale,
            EntryKind::Refund,
            EntryKind::Revenue,
            EntryKind::ClaimEarnings,
            EntryKind::ContributeProduct,
            EntryKind::WithdrawProduct,
        ] {
            assert_eq!(EntryKind::try_from(kind.as_str()), Ok(kind));
        }
        assert!(EntryKind::try_from("gift").is_err());
    }
}
