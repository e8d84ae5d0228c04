//! Peer money-transfer requests between personal balances.
//!
//! Small transfers settle immediately; transfers at or above the review
//! threshold wait for an admin decision before any money moves.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, Money, ResultEngine};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransferStatus {
    Pending,
    AwaitingAdmin,
    Approved,
    Rejected,
    Completed,
    Cancelled,
}

impl TransferStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::AwaitingAdmin => "awaiting_admin",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    /// Money moved for this transfer.
    pub fn is_settled(self) -> bool {
        matches!(self, Self::Approved | Self::Completed)
    }
}

impl TryFrom<&str> for TransferStatus {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "pending" => Ok(Self::Pending),
            "awaiting_admin" => Ok(Self::AwaitingAdmin),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            "completed" => Ok(Self::Completed),
            "cancelled" => Ok(Self::Cancelled),
            other => Err(EngineError::InvalidStatus(format!(
                "invalid transfer status: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TransferRequest {
    pub id: Uuid,
    pub sender_id: String,
    pub receiver_id: String,
    pub amount: Money,
    pub status: TransferStatus,
    pub requires_verification: bool,
    pub rejection_reason: Option<String>,
    pub processed_by: Option<String>,
    pub processed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl TransferRequest {
    pub fn new(
        sender_id: String,
        receiver_id: String,
        amount: Money,
        requires_verification: bool,
        created_at: DateTime<Utc>,
    ) -> ResultEngine<Self> {
        if sender_id == receiver_id {
            return Err(EngineError::InvalidAmount(
                "sender and receiver must differ".to_string(),
            ));
        }
        if !amount.is_positive() {
            return Err(EngineError::InvalidAmount(
                "transfer amount must be positive".to_string(),
            ));
        }
        Ok(Self {
            id: Uuid::new_v4(),
            sender_id,
            receiver_id,
            amount,
            status: TransferStatus::Pending,
            requires_verification,
            rejection_reason: None,
            processed_by: None,
            processed_at: None,
            created_at,
        })
    }

    /// AWAITING_ADMIN → APPROVED. Settlement happens alongside, in the same
    /// transaction.
    pub fn approve(&mut self, admin: &str, now: DateTime<Utc>) -> ResultEngine<()> {
        if self.status != TransferStatus::AwaitingAdmin {
            return Err(EngineError::InvalidStatus(format!(
                "cannot approve a {} transfer",
                self.status.as_str()
            )));
        }
        self.status = TransferStatus::Approved;
        self.processed_by = Some(admin.to_string());
        self.processed_at = Some(now);
        Ok(())
    }

    /// AWAITING_ADMIN → REJECTED; balances stay untouched.
    pub fn reject(&mut self, admin: &str, reason: String, now: DateTime<Utc>) -> ResultEngine<()> {
        if self.status != TransferStatus::AwaitingAdmin {
            return Err(EngineError::InvalidStatus(format!(
                "cannot reject a {} transfer",
                self.status.as_str()
            )));
        }
        self.status = TransferStatus::Rejected;
        self.rejection_reason = Some(reason);
        self.processed_by = Some(admin.to_string());
        self.processed_at = Some(now);
        Ok(())
    }

    /// Sender backs out before an admin decision.
    pub fn cancel(&mut self, now: DateTime<Utc>) -> ResultEngine<()> {
        if !matches!(
            self.status,
            TransferStatus::Pending | TransferStatus::AwaitingAdmin
        ) {
            return Err(EngineError::InvalidStatus(format!(
                "cannot cancel a {} transfer",
                self.status.as_str()
            )));
        }
        self.status = TransferStatus::Cancelled;
        self.processed_at = Some(now);
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "transfer_requests")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub sender_id: String,
    pub receiver_id: String,
    pub amount_minor: i64,
    pub status: String,
    pub requires_verification: bool,
    pub rejection_reason: Option<String>,
    pub processed_by: Option<String>,
    pub processed_at: Option<DateTimeUtc>,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<&TransferRequest> for ActiveModel {
    fn from(transfer: &TransferRequest) -> Self {
        Self {
            id: ActiveValue::Set(transfer.id.to_string()),
            sender_id: ActiveValue::Set(transfer.sender_id.clone()),
            receiver_id: ActiveValue::Set(transfer.receiver_id.clone()),
            amount_minor: ActiveValue::Set(transfer.amount.minor()),
            status: ActiveValue::Set(transfer.status.as_str().to_string()),
            requires_verification: ActiveValue::Set(transfer.requires_verification),
            rejection_reason: ActiveValue::Set(transfer.rejection_reason.clone()),
            processed_by: ActiveValue::Set(transfer.processed_by.clone()),
            processed_at: ActiveValue::Set(transfer.processed_at),
            created_at: ActiveValue::Set(transfer.created_at),
        }
    }
}

impl TryFrom<Model> for TransferRequest {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: Uuid::parse_str(&model.id)
                .map_err(|_| EngineError::KeyNotFound("transfer not exists".to_string()))?,
            sender_id: model.sender_id,
            receiver_id: model.receiver_id,
            amount: Money::new(model.amount_minor),
            status: TransferStatus::try_from(model.status.as_str())?,
            requires_verification: model.requires_verification,
            rejection_reason: model.rejection_reason,
            processed_by: model.processed_by,
            processed_at: model.processed_at,
            created_at: model.created_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn awaiting() -> TransferRequest {
        let mut t = TransferRequest::new(
            "alice".to_string(),
            "bob".to_string(),
            Money::new(2_000_000),
            true,
            Utc::now(),
        )
        .unwrap();
        t.status = TransferStatus::AwaitingAdmin;
        t
    }

    #[test]
    fn self_transfer_is_rejected() {
        let err = TransferRequest::new(
            "alice".to_string(),
            "alice".to_string(),
            Money::new(1),
            false,
            Utc::now(),
        )
        .unwrap_err();
        assert!(matches!(err, EngineError::InvalidAmount(_)));
    }

    #[test]
    fn approval_stamps_audit_fields() {
        let mut t = awaiting();
        t.approve("admin", Utc::now()).unwrap();
        assert_eq!(t.status, TransferStatus::Approved);
        assert_eq!(t.processed_by.as_deref(), Some("admin"));
        assert!(t.processed_at.is_some());
    }

    #[test]
    fn resolved_transfer_cannot_be_cancelled() {
        let mut t = awaiting();
        t.reject("admin", "suspicious".to_string(), Utc::now())
            .unwrap();
        assert!(t.cancel(Utc::now()).is_err());
        assert_eq!(t.rejection_reason.as_deref(), Some("suspicious"));
    }

    #[test]
    fn awaiting_transfer_can_be_cancelled_by_sender() {
        let mut t = awaiting();
        t.cancel(Utc::now()).unwrap();
        assert_eq!(t.status, TransferStatus::Cancelled);
        assert!(t.approve("admin", Utc::now()).is_err());
    }
}
