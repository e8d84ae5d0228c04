//! Cooperative primitives.
//!
//! A `Cooperative` is a farmer collective pooling funds and goods. Its
//! cached `balance_minor` is denormalized from the ledger; only the posting
//! routine in the ops layer may change it.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, ResultEngine};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CooperativeStatus {
    /// Waiting for admin approval.
    Pending,
    /// Active and operational.
    Approved,
    /// Registration rejected.
    Rejected,
    /// Temporarily suspended.
    Suspended,
    /// Shut down through the dissolution workflow.
    Dissolved,
}

impl CooperativeStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::Suspended => "suspended",
            Self::Dissolved => "dissolved",
        }
    }
}

impl TryFrom<&str> for CooperativeStatus {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            "suspended" => Ok(Self::Suspended),
            "dissolved" => Ok(Self::Dissolved),
            other => Err(EngineError::InvalidStatus(format!(
                "invalid cooperative status: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Cooperative {
    pub id: Uuid,
    pub name: String,
    /// Registration code, unique, issued at creation (`HTX-0001` style).
    pub code: String,
    /// Join code issued on approval and revoked on dissolution.
    pub invite_code: Option<String>,
    pub leader_id: String,
    pub status: CooperativeStatus,
    pub max_members: i32,
    pub balance_minor: i64,
    pub created_at: DateTime<Utc>,
    pub approved_at: Option<DateTime<Utc>>,
    pub approved_by: Option<String>,
}

impl Cooperative {
    pub fn new(
        name: String,
        code: String,
        leader_id: String,
        max_members: i32,
        created_at: DateTime<Utc>,
    ) -> ResultEngine<Self> {
        if max_members <= 0 {
            return Err(EngineError::InvalidAmount(
                "max_members must be > 0".to_string(),
            ));
        }
        Ok(Self {
            id: Uuid::new_v4(),
            name,
            code,
            invite_code: None,
            leader_id,
            status: CooperativeStatus::Pending,
            max_members,
            balance_minor: 0,
            created_at,
            approved_at: None,
            approved_by: None,
        })
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "cooperatives")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub name: String,
    pub code: String,
    pub invite_code: Option<String>,
    pub leader_id: String,
    pub status: String,
    pub max_members: i32,
    pub balance_minor: i64,
    pub created_at: DateTimeUtc,
    pub approved_at: Option<DateTimeUtc>,
    pub approved_by: Option<String>,
    /// Optimistic-lock counter guarding `balance_minor` and `status`.
    pub version: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::members::Entity")]
    Members,
    #[sea_orm(has_many = "super::ledger::Entity")]
    LedgerEntries,
}

impl Related<super::members::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Members.def()
    }
}

impl Related<super::ledger::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::LedgerEntries.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Cooperative> for ActiveModel {
    fn from(coop: &Cooperative) -> Self {
        Self {
            id: ActiveValue::Set(coop.id.to_string()),
            name: ActiveValue::Set(coop.name.clone()),
            code: ActiveValue::Set(coop.code.clone()),
            invite_code: ActiveValue::Set(coop.invite_code.clone()),
            leader_id: ActiveValue::Set(coop.leader_id.clone()),
            status: ActiveValue::Set(coop.status.as_str().to_string()),
            max_members: ActiveValue::Set(coop.max_members),
            balance_minor: ActiveValue::Set(coop.balance_minor),
            created_at: ActiveValue::Set(coop.created_at),
            approved_at: ActiveValue::Set(coop.approved_at),
            approved_by: ActiveValue::Set(coop.approved_by.clone()),
            version: ActiveValue::Set(0),
        }
    }
}

impl TryFrom<Model> for Cooperative {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: Uuid::parse_str(&model.id)
                .map_err(|_| EngineError::KeyNotFound("cooperative not exists".to_string()))?,
            name: model.name,
            code: model.code,
            invite_code: model.invite_code,
            leader_id: model.leader_id,
            status: CooperativeStatus::try_from(model.status.as_str())?,
            max_members: model.max_members,
            balance_minor: model.balance_minor,
            created_at: model.created_at,
            approved_at: model.approved_at,
            approved_by: model.approved_by,
        })
    }
}
