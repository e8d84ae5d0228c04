//! Cooperative dissolution requests.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, ResultEngine};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DissolutionStatus {
    Pending,
    Approved,
    Rejected,
}

impl DissolutionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }
}

impl TryFrom<&str> for DissolutionStatus {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            other => Err(EngineError::InvalidStatus(format!(
                "invalid dissolution status: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DissolutionRequest {
    pub id: Uuid,
    pub cooperative_id: Uuid,
    pub requested_by: String,
    pub reason: String,
    pub status: DissolutionStatus,
    pub admin_note: Option<String>,
    pub processed_by: Option<String>,
    pub processed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl DissolutionRequest {
    pub fn new(
        cooperative_id: Uuid,
        requested_by: String,
        reason: String,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            cooperative_id,
            requested_by,
            reason,
            status: DissolutionStatus::Pending,
            admin_note: None,
            processed_by: None,
            processed_at: None,
            created_at,
        }
    }

    /// PENDING → APPROVED/REJECTED. The cascade on approval is run by the
    /// caller in the same transaction.
    pub fn resolve(
        &mut self,
        admin: &str,
        approve: bool,
        note: Option<String>,
        now: DateTime<Utc>,
    ) -> ResultEngine<()> {
        if self.status != DissolutionStatus::Pending {
            return Err(EngineError::InvalidStatus(format!(
                "dissolution request is already {}",
                self.status.as_str()
            )));
        }
        self.status = if approve {
            DissolutionStatus::Approved
        } else {
            DissolutionStatus::Rejected
        };
        self.admin_note = note;
        self.processed_by = Some(admin.to_string());
        self.processed_at = Some(now);
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "dissolution_requests")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub cooperative_id: String,
    pub requested_by: String,
    pub reason: String,
    pub status: String,
    pub admin_note: Option<String>,
    pub processed_by: Option<String>,
    pub processed_at: Option<DateTimeUtc>,
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

impl From<&DissolutionRequest> for ActiveModel {
    fn from(request: &DissolutionRequest) -> Self {
        Self {
            id: ActiveValue::Set(request.id.to_string()),
            cooperative_id: ActiveValue::Set(request.cooperative_id.to_string()),
            requested_by: ActiveValue::Set(request.requested_by.clone()),
            reason: ActiveValue::Set(request.reason.clone()),
            status: ActiveValue::Set(request.status.as_str().to_string()),
            admin_note: ActiveValue::Set(request.admin_note.clone()),
            processed_by: ActiveValue::Set(request.processed_by.clone()),
            processed_at: ActiveValue::Set(request.processed_at),
            created_at: ActiveValue::Set(request.created_at),
        }
    }
}

impl TryFrom<Model> for DissolutionRequest {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: Uuid::parse_str(&model.id)
                .map_err(|_| EngineError::KeyNotFound("dissolution request not exists".to_string()))?,
            cooperative_id: Uuid::parse_str(&model.cooperative_id)
                .map_err(|_| EngineError::KeyNotFound("cooperative not exists".to_string()))?,
            requested_by: model.requested_by,
            reason: model.reason,
            status: DissolutionStatus::try_from(model.status.as_str())?,
            admin_note: model.admin_note,
            processed_by: model.processed_by,
            processed_at: model.processed_at,
            created_at: model.created_at,
        })
    }
}
