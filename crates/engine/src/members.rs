//! Cooperative membership records.
//!
//! One row per (cooperative, user). The `contribution_minor` total is
//! informational only: it grows with every deposit but is never spent from.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::EngineError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemberRole {
    /// Can manage the cooperative, create campaigns, request dissolution.
    Leader,
    /// Can participate in campaigns and deposit to the fund.
    Member,
}

impl MemberRole {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Leader => "leader",
            Self::Member => "member",
        }
    }

    pub fn is_leader(self) -> bool {
        matches!(self, Self::Leader)
    }
}

impl TryFrom<&str> for MemberRole {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "leader" => Ok(Self::Leader),
            "member" => Ok(Self::Member),
            other => Err(EngineError::InvalidStatus(format!(
                "invalid member role: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Member {
    pub id: Uuid,
    pub cooperative_id: Uuid,
    pub user_id: String,
    pub role: MemberRole,
    pub joined_at: DateTime<Utc>,
    /// Lifetime total deposited to the fund, monotonically non-decreasing.
    pub contribution_minor: i64,
}

impl Member {
    pub fn new(
        cooperative_id: Uuid,
        user_id: String,
        role: MemberRole,
        joined_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            cooperative_id,
            user_id,
            role,
            joined_at,
            contribution_minor: 0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "cooperative_members")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub cooperative_id: String,
    pub user_id: String,
    pub role: String,
    pub joined_at: DateTimeUtc,
    pub contribution_minor: i64,
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

impl From<&Member> for ActiveModel {
    fn from(member: &Member) -> Self {
        Self {
            id: ActiveValue::Set(member.id.to_string()),
            cooperative_id: ActiveValue::Set(member.cooperative_id.to_string()),
            user_id: ActiveValue::Set(member.user_id.clone()),
            role: ActiveValue::Set(member.role.as_str().to_string()),
            joined_at: ActiveValue::Set(member.joined_at),
            contribution_minor: ActiveValue::Set(member.contribution_minor),
        }
    }
}

impl TryFrom<Model> for Member {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: Uuid::parse_str(&model.id)
                .map_err(|_| EngineError::KeyNotFound("member not exists".to_string()))?,
            cooperative_id: Uuid::parse_str(&model.cooperative_id)
                .map_err(|_| EngineError::KeyNotFound("cooperative not exists".to_string()))?,
            user_id: model.user_id,
            role: MemberRole::try_from(model.role.as_str())?,
            joined_at: model.joined_at,
            contribution_minor: model.contribution_minor,
        })
    }
}
