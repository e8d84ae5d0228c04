use sea_orm::{DatabaseTransaction, QueryFilter, prelude::*};
use uuid::Uuid;

use crate::{
    EngineError, MemberRole, ResultEngine, cooperatives, members, users,
};

use super::Engine;

impl Engine {
    pub(super) async fn require_user(
        &self,
        db: &DatabaseTransaction,
        username: &str,
    ) -> ResultEngine<users::Model> {
        users::Entity::find_by_id(username.to_string())
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("user not exists".to_string()))
    }

    pub(super) async fn require_admin(
        &self,
        db: &DatabaseTransaction,
        username: &str,
    ) -> ResultEngine<users::Model> {
        let user = self.require_user(db, username).await?;
        if !user.is_admin {
            return Err(EngineError::Forbidden(
                "admin privileges required".to_string(),
            ));
        }
        Ok(user)
    }

    pub(super) async fn require_cooperative(
        &self,
        db: &DatabaseTransaction,
        cooperative_id: Uuid,
    ) -> ResultEngine<cooperatives::Model> {
        cooperatives::Entity::find_by_id(cooperative_id.to_string())
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("cooperative not exists".to_string()))
    }

    pub(super) async fn find_membership(
        &self,
        db: &DatabaseTransaction,
        cooperative_id: Uuid,
        user_id: &str,
    ) -> ResultEngine<Option<members::Model>> {
        members::Entity::find()
            .filter(members::Column::CooperativeId.eq(cooperative_id.to_string()))
            .filter(members::Column::UserId.eq(user_id.to_string()))
            .one(db)
            .await
            .map_err(Into::into)
    }

    pub(super) async fn require_member(
        &self,
        db: &DatabaseTransaction,
        cooperative_id: Uuid,
        user_id: &str,
    ) -> ResultEngine<members::Model> {
        self.find_membership(db, cooperative_id, user_id)
            .await?
            .ok_or_else(|| {
                EngineError::Forbidden("not a member of this cooperative".to_string())
            })
    }

    pub(super) async fn require_leader(
        &self,
        db: &DatabaseTransaction,
        cooperative_id: Uuid,
        user_id: &str,
    ) -> ResultEngine<members::Model> {
        let membership = self.require_member(db, cooperative_id, user_id).await?;
        if !MemberRole::try_from(membership.role.as_str())?.is_leader() {
            return Err(EngineError::Forbidden(
                "cooperative leader role required".to_string(),
            ));
        }
        Ok(membership)
    }

    /// Leader of the cooperative, or a platform admin.
    pub(super) async fn require_leader_or_admin(
        &self,
        db: &DatabaseTransaction,
        cooperative_id: Uuid,
        user_id: &str,
    ) -> ResultEngine<()> {
        let user = self.require_user(db, user_id).await?;
        if user.is_admin {
            return Ok(());
        }
        self.require_leader(db, cooperative_id, user_id).await?;
        Ok(())
    }
}
