//! Users table.
//!
//! The engine stores memberships and audit references by `user_id`, which is
//! the username. Authentication happens outside the engine; the only state
//! the engine owns here is the personal balance that deposits and peer
//! transfers move money through.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub username: String,
    pub password: String,
    pub is_admin: bool,
    /// Personal balance in minor units.
    pub balance_minor: i64,
    /// Optimistic-lock counter guarding `balance_minor`.
    pub version: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
