use sea_orm_migration::prelude::*;

use crate::m20260301_000001_users::Users;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(Iden)]
pub enum Cooperatives {
    Table,
    Id,
    Name,
    Code,
    InviteCode,
    LeaderId,
    Status,
    MaxMembers,
    BalanceMinor,
    CreatedAt,
    ApprovedAt,
    ApprovedBy,
    Version,
}

#[derive(Iden)]
pub enum CooperativeMembers {
    Table,
    Id,
    CooperativeId,
    UserId,
    Role,
    JoinedAt,
    ContributionMinor,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Cooperatives::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Cooperatives::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Cooperatives::Name).string().not_null())
                    .col(
                        ColumnDef::new(Cooperatives::Code)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Cooperatives::InviteCode).string())
                    .col(ColumnDef::new(Cooperatives::LeaderId).string().not_null())
                    .col(ColumnDef::new(Cooperatives::Status).string().not_null())
                    .col(ColumnDef::new(Cooperatives::MaxMembers).integer().not_null())
                    .col(
                        ColumnDef::new(Cooperatives::BalanceMinor)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Cooperatives::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Cooperatives::ApprovedAt).timestamp_with_time_zone())
                    .col(ColumnDef::new(Cooperatives::ApprovedBy).string())
                    .col(
                        ColumnDef::new(Cooperatives::Version)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-cooperatives-leader_id")
                            .from(Cooperatives::Table, Cooperatives::LeaderId)
                            .to(Users::Table, Users::Username),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-cooperatives-invite_code")
                    .table(Cooperatives::Table)
                    .col(Cooperatives::InviteCode)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(CooperativeMembers::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(CooperativeMembers::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(CooperativeMembers::CooperativeId)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(CooperativeMembers::UserId).string().not_null())
                    .col(ColumnDef::new(CooperativeMembers::Role).string().not_null())
                    .col(
                        ColumnDef::new(CooperativeMembers::JoinedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(CooperativeMembers::ContributionMinor)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-cooperative_members-cooperative_id")
                            .from(CooperativeMembers::Table, CooperativeMembers::CooperativeId)
                            .to(Cooperatives::Table, Cooperatives::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-cooperative_members-user_id")
                            .from(CooperativeMembers::Table, CooperativeMembers::UserId)
                            .to(Users::Table, Users::Username),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-cooperative_members-coop_user")
                    .table(CooperativeMembers::Table)
                    .col(CooperativeMembers::CooperativeId)
                    .col(CooperativeMembers::UserId)
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(CooperativeMembers::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Cooperatives::Table).to_owned())
            .await
    }
}
