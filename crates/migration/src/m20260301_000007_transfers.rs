use sea_orm_migration::prelude::*;

use crate::{
    m20260301_000001_users::Users, m20260301_000002_cooperatives::Cooperatives,
};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(Iden)]
pub enum TransferRequests {
    Table,
    Id,
    SenderId,
    ReceiverId,
    AmountMinor,
    Status,
    RequiresVerification,
    RejectionReason,
    ProcessedBy,
    ProcessedAt,
    CreatedAt,
}

#[derive(Iden)]
pub enum DissolutionRequests {
    Table,
    Id,
    CooperativeId,
    RequestedBy,
    Reason,
    Status,
    AdminNote,
    ProcessedBy,
    ProcessedAt,
    CreatedAt,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(TransferRequests::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(TransferRequests::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(TransferRequests::SenderId).string().not_null())
                    .col(
                        ColumnDef::new(TransferRequests::ReceiverId)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(TransferRequests::AmountMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(TransferRequests::Status).string().not_null())
                    .col(
                        ColumnDef::new(TransferRequests::RequiresVerification)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(TransferRequests::RejectionReason).string())
                    .col(ColumnDef::new(TransferRequests::ProcessedBy).string())
                    .col(ColumnDef::new(TransferRequests::ProcessedAt).timestamp_with_time_zone())
                    .col(
                        ColumnDef::new(TransferRequests::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-transfer_requests-sender_id")
                            .from(TransferRequests::Table, TransferRequests::SenderId)
                            .to(Users::Table, Users::Username),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-transfer_requests-receiver_id")
                            .from(TransferRequests::Table, TransferRequests::ReceiverId)
                            .to(Users::Table, Users::Username),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-transfer_requests-status")
                    .table(TransferRequests::Table)
                    .col(TransferRequests::Status)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(DissolutionRequests::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(DissolutionRequests::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(DissolutionRequests::CooperativeId)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(DissolutionRequests::RequestedBy)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(DissolutionRequests::Reason).string().not_null())
                    .col(ColumnDef::new(DissolutionRequests::Status).string().not_null())
                    .col(ColumnDef::new(DissolutionRequests::AdminNote).string())
                    .col(ColumnDef::new(DissolutionRequests::ProcessedBy).string())
                    .col(
                        ColumnDef::new(DissolutionRequests::ProcessedAt)
                            .timestamp_with_time_zone(),
                    )
                    .col(
                        ColumnDef::new(DissolutionRequests::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-dissolution_requests-cooperative_id")
                            .from(DissolutionRequests::Table, DissolutionRequests::CooperativeId)
                            .to(Cooperatives::Table, Cooperatives::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-dissolution_requests-coop_status")
                    .table(DissolutionRequests::Table)
                    .col(DissolutionRequests::CooperativeId)
                    .col(DissolutionRequests::Status)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(DissolutionRequests::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(TransferRequests::Table).to_owned())
            .await
    }
}
