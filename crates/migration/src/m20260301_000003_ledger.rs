use sea_orm_migration::prelude::*;

use crate::m20260301_000002_cooperatives::Cooperatives;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(Iden)]
pub enum LedgerEntries {
    Table,
    Id,
    CooperativeId,
    Kind,
    AmountMinor,
    BalanceAfterMinor,
    ActorId,
    Description,
    CreatedAt,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(LedgerEntries::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(LedgerEntries::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(LedgerEntries::CooperativeId)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(LedgerEntries::Kind).string().not_null())
                    .col(
                        ColumnDef::new(LedgerEntries::AmountMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(LedgerEntries::BalanceAfterMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(LedgerEntries::ActorId).string().not_null())
                    .col(ColumnDef::new(LedgerEntries::Description).string())
                    .col(
                        ColumnDef::new(LedgerEntries::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-ledger_entries-cooperative_id")
                            .from(LedgerEntries::Table, LedgerEntries::CooperativeId)
                            .to(Cooperatives::Table, Cooperatives::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-ledger_entries-coop_created")
                    .table(LedgerEntries::Table)
                    .col(LedgerEntries::CooperativeId)
                    .col(LedgerEntries::CreatedAt)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(LedgerEntries::Table).to_owned())
            .await
    }
}
