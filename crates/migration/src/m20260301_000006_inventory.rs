use sea_orm_migration::prelude::*;

use crate::m20260301_000002_cooperatives::Cooperatives;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(Iden)]
pub enum InventoryItems {
    Table,
    Id,
    CooperativeId,
    ProductType,
    ProductRef,
    ProductName,
    Unit,
    Quantity,
    TotalValueMinor,
    CreatedAt,
    UpdatedAt,
    Version,
}

#[derive(Iden)]
pub enum InventoryContributions {
    Table,
    Id,
    ItemId,
    UserId,
    Quantity,
    CampaignId,
    Notes,
    EarningsMinor,
    IsClaimed,
    ClaimedAt,
    CreatedAt,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(InventoryItems::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(InventoryItems::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(InventoryItems::CooperativeId)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(InventoryItems::ProductType).string().not_null())
                    .col(ColumnDef::new(InventoryItems::ProductRef).string().not_null())
                    .col(ColumnDef::new(InventoryItems::ProductName).string().not_null())
                    .col(ColumnDef::new(InventoryItems::Unit).string().not_null())
                    .col(
                        ColumnDef::new(InventoryItems::Quantity)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(InventoryItems::TotalValueMinor)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(InventoryItems::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(InventoryItems::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(InventoryItems::Version)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-inventory_items-cooperative_id")
                            .from(InventoryItems::Table, InventoryItems::CooperativeId)
                            .to(Cooperatives::Table, Cooperatives::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-inventory_items-coop_product")
                    .table(InventoryItems::Table)
                    .col(InventoryItems::CooperativeId)
                    .col(InventoryItems::ProductType)
                    .col(InventoryItems::ProductRef)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(InventoryContributions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(InventoryContributions::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(InventoryContributions::ItemId)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(InventoryContributions::UserId)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(InventoryContributions::Quantity)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(InventoryContributions::CampaignId).string())
                    .col(ColumnDef::new(InventoryContributions::Notes).string())
                    .col(ColumnDef::new(InventoryContributions::EarningsMinor).big_integer())
                    .col(
                        ColumnDef::new(InventoryContributions::IsClaimed)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(InventoryContributions::ClaimedAt).timestamp_with_time_zone())
                    .col(
                        ColumnDef::new(InventoryContributions::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-inventory_contributions-item_id")
                            .from(InventoryContributions::Table, InventoryContributions::ItemId)
                            .to(InventoryItems::Table, InventoryItems::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-inventory_contributions-item_id")
                    .table(InventoryContributions::Table)
                    .col(InventoryContributions::ItemId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(InventoryContributions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(InventoryItems::Table).to_owned())
            .await
    }
}
