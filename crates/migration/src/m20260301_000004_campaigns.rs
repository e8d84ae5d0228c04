use sea_orm_migration::prelude::*;

use crate::m20260301_000002_cooperatives::Cooperatives;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(Iden)]
pub enum BuyCampaigns {
    Table,
    Id,
    CooperativeId,
    Title,
    ShopItemRef,
    RetailPriceMinor,
    WholesalePriceMinor,
    TargetQuantity,
    CurrentQuantity,
    Status,
    Deadline,
    CreatedBy,
    CreatedAt,
    ClosedReason,
    ClosedBy,
    ClosedAt,
    CloseNote,
    OrderRef,
    Version,
}

#[derive(Iden)]
pub enum SellCampaigns {
    Table,
    Id,
    CooperativeId,
    ProductName,
    Unit,
    MinPriceMinor,
    TargetQuantity,
    CurrentQuantity,
    Status,
    Deadline,
    CreatedBy,
    CreatedAt,
    FinalPriceMinor,
    BuyerInfo,
    ClosedReason,
    ClosedBy,
    ClosedAt,
    CloseNote,
    Version,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(BuyCampaigns::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(BuyCampaigns::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(BuyCampaigns::CooperativeId).string())
                    .col(ColumnDef::new(BuyCampaigns::Title).string().not_null())
                    .col(ColumnDef::new(BuyCampaigns::ShopItemRef).string().not_null())
                    .col(
                        ColumnDef::new(BuyCampaigns::RetailPriceMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(BuyCampaigns::WholesalePriceMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(BuyCampaigns::TargetQuantity)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(BuyCampaigns::CurrentQuantity)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(BuyCampaigns::Status).string().not_null())
                    .col(ColumnDef::new(BuyCampaigns::Deadline).timestamp_with_time_zone())
                    .col(ColumnDef::new(BuyCampaigns::CreatedBy).string().not_null())
                    .col(
                        ColumnDef::new(BuyCampaigns::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(BuyCampaigns::ClosedReason).string())
                    .col(ColumnDef::new(BuyCampaigns::ClosedBy).string())
                    .col(ColumnDef::new(BuyCampaigns::ClosedAt).timestamp_with_time_zone())
                    .col(ColumnDef::new(BuyCampaigns::CloseNote).string())
                    .col(ColumnDef::new(BuyCampaigns::OrderRef).string())
                    .col(
                        ColumnDef::new(BuyCampaigns::Version)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-buy_campaigns-cooperative_id")
                            .from(BuyCampaigns::Table, BuyCampaigns::CooperativeId)
                            .to(Cooperatives::Table, Cooperatives::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-buy_campaigns-status_deadline")
                    .table(BuyCampaigns::Table)
                    .col(BuyCampaigns::Status)
                    .col(BuyCampaigns::Deadline)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(SellCampaigns::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SellCampaigns::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(SellCampaigns::CooperativeId).string())
                    .col(ColumnDef::new(SellCampaigns::ProductName).string().not_null())
                    .col(ColumnDef::new(SellCampaigns::Unit).string().not_null())
                    .col(
                        ColumnDef::new(SellCampaigns::MinPriceMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(SellCampaigns::TargetQuantity)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(SellCampaigns::CurrentQuantity)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(SellCampaigns::Status).string().not_null())
                    .col(ColumnDef::new(SellCampaigns::Deadline).timestamp_with_time_zone())
                    .col(ColumnDef::new(SellCampaigns::CreatedBy).string().not_null())
                    .col(
                        ColumnDef::new(SellCampaigns::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(SellCampaigns::FinalPriceMinor).big_integer())
                    .col(ColumnDef::new(SellCampaigns::BuyerInfo).string())
                    .col(ColumnDef::new(SellCampaigns::ClosedReason).string())
                    .col(ColumnDef::new(SellCampaigns::ClosedBy).string())
                    .col(ColumnDef::new(SellCampaigns::ClosedAt).timestamp_with_time_zone())
                    .col(ColumnDef::new(SellCampaigns::CloseNote).string())
                    .col(
                        ColumnDef::new(SellCampaigns::Version)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-sell_campaigns-cooperative_id")
                            .from(SellCampaigns::Table, SellCampaigns::CooperativeId)
                            .to(Cooperatives::Table, Cooperatives::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-sell_campaigns-status_deadline")
                    .table(SellCampaigns::Table)
                    .col(SellCampaigns::Status)
                    .col(SellCampaigns::Deadline)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(SellCampaigns::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(BuyCampaigns::Table).to_owned())
            .await
    }
}
