use sea_orm_migration::prelude::*;

use crate::m20260301_000004_campaigns::{BuyCampaigns, SellCampaigns};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(Iden)]
pub enum BuyContributions {
    Table,
    Id,
    CampaignId,
    UserId,
    Quantity,
    ShippingAddress,
    OrderRef,
    CreatedAt,
}

#[derive(Iden)]
pub enum SellContributions {
    Table,
    Id,
    CampaignId,
    UserId,
    Quantity,
    Notes,
    CreatedAt,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(BuyContributions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(BuyContributions::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(BuyContributions::CampaignId)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(BuyContributions::UserId).string().not_null())
                    .col(
                        ColumnDef::new(BuyContributions::Quantity)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(BuyContributions::ShippingAddress).string())
                    .col(ColumnDef::new(BuyContributions::OrderRef).string())
                    .col(
                        ColumnDef::new(BuyContributions::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-buy_contributions-campaign_id")
                            .from(BuyContributions::Table, BuyContributions::CampaignId)
                            .to(BuyCampaigns::Table, BuyCampaigns::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-buy_contributions-campaign_id")
                    .table(BuyContributions::Table)
                    .col(BuyContributions::CampaignId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(SellContributions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SellContributions::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(SellContributions::CampaignId)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(SellContributions::UserId).string().not_null())
                    .col(
                        ColumnDef::new(SellContributions::Quantity)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(SellContributions::Notes).string())
                    .col(
                        ColumnDef::new(SellContributions::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-sell_contributions-campaign_id")
                            .from(SellContributions::Table, SellContributions::CampaignId)
                            .to(SellCampaigns::Table, SellCampaigns::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-sell_contributions-campaign_id")
                    .table(SellContributions::Table)
                    .col(SellContributions::CampaignId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(SellContributions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(BuyContributions::Table).to_owned())
            .await
    }
}
