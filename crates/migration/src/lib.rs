pub use sea_orm_migration::prelude::*;

mod m20260301_000001_users;
mod m20260301_000002_cooperatives;
mod m20260301_000003_ledger;
mod m20260301_000004_campaigns;
mod m20260301_000005_contributions;
mod m20260301_000006_inventory;
mod m20260301_000007_transfers;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260301_000001_users::Migration),
            Box::new(m20260301_000002_cooperatives::Migration),
            Box::new(m20260301_000003_ledger::Migration),
            Box::new(m20260301_000004_campaigns::Migration),
            Box::new(m20260301_000005_contributions::Migration),
            Box::new(m20260301_000006_inventory::Migration),
            Box::new(m20260301_000007_transfers::Migration),
        ]
    }
}
