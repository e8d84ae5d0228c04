//! Shared inventory pool operations.

use chrono::{DateTime, Utc};
use sea_orm::{
    DatabaseTransaction, QueryFilter, QueryOrder, TransactionTrait, prelude::*, sea_query::Expr,
};
use uuid::Uuid;

use crate::{
    AddInventoryCmd, EngineError, EntryKind, InventoryContribution, InventoryItem, Money,
    ResultEngine, inventory, inventory_contributions, proportional_share,
};

use super::{Engine, with_tx};

impl Engine {
    /// Moves member-supplied stock into the shared pool: finds or creates
    /// the item, adds quantity and value, records provenance and posts an
    /// informational CONTRIBUTE_PRODUCT ledger entry.
    pub async fn add_inventory(
        &self,
        cmd: AddInventoryCmd,
        now: DateTime<Utc>,
    ) -> ResultEngine<InventoryContribution> {
        with_tx!(self, |db_tx| {
            let coop = self.require_cooperative(&db_tx, cmd.cooperative_id).await?;
            self.require_member(&db_tx, cmd.cooperative_id, &cmd.user_id)
                .await?;

            let existing = inventory::Entity::find()
                .filter(inventory::Column::CooperativeId.eq(cmd.cooperative_id.to_string()))
                .filter(inventory::Column::ProductType.eq(cmd.product_type.as_str()))
                .filter(inventory::Column::ProductRef.eq(cmd.product_ref.clone()))
                .one(&db_tx)
                .await?;

            let item_id = match existing {
                Some(model) => {
                    let version = model.version;
                    let mut item = InventoryItem::try_from(model)?;
                    item.add(cmd.quantity, cmd.value, now)?;
                    self.store_inventory_item(&db_tx, &item, version).await?;
                    item.id
                }
                None => {
                    let mut item = InventoryItem::new(
                        cmd.cooperative_id,
                        cmd.product_type,
                        cmd.product_ref.clone(),
                        cmd.product_name.clone(),
                        cmd.unit.clone(),
                        now,
                    );
                    item.add(cmd.quantity, cmd.value, now)?;
                    inventory::ActiveModel::from(&item).insert(&db_tx).await?;
                    item.id
                }
            };

            let contribution = InventoryContribution::new(
                item_id,
                cmd.user_id.clone(),
                cmd.quantity,
                cmd.campaign_id,
                cmd.notes.clone(),
                now,
            );
            inventory_contributions::ActiveModel::from(&contribution)
                .insert(&db_tx)
                .await?;

            self.post_entry(
                &db_tx,
                &coop,
                EntryKind::ContributeProduct,
                cmd.value,
                &cmd.user_id,
                Some(format!("{} x{} contributed", cmd.product_name, cmd.quantity)),
                now,
            )
            .await?;

            Ok(contribution)
        })
    }

    /// Takes stock back out of the pool. Leader-only; rejects withdrawals
    /// exceeding current holdings. Returns the value removed with the stock.
    pub async fn withdraw_inventory(
        &self,
        item_id: Uuid,
        user_id: &str,
        quantity: i64,
        now: DateTime<Utc>,
    ) -> ResultEngine<Money> {
        with_tx!(self, |db_tx| {
            let model = self.require_inventory_item(&db_tx, item_id).await?;
            let version = model.version;
            let mut item = InventoryItem::try_from(model)?;

            let coop = self.require_cooperative(&db_tx, item.cooperative_id).await?;
            self.require_leader_or_admin(&db_tx, item.cooperative_id, user_id)
                .await?;

            let removed_value = item.remove(quantity, now)?;
            self.store_inventory_item(&db_tx, &item, version).await?;

            self.post_entry(
                &db_tx,
                &coop,
                EntryKind::WithdrawProduct,
                removed_value,
                user_id,
                Some(format!("{} x{quantity} withdrawn", item.product_name)),
                now,
            )
            .await?;

            Ok(removed_value)
        })
    }

    /// Pays out one contributor's proportional share of a sale.
    ///
    /// The share is `quantity / total_contributed_quantity * proceeds` with
    /// half-up rounding, except for the last unclaimed contribution of the
    /// item, which absorbs the rounding remainder so the claims sum exactly
    /// to the proceeds. Each contribution can be claimed once; the claimed
    /// flag is flipped with a guarded update so a concurrent double claim
    /// loses cleanly.
    pub async fn claim_earnings(
        &self,
        contribution_id: Uuid,
        user_id: &str,
        total_proceeds: Money,
        now: DateTime<Utc>,
    ) -> ResultEngine<Money> {
        with_tx!(self, |db_tx| {
            if !total_proceeds.is_positive() {
                return Err(EngineError::InvalidAmount(
                    "sale proceeds must be positive".to_string(),
                ));
            }

            let model = inventory_contributions::Entity::find_by_id(contribution_id.to_string())
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound("contribution not exists".to_string()))?;
            let contribution = InventoryContribution::try_from(model)?;

            if contribution.user_id != user_id {
                return Err(EngineError::Forbidden(
                    "only the contributor may claim these earnings".to_string(),
                ));
            }
            if contribution.is_claimed {
                return Err(EngineError::AlreadyClaimed(contribution_id.to_string()));
            }

            let item_model = self
                .require_inventory_item(&db_tx, contribution.item_id)
                .await?;
            let item = InventoryItem::try_from(item_model)?;
            let coop = self.require_cooperative(&db_tx, item.cooperative_id).await?;
            let user = self.require_user(&db_tx, user_id).await?;

            let siblings = inventory_contributions::Entity::find()
                .filter(
                    inventory_contributions::Column::ItemId.eq(contribution.item_id.to_string()),
                )
                .all(&db_tx)
                .await?;

            let mut total_quantity: i64 = 0;
            let mut claimed_so_far: i64 = 0;
            let mut unclaimed = 0usize;
            for sibling in &siblings {
                total_quantity += sibling.quantity;
                if sibling.is_claimed {
                    claimed_so_far += sibling.earnings_minor.unwrap_or(0);
                } else {
                    unclaimed += 1;
                }
            }

            let earnings = if unclaimed == 1 {
                // Last claim takes whatever is left of the proceeds.
                Money::new(total_proceeds.minor() - claimed_so_far)
            } else {
                proportional_share(contribution.quantity, total_quantity, total_proceeds)?
            };
            if earnings.is_negative() {
                return Err(EngineError::InvalidAmount(format!(
                    "earlier claims already exceed the proceeds by {}",
                    -earnings
                )));
            }

            let claimed = inventory_contributions::Entity::update_many()
                .col_expr(
                    inventory_contributions::Column::EarningsMinor,
                    Expr::value(Some(earnings.minor())),
                )
                .col_expr(
                    inventory_contributions::Column::IsClaimed,
                    Expr::value(true),
                )
                .col_expr(
                    inventory_contributions::Column::ClaimedAt,
                    Expr::value(Some(now)),
                )
                .filter(inventory_contributions::Column::Id.eq(contribution_id.to_string()))
                .filter(inventory_contributions::Column::IsClaimed.eq(false))
                .exec(&db_tx)
                .await?;
            if claimed.rows_affected == 0 {
                return Err(EngineError::AlreadyClaimed(contribution_id.to_string()));
            }

            if earnings.is_positive() {
                self.post_entry(
                    &db_tx,
                    &coop,
                    EntryKind::ClaimEarnings,
                    earnings,
                    user_id,
                    Some(format!("earnings share for {}", item.product_name)),
                    now,
                )
                .await?;
                self.adjust_user_balance(&db_tx, &user, earnings.minor())
                    .await?;
            }

            tracing::info!(
                contribution = %contribution_id,
                user = user_id,
                earnings = %earnings,
                "inventory earnings claimed"
            );
            Ok(earnings)
        })
    }

    /// A cooperative's inventory, as seen by one of its members.
    pub async fn inventory(
        &self,
        cooperative_id: Uuid,
        user_id: &str,
    ) -> ResultEngine<Vec<InventoryItem>> {
        with_tx!(self, |db_tx| {
            self.require_cooperative(&db_tx, cooperative_id).await?;
            self.require_member(&db_tx, cooperative_id, user_id)
                .await?;
            let models = inventory::Entity::find()
                .filter(inventory::Column::CooperativeId.eq(cooperative_id.to_string()))
                .order_by_asc(inventory::Column::CreatedAt)
                .all(&db_tx)
                .await?;
            models.into_iter().map(InventoryItem::try_from).collect()
        })
    }

    /// Provenance records of an item, oldest first.
    pub async fn inventory_contributions(
        &self,
        item_id: Uuid,
    ) -> ResultEngine<Vec<InventoryContribution>> {
        with_tx!(self, |db_tx| {
            self.require_inventory_item(&db_tx, item_id).await?;
            let models = inventory_contributions::Entity::find()
                .filter(inventory_contributions::Column::ItemId.eq(item_id.to_string()))
                .order_by_asc(inventory_contributions::Column::CreatedAt)
                .all(&db_tx)
                .await?;
            models
                .into_iter()
                .map(InventoryContribution::try_from)
                .collect()
        })
    }

    pub(super) async fn require_inventory_item(
        &self,
        db: &DatabaseTransaction,
        item_id: Uuid,
    ) -> ResultEngine<inventory::Model> {
        inventory::Entity::find_by_id(item_id.to_string())
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("inventory item not exists".to_string()))
    }

    async fn store_inventory_item(
        &self,
        db: &DatabaseTransaction,
        item: &InventoryItem,
        read_version: i64,
    ) -> ResultEngine<()> {
        let updated = inventory::Entity::update_many()
            .col_expr(inventory::Column::Quantity, Expr::value(item.quantity))
            .col_expr(
                inventory::Column::TotalValueMinor,
                Expr::value(item.total_value.minor()),
            )
            .col_expr(inventory::Column::UpdatedAt, Expr::value(item.updated_at))
            .col_expr(inventory::Column::Version, Expr::value(read_version + 1))
            .filter(inventory::Column::Id.eq(item.id.to_string()))
            .filter(inventory::Column::Version.eq(read_version))
            .exec(db)
            .await?;
        if updated.rows_affected == 0 {
            return Err(EngineError::Conflict(
                "inventory item was updated concurrently".to_string(),
            ));
        }
        Ok(())
    }
}
