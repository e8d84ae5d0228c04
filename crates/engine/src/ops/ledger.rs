//! Fund ledger operations.
//!
//! All balance mutation funnels through [`Engine::post_entry`]: it derives
//! the direction from the entry kind, rejects overdrafts, bumps the
//! cooperative's cached balance under an optimistic version check and
//! appends the immutable entry with its balance-after snapshot.

use chrono::{DateTime, Utc};
use sea_orm::{
    DatabaseTransaction, QueryFilter, QueryOrder, TransactionTrait, prelude::*, sea_query::Expr,
};
use uuid::Uuid;

use crate::{
    EngineError, EntryKind, LedgerEntry, Money, ResultEngine, cooperatives, ledger, members, users,
};

use super::{Engine, normalize_optional_text, with_tx};

impl Engine {
    /// Appends a ledger entry and moves the cooperative's cached balance in
    /// the same atomic unit. `amount` is the magnitude; `kind.sign()` gives
    /// the direction. Zero-sign kinds record product movements and carry the
    /// goods' value without touching the balance.
    pub(super) async fn post_entry(
        &self,
        db: &DatabaseTransaction,
        coop: &cooperatives::Model,
        kind: EntryKind,
        amount: Money,
        actor: &str,
        description: Option<String>,
        now: DateTime<Utc>,
    ) -> ResultEngine<LedgerEntry> {
        if amount.is_negative() || (kind.sign() != 0 && !amount.is_positive()) {
            return Err(EngineError::InvalidAmount(format!(
                "ledger amount must be positive, got {amount}"
            )));
        }

        let delta = kind.sign() * amount.minor();
        let new_balance = coop.balance_minor.checked_add(delta).ok_or_else(|| {
            EngineError::InvalidAmount("fund balance overflow".to_string())
        })?;
        if new_balance < 0 {
            return Err(EngineError::InsufficientFunds(format!(
                "fund holds {}, cannot debit {amount}",
                Money::new(coop.balance_minor)
            )));
        }

        if delta != 0 {
            let updated = cooperatives::Entity::update_many()
                .col_expr(cooperatives::Column::BalanceMinor, Expr::value(new_balance))
                .col_expr(cooperatives::Column::Version, Expr::value(coop.version + 1))
                .filter(cooperatives::Column::Id.eq(coop.id.clone()))
                .filter(cooperatives::Column::Version.eq(coop.version))
                .exec(db)
                .await?;
            if updated.rows_affected == 0 {
                return Err(EngineError::Conflict(
                    "cooperative fund was updated concurrently".to_string(),
                ));
            }
        }

        let entry = LedgerEntry {
            id: None,
            cooperative_id: Uuid::parse_str(&coop.id)
                .map_err(|_| EngineError::KeyNotFound("cooperative not exists".to_string()))?,
            kind,
            amount,
            balance_after: Money::new(new_balance),
            actor_id: actor.to_string(),
            description,
            created_at: now,
        };
        let inserted = ledger::ActiveModel::from(&entry).insert(db).await?;

        tracing::debug!(
            cooperative = %coop.code,
            kind = kind.as_str(),
            amount = %amount,
            balance_after = new_balance,
            "ledger entry posted"
        );

        LedgerEntry::try_from(inserted)
    }

    /// Moves money from a member's personal balance into the shared fund.
    pub async fn deposit(
        &self,
        cooperative_id: Uuid,
        user_id: &str,
        amount: Money,
        description: Option<&str>,
        now: DateTime<Utc>,
    ) -> ResultEngine<LedgerEntry> {
        let description = normalize_optional_text(description);
        with_tx!(self, |db_tx| {
            let coop = self.require_cooperative(&db_tx, cooperative_id).await?;
            let membership = self
                .require_member(&db_tx, cooperative_id, user_id)
                .await?;
            let user = self.require_user(&db_tx, user_id).await?;

            if !amount.is_positive() {
                return Err(EngineError::InvalidAmount(
                    "deposit amount must be positive".to_string(),
                ));
            }
            if user.balance_minor < amount.minor() {
                return Err(EngineError::InsufficientFunds(format!(
                    "personal balance {} cannot cover {amount}",
                    Money::new(user.balance_minor)
                )));
            }

            self.adjust_user_balance(&db_tx, &user, -amount.minor())
                .await?;
            let entry = self
                .post_entry(
                    &db_tx,
                    &coop,
                    EntryKind::Deposit,
                    amount,
                    user_id,
                    description,
                    now,
                )
                .await?;

            // Lifetime contribution total, informational only.
            members::Entity::update_many()
                .col_expr(
                    members::Column::ContributionMinor,
                    Expr::col(members::Column::ContributionMinor).add(amount.minor()),
                )
                .filter(members::Column::Id.eq(membership.id))
                .exec(&db_tx)
                .await?;

            Ok(entry)
        })
    }

    /// Moves money from the shared fund back to a member's personal balance.
    /// Leader-only; rejects when the fund would go negative.
    pub async fn withdraw(
        &self,
        cooperative_id: Uuid,
        user_id: &str,
        amount: Money,
        description: Option<&str>,
        now: DateTime<Utc>,
    ) -> ResultEngine<LedgerEntry> {
        let description = normalize_optional_text(description);
        with_tx!(self, |db_tx| {
            let coop = self.require_cooperative(&db_tx, cooperative_id).await?;
            self.require_leader(&db_tx, cooperative_id, user_id).await?;
            let user = self.require_user(&db_tx, user_id).await?;

            if !amount.is_positive() {
                return Err(EngineError::InvalidAmount(
                    "withdrawal amount must be positive".to_string(),
                ));
            }

            let entry = self
                .post_entry(
                    &db_tx,
                    &coop,
                    EntryKind::Withdrawal,
                    amount,
                    user_id,
                    description,
                    now,
                )
                .await?;
            self.adjust_user_balance(&db_tx, &user, amount.minor())
                .await?;

            Ok(entry)
        })
    }

    /// Entries of a cooperative's ledger, oldest first.
    pub async fn ledger(
        &self,
        cooperative_id: Uuid,
        user_id: &str,
    ) -> ResultEngine<Vec<LedgerEntry>> {
        with_tx!(self, |db_tx| {
            self.require_cooperative(&db_tx, cooperative_id).await?;
            self.require_member(&db_tx, cooperative_id, user_id)
                .await?;

            let models = ledger::Entity::find()
                .filter(ledger::Column::CooperativeId.eq(cooperative_id.to_string()))
                .order_by_asc(ledger::Column::Id)
                .all(&db_tx)
                .await?;
            models.into_iter().map(LedgerEntry::try_from).collect()
        })
    }

    /// Replays the full ledger and repairs the cached fund balance if it has
    /// drifted. Returns the recomputed balance. Admin-only audit operation.
    pub async fn recompute_balance(
        &self,
        cooperative_id: Uuid,
        admin: &str,
    ) -> ResultEngine<Money> {
        with_tx!(self, |db_tx| {
            self.require_admin(&db_tx, admin).await?;
            let coop = self.require_cooperative(&db_tx, cooperative_id).await?;

            let models = ledger::Entity::find()
                .filter(ledger::Column::CooperativeId.eq(cooperative_id.to_string()))
                .order_by_asc(ledger::Column::Id)
                .all(&db_tx)
                .await?;

            let mut balance: i64 = 0;
            for model in models {
                let entry = LedgerEntry::try_from(model)?;
                balance = balance
                    .checked_add(entry.kind.sign() * entry.amount.minor())
                    .ok_or_else(|| {
                        EngineError::InvalidAmount("fund balance overflow".to_string())
                    })?;
            }

            if balance != coop.balance_minor {
                tracing::warn!(
                    cooperative = %coop.code,
                    cached = coop.balance_minor,
                    recomputed = balance,
                    "cached fund balance drifted, repairing"
                );
                let updated = cooperatives::Entity::update_many()
                    .col_expr(cooperatives::Column::BalanceMinor, Expr::value(balance))
                    .col_expr(cooperatives::Column::Version, Expr::value(coop.version + 1))
                    .filter(cooperatives::Column::Id.eq(coop.id.clone()))
                    .filter(cooperatives::Column::Version.eq(coop.version))
                    .exec(&db_tx)
                    .await?;
                if updated.rows_affected == 0 {
                    return Err(EngineError::Conflict(
                        "cooperative fund was updated concurrently".to_string(),
                    ));
                }
            }

            Ok(Money::new(balance))
        })
    }

    /// Applies `delta_minor` to a user's personal balance under the user's
    /// optimistic version check. The caller validates sufficiency first.
    pub(super) async fn adjust_user_balance(
        &self,
        db: &DatabaseTransaction,
        user: &users::Model,
        delta_minor: i64,
    ) -> ResultEngine<()> {
        let new_balance = user.balance_minor.checked_add(delta_minor).ok_or_else(|| {
            EngineError::InvalidAmount("personal balance overflow".to_string())
        })?;
        if new_balance < 0 {
            return Err(EngineError::InsufficientFunds(format!(
                "personal balance {} cannot cover {}",
                Money::new(user.balance_minor),
                Money::new(-delta_minor)
            )));
        }
        let updated = users::Entity::update_many()
            .col_expr(users::Column::BalanceMinor, Expr::value(new_balance))
            .col_expr(users::Column::Version, Expr::value(user.version + 1))
            .filter(users::Column::Username.eq(user.username.clone()))
            .filter(users::Column::Version.eq(user.version))
            .exec(db)
            .await?;
        if updated.rows_affected == 0 {
            return Err(EngineError::Conflict(
                "personal balance was updated concurrently".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use migration::MigratorTrait;
    use sea_orm::{ConnectionTrait, Database, Statement};

    use super::*;

    #[tokio::test]
    async fn stale_balance_writes_are_rejected() {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        migration::Migrator::up(&db, None).await.unwrap();
        db.execute(Statement::from_sql_and_values(
            db.get_database_backend(),
            "INSERT INTO users (username, password, balance_minor) VALUES (?, ?, ?)",
            vec!["carol".into(), "password".into(), 1_000_i64.into()],
        ))
        .await
        .unwrap();
        let engine = Engine::builder().database(db).build().await.unwrap();

        let db_tx = engine.database.begin().await.unwrap();
        let user = engine.require_user(&db_tx, "carol").await.unwrap();
        engine.adjust_user_balance(&db_tx, &user, 500).await.unwrap();
        db_tx.commit().await.unwrap();

        // The same pre-read row is now a version behind.
        let db_tx = engine.database.begin().await.unwrap();
        let err = engine
            .adjust_user_balance(&db_tx, &user, 500)
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::Conflict(_)));
    }
}
