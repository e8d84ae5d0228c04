//! Peer money-transfer mediation.

use chrono::{DateTime, Utc};
use sea_orm::{
    DatabaseTransaction, QueryFilter, QueryOrder, TransactionTrait, prelude::*, sea_query::Expr,
};
use uuid::Uuid;

use crate::{
    EngineError, Money, ResultEngine, TransferRequest, TransferStatus, transfers,
};

use super::{Engine, normalize_required_name, with_tx};

impl Engine {
    /// Opens a peer transfer. Below the review threshold the money moves
    /// immediately and the request is recorded COMPLETED; at or above it the
    /// request parks AWAITING_ADMIN with both balances untouched.
    pub async fn request_transfer(
        &self,
        sender_id: &str,
        receiver_id: &str,
        amount: Money,
        now: DateTime<Utc>,
    ) -> ResultEngine<TransferRequest> {
        let requires_verification = amount >= self.transfer_review_threshold();
        with_tx!(self, |db_tx| {
            let sender = self.require_user(&db_tx, sender_id).await?;
            self.require_user(&db_tx, receiver_id).await?;

            let mut transfer = TransferRequest::new(
                sender_id.to_string(),
                receiver_id.to_string(),
                amount,
                requires_verification,
                now,
            )?;

            if requires_verification {
                transfer.status = TransferStatus::AwaitingAdmin;
                tracing::info!(
                    transfer = %transfer.id,
                    amount = %amount,
                    "transfer parked for admin verification"
                );
            } else {
                if sender.balance_minor < amount.minor() {
                    return Err(EngineError::InsufficientFunds(format!(
                        "personal balance {} cannot cover {amount}",
                        Money::new(sender.balance_minor)
                    )));
                }
                self.settle_transfer(&db_tx, &transfer).await?;
                transfer.status = TransferStatus::Completed;
                transfer.processed_at = Some(now);
            }

            transfers::ActiveModel::from(&transfer).insert(&db_tx).await?;
            Ok(transfer)
        })
    }

    /// Admin approval of a parked transfer; the sender's balance is
    /// re-checked at approval time since it may have moved since the
    /// request.
    pub async fn approve_transfer(
        &self,
        transfer_id: Uuid,
        admin: &str,
        now: DateTime<Utc>,
    ) -> ResultEngine<TransferRequest> {
        with_tx!(self, |db_tx| {
            self.require_admin(&db_tx, admin).await?;
            let model = self.require_transfer(&db_tx, transfer_id).await?;
            let previous = TransferStatus::try_from(model.status.as_str())?;
            let mut transfer = TransferRequest::try_from(model)?;

            transfer.approve(admin, now)?;

            let sender = self.require_user(&db_tx, &transfer.sender_id).await?;
            if sender.balance_minor < transfer.amount.minor() {
                return Err(EngineError::InsufficientFunds(format!(
                    "sender balance {} cannot cover {}",
                    Money::new(sender.balance_minor),
                    transfer.amount
                )));
            }
            self.store_transfer(&db_tx, &transfer, previous).await?;
            self.settle_transfer(&db_tx, &transfer).await?;

            tracing::info!(transfer = %transfer.id, by = admin, "transfer approved and settled");
            Ok(transfer)
        })
    }

    /// Admin rejection; balances stay untouched.
    pub async fn reject_transfer(
        &self,
        transfer_id: Uuid,
        admin: &str,
        reason: &str,
        now: DateTime<Utc>,
    ) -> ResultEngine<TransferRequest> {
        let reason = normalize_required_name(reason, "rejection reason")?;
        with_tx!(self, |db_tx| {
            self.require_admin(&db_tx, admin).await?;
            let model = self.require_transfer(&db_tx, transfer_id).await?;
            let previous = TransferStatus::try_from(model.status.as_str())?;
            let mut transfer = TransferRequest::try_from(model)?;

            transfer.reject(admin, reason, now)?;
            self.store_transfer(&db_tx, &transfer, previous).await?;

            tracing::info!(transfer = %transfer.id, by = admin, "transfer rejected");
            Ok(transfer)
        })
    }

    /// The sender backs out of an unresolved transfer.
    pub async fn cancel_transfer(
        &self,
        transfer_id: Uuid,
        user_id: &str,
        now: DateTime<Utc>,
    ) -> ResultEngine<TransferRequest> {
        with_tx!(self, |db_tx| {
            let model = self.require_transfer(&db_tx, transfer_id).await?;
            let previous = TransferStatus::try_from(model.status.as_str())?;
            let mut transfer = TransferRequest::try_from(model)?;

            if transfer.sender_id != user_id {
                return Err(EngineError::Forbidden(
                    "only the sender may cancel a transfer".to_string(),
                ));
            }

            transfer.cancel(now)?;
            self.store_transfer(&db_tx, &transfer, previous).await?;
            Ok(transfer)
        })
    }

    /// Transfers awaiting admin verification, oldest first.
    pub async fn transfers_awaiting_review(
        &self,
        admin: &str,
    ) -> ResultEngine<Vec<TransferRequest>> {
        with_tx!(self, |db_tx| {
            self.require_admin(&db_tx, admin).await?;
            let models = transfers::Entity::find()
                .filter(transfers::Column::Status.eq(TransferStatus::AwaitingAdmin.as_str()))
                .order_by_asc(transfers::Column::CreatedAt)
                .all(&db_tx)
                .await?;
            models.into_iter().map(TransferRequest::try_from).collect()
        })
    }

    /// Debits the sender and credits the receiver in the same transaction,
    /// each side under its own optimistic version check.
    async fn settle_transfer(
        &self,
        db: &DatabaseTransaction,
        transfer: &TransferRequest,
    ) -> ResultEngine<()> {
        let sender = self.require_user(db, &transfer.sender_id).await?;
        let receiver = self.require_user(db, &transfer.receiver_id).await?;
        self.adjust_user_balance(db, &sender, -transfer.amount.minor())
            .await?;
        self.adjust_user_balance(db, &receiver, transfer.amount.minor())
            .await?;
        Ok(())
    }

    async fn require_transfer(
        &self,
        db: &DatabaseTransaction,
        transfer_id: Uuid,
    ) -> ResultEngine<transfers::Model> {
        transfers::Entity::find_by_id(transfer_id.to_string())
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("transfer not exists".to_string()))
    }

    /// Persists a status transition, guarded on the status the row was read
    /// with so two concurrent resolutions cannot both win.
    async fn store_transfer(
        &self,
        db: &DatabaseTransaction,
        transfer: &TransferRequest,
        previous: TransferStatus,
    ) -> ResultEngine<()> {
        let updated = transfers::Entity::update_many()
            .col_expr(
                transfers::Column::Status,
                Expr::value(transfer.status.as_str()),
            )
            .col_expr(
                transfers::Column::RejectionReason,
                Expr::value(transfer.rejection_reason.clone()),
            )
            .col_expr(
                transfers::Column::ProcessedBy,
                Expr::value(transfer.processed_by.clone()),
            )
            .col_expr(
                transfers::Column::ProcessedAt,
                Expr::value(transfer.processed_at),
            )
            .filter(transfers::Column::Id.eq(transfer.id.to_string()))
            .filter(transfers::Column::Status.eq(previous.as_str()))
            .exec(db)
            .await?;
        if updated.rows_affected == 0 {
            return Err(EngineError::Conflict(
                "transfer was resolved concurrently".to_string(),
            ));
        }
        Ok(())
    }
}
