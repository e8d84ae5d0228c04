use sea_orm::DatabaseConnection;

use crate::{EngineError, Money, ResultEngine};

mod access;
mod buy_campaigns;
mod cooperatives;
mod dissolution;
mod inventory;
mod ledger;
mod sell_campaigns;
mod sweep;
mod transfers;

pub use sweep::SweepReport;

/// Transfers at or above this amount wait for admin verification.
const DEFAULT_TRANSFER_REVIEW_THRESHOLD: Money = Money::new(1_000_000);

/// Run a block inside a DB transaction, committing on success and rolling back on error.
macro_rules! with_tx {
    ($self:expr, |$tx:ident| $body:expr) => {{
        let $tx = $self.database.begin().await?;
        let result = $body;
        match result {
            Ok(value) => {
                $tx.commit().await?;
                Ok(value)
            }
            Err(err) => Err(err),
        }
    }};
}

pub(crate) use with_tx;

#[derive(Debug)]
pub struct Engine {
    database: DatabaseConnection,
    transfer_review_threshold: Money,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    pub fn transfer_review_threshold(&self) -> Money {
        self.transfer_review_threshold
    }
}

fn normalize_required_name(value: &str, label: &str) -> ResultEngine<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(EngineError::InvalidAmount(format!(
            "{label} name must not be empty"
        )));
    }
    Ok(trimmed.to_string())
}

fn normalize_optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
}

/// The builder for `Engine`
pub struct EngineBuilder {
    database: DatabaseConnection,
    transfer_review_threshold: Money,
}

impl Default for EngineBuilder {
    fn default() -> Self {
        Self {
            database: DatabaseConnection::default(),
            transfer_review_threshold: DEFAULT_TRANSFER_REVIEW_THRESHOLD,
        }
    }
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    /// Override the admin-verification threshold for peer transfers.
    pub fn transfer_review_threshold(mut self, threshold: Money) -> EngineBuilder {
        self.transfer_review_threshold = threshold;
        self
    }

    /// Construct `Engine`
    pub async fn build(self) -> ResultEngine<Engine> {
        Ok(Engine {
            database: self.database,
            transfer_review_threshold: self.transfer_review_threshold,
        })
    }
}
