//! The module contains the errors the engine can throw.
//!
//! The variants follow the business-rule taxonomy: validation failures
//! ([`InvalidAmount`], [`InvalidStatus`]), invariant violations
//! ([`InsufficientFunds`], [`InsufficientStock`], [`AlreadyClaimed`],
//! [`DuplicateRequest`]), concurrency conflicts ([`Conflict`]) and
//! infrastructure faults ([`Database`]).
//!
//! [`InvalidAmount`]: EngineError::InvalidAmount
//! [`InvalidStatus`]: EngineError::InvalidStatus
//! [`InsufficientFunds`]: EngineError::InsufficientFunds
//! [`InsufficientStock`]: EngineError::InsufficientStock
//! [`AlreadyClaimed`]: EngineError::AlreadyClaimed
//! [`DuplicateRequest`]: EngineError::DuplicateRequest
//! [`Conflict`]: EngineError::Conflict
//! [`Database`]: EngineError::Database
use sea_orm::DbErr;
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Insufficient funds: {0}")]
    InsufficientFunds(String),
    #[error("Insufficient stock: {0}")]
    InsufficientStock(String),
    #[error("Already claimed: {0}")]
    AlreadyClaimed(String),
    #[error("Duplicate request: {0}")]
    DuplicateRequest(String),
    #[error("Concurrent update: {0}")]
    Conflict(String),
    #[error("\"{0}\" key not found!")]
    KeyNotFound(String),
    #[error("\"{0}\" already present!")]
    ExistingKey(String),
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("Invalid status: {0}")]
    InvalidStatus(String),
    #[error("Forbidden: {0}")]
    Forbidden(String),
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::InsufficientFunds(a), Self::InsufficientFunds(b)) => a == b,
            (Self::InsufficientStock(a), Self::InsufficientStock(b)) => a == b,
            (Self::AlreadyClaimed(a), Self::AlreadyClaimed(b)) => a == b,
            (Self::DuplicateRequest(a), Self::DuplicateRequest(b)) => a == b,
            (Self::Conflict(a), Self::Conflict(b)) => a == b,
            (Self::KeyNotFound(a), Self::KeyNotFound(b)) => a == b,
            (Self::ExistingKey(a), Self::ExistingKey(b)) => a == b,
            (Self::InvalidAmount(a), Self::InvalidAmount(b)) => a == b,
            (Self::InvalidStatus(a), Self::InvalidStatus(b)) => a == b,
            (Self::Forbidden(a), Self::Forbidden(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
