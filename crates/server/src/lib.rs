//! HTTP surface for the cooperative fund engine.
//!
//! Thin axum layer: every handler authenticates through HTTP Basic,
//! delegates to [`engine::Engine`] and translates [`EngineError`] into
//! an HTTP status plus a JSON `{"error": ...}` body.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use engine::EngineError;
use serde::{Deserialize, Serialize};

mod campaigns;
mod cooperatives;
mod dissolution;
mod inventory;
mod ledger;
mod server;
mod transfers;

pub use server::{run, run_with_listener, spawn_with_listener};

#[derive(Debug)]
pub enum ServerError {
    Engine(EngineError),
    Generic(String),
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Error {
    pub error: String,
}

impl From<EngineError> for ServerError {
    fn from(err: EngineError) -> Self {
        Self::Engine(err)
    }
}

fn status_for_engine_error(err: &EngineError) -> StatusCode {
    match err {
        EngineError::Forbidden(_) => StatusCode::FORBIDDEN,
        EngineError::KeyNotFound(_) => StatusCode::NOT_FOUND,
        EngineError::ExistingKey(_)
        | EngineError::DuplicateRequest(_)
        | EngineError::AlreadyClaimed(_)
        | EngineError::Conflict(_) => StatusCode::CONFLICT,
        EngineError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        EngineError::InsufficientFunds(_)
        | EngineError::InsufficientStock(_)
        | EngineError::InvalidAmount(_)
        | EngineError::InvalidStatus(_) => StatusCode::UNPROCESSABLE_ENTITY,
    }
}

/// Database errors carry connection details that must not leak to clients.
fn message_for_engine_error(err: &EngineError) -> String {
    match err {
        EngineError::Database(db_err) => {
            tracing::error!(error = %db_err, "database failure while serving a request");
            "internal error".to_string()
        }
        other => other.to_string(),
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            Self::Engine(err) => (status_for_engine_error(err), message_for_engine_error(err)),
            Self::Generic(message) => (StatusCode::INTERNAL_SERVER_ERROR, message.clone()),
        };
        (status, Json(Error { error: message })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forbidden_maps_to_403() {
        assert_eq!(
            status_for_engine_error(&EngineError::Forbidden("admins only".to_string())),
            StatusCode::FORBIDDEN
        );
    }

    #[test]
    fn missing_key_maps_to_404() {
        let err = EngineError::KeyNotFound("cooperative".to_string());
        assert_eq!(status_for_engine_error(&err), StatusCode::NOT_FOUND);
    }

    #[test]
    fn conflicting_writes_map_to_409() {
        assert_eq!(
            status_for_engine_error(&EngineError::ExistingKey("cooperative".to_string())),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_for_engine_error(&EngineError::AlreadyClaimed("contribution".to_string())),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_for_engine_error(&EngineError::Conflict("stale version".to_string())),
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn validation_failures_map_to_422() {
        assert_eq!(
            status_for_engine_error(&EngineError::InsufficientFunds(
                "fund balance too low".to_string()
            )),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            status_for_engine_error(&EngineError::InvalidAmount("zero".to_string())),
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }

    #[test]
    fn database_errors_stay_opaque() {
        let err = EngineError::Database(sea_orm::DbErr::Custom(
            "sqlite://secret-host/db".to_string(),
        ));
        assert_eq!(
            status_for_engine_error(&err),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(message_for_engine_error(&err), "internal error");
    }
}
