use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::StatusCode;
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::{get, post};
use axum::Router;
use axum_extra::TypedHeader;
use axum_extra::headers::Authorization;
use axum_extra::headers::authorization::Basic;
use engine::users;
use engine::Engine;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use crate::{campaigns, cooperatives, dissolution, inventory, ledger, transfers};

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
    pub db: DatabaseConnection,
}

/// HTTP Basic authentication. Looks the caller up in the users table and
/// hands the row to handlers as a request extension.
async fn auth(
    State(state): State<ServerState>,
    TypedHeader(credentials): TypedHeader<Authorization<Basic>>,
    mut request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let user = users::Entity::find_by_id(credentials.username())
        .filter(users::Column::Password.eq(credentials.password()))
        .one(&state.db)
        .await
        .map_err(|err| {
            tracing::error!(error = %err, "user lookup failed during authentication");
            StatusCode::INTERNAL_SERVER_ERROR
        })?
        .ok_or(StatusCode::UNAUTHORIZED)?;

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

fn router(state: ServerState) -> Router {
    Router::new()
        .route("/cooperative", post(cooperatives::cooperative_new))
        .route("/cooperative/join", post(cooperatives::join))
        .route("/cooperative/{id}", get(cooperatives::cooperative_get))
        .route("/cooperative/{id}/members", get(cooperatives::members_get))
        .route(
            "/cooperative/{id}/approve",
            post(cooperatives::cooperative_approve),
        )
        .route(
            "/cooperative/{id}/reject",
            post(cooperatives::cooperative_reject),
        )
        .route("/cooperative/{id}/deposit", post(ledger::deposit))
        .route("/cooperative/{id}/withdraw", post(ledger::withdraw))
        .route("/cooperative/{id}/ledger", get(ledger::ledger_get))
        .route(
            "/cooperative/{id}/recomputeBalance",
            post(ledger::recompute_balance),
        )
        .route("/buyCampaign", post(campaigns::buy_new))
        .route("/buyCampaign/{id}", get(campaigns::buy_get))
        .route("/buyCampaign/{id}/contribute", post(campaigns::buy_contribute))
        .route("/buyCampaign/{id}/order", post(campaigns::buy_order))
        .route("/buyCampaign/{id}/orderRef", post(campaigns::buy_order_ref))
        .route("/buyCampaign/{id}/close", post(campaigns::buy_close))
        .route(
            "/buyCampaign/{id}/contributions",
            get(campaigns::buy_contributions_get),
        )
        .route("/sellCampaign", post(campaigns::sell_new))
        .route("/sellCampaign/{id}", get(campaigns::sell_get))
        .route(
            "/sellCampaign/{id}/contribute",
            post(campaigns::sell_contribute),
        )
        .route("/sellCampaign/{id}/sold", post(campaigns::sell_sold))
        .route("/sellCampaign/{id}/close", post(campaigns::sell_close))
        .route(
            "/sellCampaign/{id}/contributions",
            get(campaigns::sell_contributions_get),
        )
        .route("/sweepExpired", post(campaigns::sweep_expired))
        .route(
            "/cooperative/{id}/inventory",
            post(inventory::inventory_add).get(inventory::inventory_get),
        )
        .route("/inventory/{id}/withdraw", post(inventory::inventory_withdraw))
        .route(
            "/inventory/{id}/contributions",
            get(inventory::contributions_get),
        )
        .route(
            "/inventoryContribution/{id}/claim",
            post(inventory::claim_earnings),
        )
        .route("/transfer", post(transfers::transfer_new))
        .route(
            "/transfer/awaitingReview",
            get(transfers::awaiting_review_get),
        )
        .route("/transfer/{id}/approve", post(transfers::transfer_approve))
        .route("/transfer/{id}/reject", post(transfers::transfer_reject))
        .route("/transfer/{id}/cancel", post(transfers::transfer_cancel))
        .route(
            "/cooperative/{id}/dissolution",
            post(dissolution::dissolution_new),
        )
        .route(
            "/dissolution/{id}/resolve",
            post(dissolution::dissolution_resolve),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), auth))
        .with_state(state)
}

pub async fn run(engine: Engine, db: DatabaseConnection, bind: &str) -> std::io::Result<()> {
    let listener = TcpListener::bind(bind).await?;
    run_with_listener(engine, db, listener).await
}

pub async fn run_with_listener(
    engine: Engine,
    db: DatabaseConnection,
    listener: TcpListener,
) -> std::io::Result<()> {
    let state = ServerState {
        engine: Arc::new(engine),
        db,
    };
    if let Ok(addr) = listener.local_addr() {
        tracing::info!(%addr, "listening");
    }
    axum::serve(listener, router(state)).await
}

/// Serves on a background task. Used by integration tests.
pub fn spawn_with_listener(
    engine: Engine,
    db: DatabaseConnection,
    listener: TcpListener,
) -> JoinHandle<std::io::Result<()>> {
    tokio::spawn(run_with_listener(engine, db, listener))
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::Request;
    use migration::{Migrator, MigratorTrait};
    use sea_orm::Database;
    use tower::ServiceExt;

    use super::*;

    async fn test_router() -> Router {
        let db = Database::connect("sqlite::memory:")
            .await
            .expect("in-memory database");
        Migrator::up(&db, None).await.expect("migrations");
        let engine = Engine::builder()
            .database(db.clone())
            .build()
            .await
            .expect("engine");
        router(ServerState {
            engine: Arc::new(engine),
            db,
        })
    }

    #[tokio::test]
    async fn missing_credentials_are_rejected() {
        let app = test_router().await;
        let response = app
            .oneshot(
                Request::get("/transfer/awaitingReview")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn unknown_user_gets_401() {
        let app = test_router().await;
        // "ghost:nope"
        let response = app
            .oneshot(
                Request::get("/transfer/awaitingReview")
                    .header("Authorization", "Basic Z2hvc3Q6bm9wZQ==")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
