//! HTTP API layer with Axum routes and middleware.
//!
//! This crate provides:
//! - REST routes for vouchers, bank accounts, bank transactions and journal entries
//! - JWT authentication middleware supplying the acting user
//! - Uniform JSON error responses

pub mod error;
pub mod middleware;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use sea_orm::DatabaseConnection;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use ledgersync_core::treasury::RetryPolicy;
use ledgersync_db::{
    BankLedgerRepository, BankSyncRepository, JournalRepository, VoucherRepository,
};
use ledgersync_shared::JwtService;

pub use error::ApiError;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// JWT service for token validation.
    pub jwt_service: Arc<JwtService>,
    /// Voucher lifecycle.
    pub vouchers: VoucherRepository,
    /// Bank accounts and transactions.
    pub bank_ledger: BankLedgerRepository,
    /// Sync checks between journal entries and bank transactions.
    pub bank_sync: BankSyncRepository,
    /// Journal entry queries.
    pub journal: JournalRepository,
}

impl AppState {
    /// Wires the repositories over one connection pool.
    #[must_use]
    pub fn new(
        db: DatabaseConnection,
        jwt_service: JwtService,
        policy: RetryPolicy,
        allow_overdraft: bool,
    ) -> Self {
        let bank_ledger = BankLedgerRepository::new(db.clone(), policy, allow_overdraft);
        Self {
            jwt_service: Arc::new(jwt_service),
            vouchers: VoucherRepository::new(db.clone(), bank_ledger.clone()),
            bank_sync: BankSyncRepository::new(db.clone(), bank_ledger.clone()),
            journal: JournalRepository::new(db),
            bank_ledger,
        }
    }
}

/// Creates the main application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1", routes::api_routes(state.clone()))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{Request, StatusCode, header::AUTHORIZATION},
    };
    use http_body_util::BodyExt;
    use ledgersync_shared::JwtConfig;
    use tower::ServiceExt;
    use uuid::Uuid;

    fn test_state() -> AppState {
        AppState::new(
            DatabaseConnection::Disconnected,
            JwtService::new(JwtConfig {
                secret: "router-test-secret".to_string(),
                access_token_expires_minutes: 15,
            }),
            RetryPolicy::no_retry(),
            false,
        )
    }

    fn bearer(state: &AppState) -> String {
        let token = state
            .jwt_service
            .generate_access_token(Uuid::now_v7(), "accountant")
            .unwrap();
        format!("Bearer {token}")
    }

    async fn send(app: Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
        (status, body)
    }

    #[tokio::test]
    async fn test_health_is_public() {
        let app = create_router(test_state());

        let (status, body) = send(
            app,
            Request::get("/api/v1/health").body(Body::empty()).unwrap(),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
    }

    #[tokio::test]
    async fn test_protected_route_requires_token() {
        let app = create_router(test_state());

        let (status, body) = send(
            app,
            Request::get("/api/v1/vouchers").body(Body::empty()).unwrap(),
        )
        .await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "MISSING_TOKEN");
    }

    #[tokio::test]
    async fn test_invalid_token_rejected() {
        let app = create_router(test_state());

        let (status, body) = send(
            app,
            Request::post(format!("/api/v1/vouchers/{}/approve", Uuid::now_v7()))
                .header(AUTHORIZATION, "Bearer not-a-jwt")
                .body(Body::empty())
                .unwrap(),
        )
        .await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "INVALID_TOKEN");
    }

    #[tokio::test]
    async fn test_unknown_status_filter_is_bad_request() {
        let state = test_state();
        let auth = bearer(&state);
        let app = create_router(state);

        let (status, body) = send(
            app,
            Request::get("/api/v1/vouchers?status=posted")
                .header(AUTHORIZATION, auth)
                .body(Body::empty())
                .unwrap(),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "INVALID_STATUS");
    }

    #[tokio::test]
    async fn test_unknown_transaction_type_is_bad_request() {
        let state = test_state();
        let auth = bearer(&state);
        let app = create_router(state);

        let (status, body) = send(
            app,
            Request::post("/api/v1/bank-transactions")
                .header(AUTHORIZATION, auth)
                .header("Content-Type", "application/json")
                .body(Body::from(format!(
                    r#"{{"bank_account_id":"{}","type":"refund","amount":"10","transaction_date":"2026-05-10"}}"#,
                    Uuid::now_v7()
                )))
                .unwrap(),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "INVALID_TRANSACTION_TYPE");
    }

    #[tokio::test]
    async fn test_database_failure_is_hidden() {
        let state = test_state();
        let auth = bearer(&state);
        let app = create_router(state);

        let (status, body) = send(
            app,
            Request::get(format!("/api/v1/vouchers/{}", Uuid::now_v7()))
                .header(AUTHORIZATION, auth)
                .body(Body::empty())
                .unwrap(),
        )
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["message"], "An internal error occurred");
    }
}
