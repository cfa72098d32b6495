//! Bank transaction routes.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use ledgersync_core::treasury::{BankTransactionStatus, BankTransactionType};
use ledgersync_db::repositories::{BankTransactionFilter, CreateBankTransactionInput};

use super::page_request;
use crate::{AppState, error::ApiError, middleware::AuthUser};

/// Creates the bank transaction routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/bank-transactions",
            get(list_bank_transactions).post(create_bank_transaction),
        )
        .route(
            "/bank-transactions/{transaction_id}",
            get(get_bank_transaction),
        )
        .route(
            "/bank-transactions/{transaction_id}/history",
            get(get_transaction_history),
        )
        .route(
            "/bank-transactions/{transaction_id}/confirm",
            post(confirm_bank_transaction),
        )
        .route(
            "/bank-transactions/{transaction_id}/void",
            post(void_bank_transaction),
        )
}

// ============================================================================
// Request Types
// ============================================================================

/// Query parameters for listing bank transactions.
#[derive(Debug, Deserialize)]
pub struct ListBankTransactionsQuery {
    /// Filter by account.
    pub bank_account_id: Option<Uuid>,
    /// Filter by status (`pending`, `cleared`, `voided`).
    pub status: Option<String>,
    /// Filter by movement kind.
    #[serde(rename = "type")]
    pub transaction_type: Option<String>,
    /// Filter by originating journal entry.
    pub journal_entry_id: Option<Uuid>,
    /// Date range start (YYYY-MM-DD).
    pub from: Option<NaiveDate>,
    /// Date range end (YYYY-MM-DD).
    pub to: Option<NaiveDate>,
    /// Page number (1-indexed).
    pub page: Option<u32>,
    /// Page size (max 100).
    pub per_page: Option<u32>,
}

/// Request body for a manual bank transaction.
#[derive(Debug, Deserialize)]
pub struct CreateBankTransactionRequest {
    /// Target account.
    pub bank_account_id: Uuid,
    /// `deposit`, `withdrawal`, `transfer`, `payment` or `receipt`.
    #[serde(rename = "type")]
    pub transaction_type: String,
    /// Strictly positive amount.
    pub amount: Decimal,
    /// Value date.
    pub transaction_date: NaiveDate,
    /// Description.
    pub description: Option<String>,
    /// External reference, e.g. a cheque number.
    pub reference: Option<String>,
    /// Apply to the balance now instead of leaving it pending.
    #[serde(default)]
    pub cleared: bool,
    /// Allow a negative balance for this transaction.
    #[serde(default)]
    pub allow_overdraft: bool,
}

/// Request body for voiding a bank transaction.
#[derive(Debug, Deserialize)]
pub struct VoidBankTransactionRequest {
    /// Required, non-blank.
    #[serde(default)]
    pub reason: String,
}

fn parse_type(value: &str) -> Result<BankTransactionType, ApiError> {
    BankTransactionType::parse(value).ok_or_else(|| {
        ApiError::bad_request(
            "INVALID_TRANSACTION_TYPE",
            format!("Unknown bank transaction type: {value}"),
        )
    })
}

fn parse_status(value: &str) -> Result<BankTransactionStatus, ApiError> {
    BankTransactionStatus::parse(value).ok_or_else(|| {
        ApiError::bad_request(
            "INVALID_STATUS",
            format!("Unknown bank transaction status: {value}"),
        )
    })
}

// ============================================================================
// Route Handlers
// ============================================================================

/// GET `/bank-transactions` - List transactions, newest first.
async fn list_bank_transactions(
    State(state): State<AppState>,
    _auth: AuthUser,
    Query(query): Query<ListBankTransactionsQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let filter = BankTransactionFilter {
        bank_account_id: query.bank_account_id,
        status: query.status.as_deref().map(parse_status).transpose()?,
        transaction_type: query.transaction_type.as_deref().map(parse_type).transpose()?,
        journal_entry_id: query.journal_entry_id,
        date_from: query.from,
        date_to: query.to,
    };
    let page = page_request(query.page, query.per_page);

    let transactions = state
        .bank_ledger
        .list_bank_transactions(&filter, &page)
        .await?;
    Ok(Json(transactions))
}

/// POST `/bank-transactions` - Record a manual movement.
async fn create_bank_transaction(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<CreateBankTransactionRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let transaction_type = parse_type(&payload.transaction_type)?;

    let tx = state
        .bank_ledger
        .create_bank_transaction(CreateBankTransactionInput {
            bank_account_id: payload.bank_account_id,
            transaction_type,
            amount: payload.amount,
            transaction_date: payload.transaction_date,
            description: payload.description,
            reference: payload.reference,
            cleared: payload.cleared,
            allow_overdraft: payload.allow_overdraft,
            journal_entry_id: None,
            document_type: None,
            document_id: None,
            created_by: auth.actor_id(),
        })
        .await?;

    Ok((StatusCode::CREATED, Json(tx)))
}

/// GET `/bank-transactions/{transaction_id}`
async fn get_bank_transaction(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(transaction_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let tx = state.bank_ledger.get_bank_transaction(transaction_id).await?;
    Ok(Json(tx))
}

/// GET `/bank-transactions/{transaction_id}/history`
async fn get_transaction_history(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(transaction_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let history = state
        .bank_ledger
        .get_transaction_history(transaction_id)
        .await?;
    Ok(Json(json!({ "history": history })))
}

/// POST `/bank-transactions/{transaction_id}/confirm` - Pending to cleared.
async fn confirm_bank_transaction(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(transaction_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let tx = state
        .bank_ledger
        .confirm_bank_transaction(transaction_id, auth.actor_id())
        .await?;
    Ok(Json(tx))
}

/// POST `/bank-transactions/{transaction_id}/void` - Void, reversing a cleared balance effect.
async fn void_bank_transaction(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(transaction_id): Path<Uuid>,
    Json(payload): Json<VoidBankTransactionRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let tx = state
        .bank_ledger
        .void_bank_transaction(transaction_id, auth.actor_id(), &payload.reason)
        .await?;
    Ok(Json(tx))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_type() {
        assert_eq!(parse_type("deposit").unwrap(), BankTransactionType::Deposit);
        assert_eq!(parse_type("PAYMENT").unwrap(), BankTransactionType::Payment);
        assert_eq!(parse_type("refund").unwrap_err().code(), "INVALID_TRANSACTION_TYPE");
    }

    #[test]
    fn test_parse_status() {
        assert_eq!(parse_status("cleared").unwrap(), BankTransactionStatus::Cleared);
        assert_eq!(parse_status("posted").unwrap_err().code(), "INVALID_STATUS");
    }

    #[test]
    fn test_create_request_defaults_to_pending() {
        let body = r#"{
            "bank_account_id": "0190f5a0-0000-7000-8000-000000000001",
            "type": "withdrawal",
            "amount": "800.00",
            "transaction_date": "2026-05-10"
        }"#;
        let request: CreateBankTransactionRequest = serde_json::from_str(body).unwrap();
        assert!(!request.cleared);
        assert!(!request.allow_overdraft);
        assert_eq!(request.amount, Decimal::new(80_000, 2));
    }
}
