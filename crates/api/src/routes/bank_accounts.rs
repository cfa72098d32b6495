//! Bank account routes.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;

use ledgersync_db::repositories::OpenBankAccountInput;

use crate::{AppState, error::ApiError, middleware::AuthUser};

/// Creates the bank account routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/bank-accounts", post(open_bank_account))
        .route("/bank-accounts/{bank_account_id}", get(get_bank_account))
}

/// Request body for opening a bank account.
#[derive(Debug, Deserialize)]
pub struct OpenBankAccountRequest {
    /// Unique account number.
    pub account_number: String,
    /// Display name.
    pub name: String,
    /// GL account the bank account mirrors.
    pub gl_account_id: Uuid,
    /// ISO currency code.
    pub currency: String,
    /// Opening balance, posted as a cleared deposit.
    #[serde(default)]
    pub opening_balance: Decimal,
    /// Date of the opening deposit; defaults to today.
    pub opening_date: Option<NaiveDate>,
    /// Allow the balance to go negative.
    #[serde(default)]
    pub allow_overdraft: bool,
}

/// POST `/bank-accounts` - Open a bank account.
async fn open_bank_account(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<OpenBankAccountRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if payload.account_number.trim().is_empty() {
        return Err(ApiError::bad_request(
            "INVALID_ACCOUNT_NUMBER",
            "Account number is required",
        ));
    }
    if payload.currency.len() != 3 {
        return Err(ApiError::bad_request(
            "INVALID_CURRENCY",
            "Currency must be a 3-letter ISO code",
        ));
    }

    let account = state
        .bank_ledger
        .open_account(OpenBankAccountInput {
            account_number: payload.account_number.trim().to_string(),
            name: payload.name,
            gl_account_id: payload.gl_account_id,
            currency: payload.currency.to_uppercase(),
            opening_balance: payload.opening_balance,
            opening_date: payload
                .opening_date
                .unwrap_or_else(|| Utc::now().date_naive()),
            allow_overdraft: payload.allow_overdraft,
            created_by: auth.actor_id(),
        })
        .await?;

    Ok((StatusCode::CREATED, Json(account)))
}

/// GET `/bank-accounts/{bank_account_id}` - Account with its current balance.
async fn get_bank_account(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(bank_account_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let account = state.bank_ledger.get_bank_account(bank_account_id).await?;
    Ok(Json(account))
}
