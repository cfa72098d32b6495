//! Voucher lifecycle routes.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::json;
use tracing::info;
use uuid::Uuid;

use ledgersync_core::voucher::{VoucherLineInput, VoucherStatus};
use ledgersync_db::repositories::{CreateVoucherInput, UpdateVoucherInput, VoucherFilter};

use super::page_request;
use crate::{AppState, error::ApiError, middleware::AuthUser};

/// Creates the voucher routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/vouchers", get(list_vouchers).post(create_voucher))
        .route(
            "/vouchers/{voucher_id}",
            get(get_voucher).put(update_voucher).delete(delete_voucher),
        )
        .route("/vouchers/{voucher_id}/validate", post(validate_voucher))
        .route("/vouchers/{voucher_id}/approve", post(approve_voucher))
        .route("/vouchers/{voucher_id}/cancel", post(cancel_voucher))
        .route("/vouchers/{voucher_id}/history", get(get_status_history))
}

// ============================================================================
// Request Types
// ============================================================================

/// Query parameters for listing vouchers.
#[derive(Debug, Deserialize)]
pub struct ListVouchersQuery {
    /// Filter by status (`DRAFT`, `VALIDATED`, `APPROVED`, `CANCELLED`).
    pub status: Option<String>,
    /// Filter by voucher type.
    pub voucher_type_id: Option<Uuid>,
    /// Filter by fiscal period.
    pub fiscal_period_id: Option<Uuid>,
    /// Filter by header third party.
    pub third_party_id: Option<Uuid>,
    /// Date range start (YYYY-MM-DD).
    pub from: Option<NaiveDate>,
    /// Date range end (YYYY-MM-DD).
    pub to: Option<NaiveDate>,
    /// Page number (1-indexed).
    pub page: Option<u32>,
    /// Page size (max 100).
    pub per_page: Option<u32>,
}

/// Request body for creating a voucher.
#[derive(Debug, Deserialize)]
pub struct CreateVoucherRequest {
    /// Voucher type; picks the numbering counter.
    pub voucher_type_id: Uuid,
    /// Voucher date.
    pub date: NaiveDate,
    /// Fiscal period.
    pub fiscal_period_id: Uuid,
    /// Header third party, inherited by lines without one.
    pub third_party_id: Option<Uuid>,
    /// Description.
    pub description: Option<String>,
    /// Lines in order.
    #[serde(default)]
    pub lines: Vec<VoucherLineInput>,
}

/// Request body for replacing a draft.
#[derive(Debug, Deserialize)]
pub struct UpdateVoucherRequest {
    /// Voucher date.
    pub date: NaiveDate,
    /// Fiscal period.
    pub fiscal_period_id: Uuid,
    /// Header third party.
    pub third_party_id: Option<Uuid>,
    /// Description.
    pub description: Option<String>,
    /// Replacement lines.
    #[serde(default)]
    pub lines: Vec<VoucherLineInput>,
}

/// Request body for cancelling a voucher.
#[derive(Debug, Deserialize)]
pub struct CancelVoucherRequest {
    /// Required, non-blank.
    #[serde(default)]
    pub reason: String,
}

fn parse_status(value: &str) -> Result<VoucherStatus, ApiError> {
    VoucherStatus::parse(value).ok_or_else(|| {
        ApiError::bad_request("INVALID_STATUS", format!("Unknown voucher status: {value}"))
    })
}

// ============================================================================
// Route Handlers
// ============================================================================

/// GET `/vouchers` - List vouchers with filters.
async fn list_vouchers(
    State(state): State<AppState>,
    _auth: AuthUser,
    Query(query): Query<ListVouchersQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let filter = VoucherFilter {
        status: query.status.as_deref().map(parse_status).transpose()?,
        voucher_type_id: query.voucher_type_id,
        fiscal_period_id: query.fiscal_period_id,
        third_party_id: query.third_party_id,
        date_from: query.from,
        date_to: query.to,
    };
    let page = page_request(query.page, query.per_page);

    let vouchers = state.vouchers.list_vouchers(&filter, &page).await?;
    Ok(Json(vouchers))
}

/// POST `/vouchers` - Create a draft voucher.
async fn create_voucher(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<CreateVoucherRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let created = state
        .vouchers
        .create_voucher(CreateVoucherInput {
            voucher_type_id: payload.voucher_type_id,
            date: payload.date,
            fiscal_period_id: payload.fiscal_period_id,
            third_party_id: payload.third_party_id,
            description: payload.description,
            lines: payload.lines,
            created_by: auth.actor_id(),
        })
        .await?;

    Ok((StatusCode::CREATED, Json(created)))
}

/// GET `/vouchers/{voucher_id}` - Voucher with lines.
async fn get_voucher(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(voucher_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let voucher = state.vouchers.get_voucher(voucher_id).await?;
    Ok(Json(voucher))
}

/// PUT `/vouchers/{voucher_id}` - Replace a draft's header and lines.
async fn update_voucher(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(voucher_id): Path<Uuid>,
    Json(payload): Json<UpdateVoucherRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let updated = state
        .vouchers
        .update_draft(
            voucher_id,
            UpdateVoucherInput {
                date: payload.date,
                fiscal_period_id: payload.fiscal_period_id,
                third_party_id: payload.third_party_id,
                description: payload.description,
                lines: payload.lines,
            },
        )
        .await?;

    Ok(Json(updated))
}

/// DELETE `/vouchers/{voucher_id}` - Delete a draft.
async fn delete_voucher(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(voucher_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    state.vouchers.delete_draft(voucher_id, auth.actor_id()).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST `/vouchers/{voucher_id}/validate` - DRAFT to VALIDATED.
async fn validate_voucher(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(voucher_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let voucher = state
        .vouchers
        .validate_voucher(voucher_id, auth.actor_id())
        .await?;
    Ok(Json(voucher))
}

/// POST `/vouchers/{voucher_id}/approve` - Post to the journal and sync banks.
async fn approve_voucher(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(voucher_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let result = state
        .vouchers
        .approve_voucher(voucher_id, auth.actor_id())
        .await?;

    info!(
        voucher_id = %voucher_id,
        actor_id = %auth.actor_id(),
        journal_entry_id = %result.journal_entry_id,
        "Approval request completed"
    );

    Ok(Json(result))
}

/// POST `/vouchers/{voucher_id}/cancel` - Cancel with a reason.
async fn cancel_voucher(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(voucher_id): Path<Uuid>,
    Json(payload): Json<CancelVoucherRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let result = state
        .vouchers
        .cancel_voucher(voucher_id, auth.actor_id(), &payload.reason)
        .await?;
    Ok(Json(result))
}

/// GET `/vouchers/{voucher_id}/history` - Status history, oldest first.
async fn get_status_history(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(voucher_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let history = state.vouchers.get_status_history(voucher_id).await?;
    Ok(Json(json!({ "history": history })))
}
