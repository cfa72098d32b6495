//! Journal entry routes.

use axum::{
    Json, Router,
    extract::{Path, State},
    response::IntoResponse,
    routing::get,
};
use uuid::Uuid;

use crate::{AppState, error::ApiError, middleware::AuthUser};

/// Creates the journal entry routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/journal-entries/{entry_id}", get(get_journal_entry))
        .route("/journal-entries/{entry_id}/bank-sync", get(validate_bank_sync))
}

/// GET `/journal-entries/{entry_id}` - Entry with lines in order.
async fn get_journal_entry(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(entry_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let entry = state.journal.get_journal_entry(entry_id).await?;
    Ok(Json(entry))
}

/// GET `/journal-entries/{entry_id}/bank-sync` - Compare bank-linked lines
/// with the bank transactions referencing the entry.
async fn validate_bank_sync(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(entry_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let report = state.bank_sync.validate_sync(entry_id).await?;
    Ok(Json(report))
}
