//! Error responses.
//!
//! Every failure is rendered as `{"error": <code>, "message": <text>}` with
//! the status the domain error maps to. Server-side failures are logged and
//! their details withheld from the client.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use tracing::error;

use ledgersync_core::ledger::LedgerError;
use ledgersync_core::treasury::BankError;
use ledgersync_core::voucher::VoucherError;
use ledgersync_shared::AppError;

/// An error ready to be sent to the client.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    code: &'static str,
    message: String,
}

impl ApiError {
    /// Creates an error response.
    pub fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
        }
    }

    /// 400 with the given code.
    pub fn bad_request(code: &'static str, message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, code, message)
    }

    /// 401 with the given code.
    pub fn unauthorized(code: &'static str, message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, code, message)
    }

    /// The HTTP status.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    /// The machine-readable code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        self.code
    }

    fn from_parts(status: u16, code: &'static str, message: String) -> Self {
        let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        Self {
            status,
            code,
            message,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let message = if self.status.is_server_error() {
            error!(code = self.code, error = %self.message, "Request failed");
            "An internal error occurred".to_string()
        } else {
            self.message
        };

        (
            self.status,
            Json(json!({ "error": self.code, "message": message })),
        )
            .into_response()
    }
}

impl From<VoucherError> for ApiError {
    fn from(err: VoucherError) -> Self {
        Self::from_parts(err.status_code(), err.error_code(), err.to_string())
    }
}

impl From<BankError> for ApiError {
    fn from(err: BankError) -> Self {
        Self::from_parts(err.status_code(), err.error_code(), err.to_string())
    }
}

impl From<LedgerError> for ApiError {
    fn from(err: LedgerError) -> Self {
        Self::from_parts(err.status_code(), err.error_code(), err.to_string())
    }
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self::from_parts(err.status_code(), err.error_code(), err.to_string())
    }
}
