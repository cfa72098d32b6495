//! Application-wide error taxonomy.
//!
//! Domain errors from the core crate convert into these variants so the
//! HTTP layer renders every failure the same way.

use thiserror::Error;

/// Result type alias using `AppError`.
pub type AppResult<T> = Result<T, AppError>;

/// Application error types.
#[derive(Debug, Error)]
pub enum AppError {
    /// Authentication failed.
    #[error("Authentication failed: {0}")]
    Unauthorized(String),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Malformed input or a broken ledger invariant (imbalance, malformed line).
    #[error("Validation error: {0}")]
    Validation(String),

    /// Illegal state change.
    #[error("Invalid transition: {0}")]
    InvalidTransition(String),

    /// A withdrawal would leave the account below zero.
    #[error("Insufficient funds: {0}")]
    InsufficientFunds(String),

    /// The bank account is inactive.
    #[error("Account inactive: {0}")]
    AccountInactive(String),

    /// Lock contention outlasted the retry budget; the caller may retry later.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Database error.
    #[error("Database error: {0}")]
    Database(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::Unauthorized(_) => 401,
            Self::NotFound(_) => 404,
            Self::Validation(_) => 400,
            Self::InvalidTransition(_) | Self::Conflict(_) => 409,
            Self::InsufficientFunds(_) | Self::AccountInactive(_) => 422,
            Self::Database(_) | Self::Internal(_) => 500,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Unauthorized(_) => "UNAUTHORIZED",
            Self::NotFound(_) => "NOT_FOUND",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::InvalidTransition(_) => "INVALID_TRANSITION",
            Self::InsufficientFunds(_) => "INSUFFICIENT_FUNDS",
            Self::AccountInactive(_) => "ACCOUNT_INACTIVE",
            Self::Conflict(_) => "CONFLICT",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }
}
