//! Voucher error types.

use thiserror::Error;
use uuid::Uuid;

use ledgersync_shared::AppError;

use super::types::VoucherStatus;
use crate::ledger::LedgerError;
use crate::sequence::SequenceError;
use crate::treasury::BankError;

/// Errors that can occur during voucher operations.
#[derive(Debug, Error)]
pub enum VoucherError {
    /// Voucher not found.
    #[error("Voucher not found: {0}")]
    NotFound(Uuid),

    /// Voucher type not found.
    #[error("Voucher type not found: {0}")]
    VoucherTypeNotFound(Uuid),

    /// Voucher type is inactive.
    #[error("Voucher type {0} is inactive")]
    VoucherTypeInactive(Uuid),

    /// Fiscal period not found.
    #[error("Fiscal period not found: {0}")]
    FiscalPeriodNotFound(Uuid),

    /// Fiscal period is closed to postings.
    #[error("Fiscal period {0} is closed")]
    FiscalPeriodClosed(Uuid),

    /// Third party not found or inactive.
    #[error("Third party not found: {0}")]
    ThirdPartyNotFound(Uuid),

    /// Journal entry not found.
    #[error("Journal entry not found: {0}")]
    JournalEntryNotFound(Uuid),

    /// Attempted an invalid status transition.
    #[error("Invalid status transition from {from} to {to}")]
    InvalidTransition {
        /// The current status.
        from: VoucherStatus,
        /// The attempted target status.
        to: VoucherStatus,
    },

    /// Header and lines can only change while the voucher is a draft.
    #[error("Voucher in status {0} cannot be modified")]
    NotEditable(VoucherStatus),

    /// Cancellation reason is required but not provided.
    #[error("Cancellation reason is required")]
    CancellationReasonRequired,

    /// Ledger validation failed.
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// Bank ledger failure on a path where it is not best-effort.
    #[error(transparent)]
    Bank(#[from] BankError),

    /// Numbering failed.
    #[error(transparent)]
    Sequence(#[from] SequenceError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(String),
}

impl VoucherError {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "VOUCHER_NOT_FOUND",
            Self::VoucherTypeNotFound(_) => "VOUCHER_TYPE_NOT_FOUND",
            Self::VoucherTypeInactive(_) => "VOUCHER_TYPE_INACTIVE",
            Self::FiscalPeriodNotFound(_) => "FISCAL_PERIOD_NOT_FOUND",
            Self::FiscalPeriodClosed(_) => "FISCAL_PERIOD_CLOSED",
            Self::ThirdPartyNotFound(_) => "THIRD_PARTY_NOT_FOUND",
            Self::JournalEntryNotFound(_) => "JOURNAL_ENTRY_NOT_FOUND",
            Self::InvalidTransition { .. } => "INVALID_TRANSITION",
            Self::NotEditable(_) => "VOUCHER_NOT_EDITABLE",
            Self::CancellationReasonRequired => "CANCELLATION_REASON_REQUIRED",
            Self::Ledger(e) => e.error_code(),
            Self::Bank(e) => e.error_code(),
            Self::Sequence(e) => e.error_code(),
            Self::Database(_) => "DATABASE_ERROR",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::VoucherTypeInactive(_)
            | Self::FiscalPeriodClosed(_)
            | Self::CancellationReasonRequired => 400,
            Self::NotFound(_)
            | Self::VoucherTypeNotFound(_)
            | Self::FiscalPeriodNotFound(_)
            | Self::ThirdPartyNotFound(_)
            | Self::JournalEntryNotFound(_) => 404,
            Self::InvalidTransition { .. } | Self::NotEditable(_) => 409,
            Self::Ledger(e) => e.status_code(),
            Self::Bank(e) => e.status_code(),
            Self::Sequence(e) => e.status_code(),
            Self::Database(_) => 500,
        }
    }
}

impl From<VoucherError> for AppError {
    fn from(err: VoucherError) -> Self {
        let message = err.to_string();
        match err {
            VoucherError::NotFound(_)
            | VoucherError::VoucherTypeNotFound(_)
            | VoucherError::FiscalPeriodNotFound(_)
            | VoucherError::ThirdPartyNotFound(_)
            | VoucherError::JournalEntryNotFound(_) => Self::NotFound(message),
            VoucherError::VoucherTypeInactive(_)
            | VoucherError::FiscalPeriodClosed(_)
            | VoucherError::CancellationReasonRequired => Self::Validation(message),
            VoucherError::InvalidTransition { .. } | VoucherError::NotEditable(_) => {
                Self::InvalidTransition(message)
            }
            VoucherError::Ledger(e) => e.into(),
            VoucherError::Bank(e) => e.into(),
            VoucherError::Sequence(e) => e.into(),
            VoucherError::Database(msg) => Self::Database(msg),
        }
    }
}
