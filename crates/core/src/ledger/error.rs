//! Ledger error types.
//!
//! Every variant here is a validation failure raised before any write, so
//! the enclosing transaction is rolled back with nothing persisted.

use rust_decimal::Decimal;
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

use ledgersync_shared::AppError;

/// Why a single line was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MalformedReason {
    /// Both debit and credit are non-zero.
    BothSides,
    /// Neither debit nor credit is set.
    NoAmount,
    /// A negative amount was supplied.
    NegativeAmount,
    /// More fractional digits than the storage scale.
    ExcessPrecision,
    /// Larger than the storage range.
    AmountTooLarge,
}

impl fmt::Display for MalformedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::BothSides => "debit and credit are both set",
            Self::NoAmount => "neither debit nor credit is set",
            Self::NegativeAmount => "amounts must be positive",
            Self::ExcessPrecision => "amount has more than 4 decimal places",
            Self::AmountTooLarge => "amount exceeds 999999999999999.9999",
        };
        f.write_str(text)
    }
}

/// Errors that can occur while validating ledger lines.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LedgerError {
    /// No lines were supplied.
    #[error("Entry must have at least one line")]
    NoLines,

    /// A line violates the debit XOR credit rule.
    #[error("Line {line_number} is malformed: {reason}")]
    MalformedLine {
        /// Offending line number.
        line_number: u32,
        /// What is wrong with it.
        reason: MalformedReason,
    },

    /// Debits and credits do not match.
    #[error("Entry is not balanced. Debit: {debit_total}, Credit: {credit_total}")]
    Imbalance {
        /// Sum of debit amounts.
        debit_total: Decimal,
        /// Sum of credit amounts.
        credit_total: Decimal,
    },

    /// A debit or credit total does not fit the storage range.
    #[error("Entry totals exceed the storable range")]
    TotalOutOfRange,

    /// Account not found in the chart of accounts.
    #[error("Account not found: {0}")]
    AccountNotFound(Uuid),

    /// Account is inactive.
    #[error("Account {0} is inactive")]
    AccountInactive(Uuid),

    /// Account is a grouping node and does not accept postings.
    #[error("Account {0} does not allow entries")]
    AccountDoesNotAllowEntries(Uuid),
}

impl LedgerError {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::NoLines => "NO_LINES",
            Self::MalformedLine { .. } => "MALFORMED_LINE",
            Self::Imbalance { .. } => "IMBALANCE",
            Self::TotalOutOfRange => "TOTAL_OUT_OF_RANGE",
            Self::AccountNotFound(_) => "ACCOUNT_NOT_FOUND",
            Self::AccountInactive(_) => "ACCOUNT_INACTIVE",
            Self::AccountDoesNotAllowEntries(_) => "ACCOUNT_DOES_NOT_ALLOW_ENTRIES",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::AccountNotFound(_) => 404,
            _ => 400,
        }
    }
}

impl From<LedgerError> for AppError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::AccountNotFound(_) => Self::NotFound(err.to_string()),
            _ => Self::Validation(err.to_string()),
        }
    }
}
