//! Bank ledger error types.

use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

use ledgersync_shared::AppError;

use super::retry::RetryError;
use super::types::BankTransactionStatus;

/// Errors that can occur during bank ledger operations.
#[derive(Debug, Error)]
pub enum BankError {
    /// Bank account not found.
    #[error("Bank account not found: {0}")]
    BankAccountNotFound(Uuid),

    /// Bank transaction not found.
    #[error("Bank transaction not found: {0}")]
    TransactionNotFound(Uuid),

    /// Bank account is inactive.
    #[error("Bank account {0} is inactive")]
    AccountInactive(Uuid),

    /// The movement would leave the balance below zero.
    #[error("Insufficient funds in account {account_id}: balance {balance}, requested {requested}")]
    InsufficientFunds {
        /// The bank account.
        account_id: Uuid,
        /// Balance before the movement.
        balance: Decimal,
        /// Amount requested.
        requested: Decimal,
    },

    /// Amount must be strictly positive and fit the storage scale.
    #[error("Invalid amount: {0}")]
    InvalidAmount(Decimal),

    /// The resulting balance does not fit the storage range.
    #[error("Balance of account {0} would leave the storable range")]
    BalanceOutOfRange(Uuid),

    /// The transaction cannot move to the requested status.
    #[error("Invalid bank transaction status transition from {from} to {to}")]
    InvalidStatusTransition {
        /// Current status.
        from: BankTransactionStatus,
        /// Requested status.
        to: BankTransactionStatus,
    },

    /// The transaction is already voided.
    #[error("Bank transaction {0} is already voided")]
    AlreadyVoided(Uuid),

    /// Void reason is required but not provided.
    #[error("Void reason is required")]
    VoidReasonRequired,

    /// Account number or GL account already in use.
    #[error("Duplicate bank account: {0}")]
    Duplicate(String),

    /// Lock wait timeout, deadlock or serialization failure.
    #[error("Lock conflict: {0}")]
    LockConflict(String),

    /// Lock conflicts outlasted the retry budget.
    #[error("Concurrency retries exhausted after {attempts} attempts")]
    ConcurrencyExhausted {
        /// Attempts made.
        attempts: u32,
    },

    /// Database error.
    #[error("Database error: {0}")]
    Database(String),
}

impl BankError {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::BankAccountNotFound(_) => "BANK_ACCOUNT_NOT_FOUND",
            Self::TransactionNotFound(_) => "BANK_TRANSACTION_NOT_FOUND",
            Self::AccountInactive(_) => "ACCOUNT_INACTIVE",
            Self::InsufficientFunds { .. } => "INSUFFICIENT_FUNDS",
            Self::InvalidAmount(_) => "INVALID_AMOUNT",
            Self::BalanceOutOfRange(_) => "BALANCE_OUT_OF_RANGE",
            Self::InvalidStatusTransition { .. } => "INVALID_STATUS_TRANSITION",
            Self::AlreadyVoided(_) => "ALREADY_VOIDED",
            Self::VoidReasonRequired => "VOID_REASON_REQUIRED",
            Self::Duplicate(_) => "DUPLICATE_BANK_ACCOUNT",
            Self::LockConflict(_) => "LOCK_CONFLICT",
            Self::ConcurrencyExhausted { .. } => "CONCURRENCY_EXHAUSTED",
            Self::Database(_) => "DATABASE_ERROR",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::InvalidAmount(_) | Self::VoidReasonRequired => 400,
            Self::BankAccountNotFound(_) | Self::TransactionNotFound(_) => 404,
            Self::InvalidStatusTransition { .. }
            | Self::AlreadyVoided(_)
            | Self::Duplicate(_)
            | Self::LockConflict(_)
            | Self::ConcurrencyExhausted { .. } => 409,
            Self::AccountInactive(_)
            | Self::InsufficientFunds { .. }
            | Self::BalanceOutOfRange(_) => 422,
            Self::Database(_) => 500,
        }
    }

    /// Returns true if the operation may succeed when attempted again.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::LockConflict(_))
    }
}

impl From<RetryError<BankError>> for BankError {
    fn from(err: RetryError<BankError>) -> Self {
        match err {
            RetryError::Exhausted { attempts, .. } => Self::ConcurrencyExhausted { attempts },
            RetryError::Aborted(inner) => inner,
        }
    }
}

impl From<BankError> for AppError {
    fn from(err: BankError) -> Self {
        let message = err.to_string();
        match err {
            BankError::InvalidAmount(_) | BankError::VoidReasonRequired => Self::Validation(message),
            BankError::BankAccountNotFound(_) | BankError::TransactionNotFound(_) => {
                Self::NotFound(message)
            }
            BankError::InvalidStatusTransition { .. } | BankError::AlreadyVoided(_) => {
                Self::InvalidTransition(message)
            }
            BankError::Duplicate(_)
            | BankError::LockConflict(_)
            | BankError::ConcurrencyExhausted { .. } => Self::Conflict(message),
            BankError::AccountInactive(_) => Self::AccountInactive(message),
            BankError::InsufficientFunds { .. } => Self::InsufficientFunds(message),
            BankError::Database(msg) => Self::Database(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_retryable() {
        assert!(BankError::LockConflict("deadlock detected".into()).is_retryable());
        assert!(!BankError::ConcurrencyExhausted { attempts: 3 }.is_retryable());
        assert!(!BankError::AccountInactive(Uuid::nil()).is_retryable());
        assert!(!BankError::Database("boom".into()).is_retryable());
    }

    #[test]
    fn test_from_retry_error() {
        let exhausted = RetryError::Exhausted {
            attempts: 3,
            last: BankError::LockConflict("timeout".into()),
        };
        assert!(matches!(
            BankError::from(exhausted),
            BankError::ConcurrencyExhausted { attempts: 3 }
        ));

        let aborted = RetryError::Aborted(BankError::VoidReasonRequired);
        assert!(matches!(BankError::from(aborted), BankError::VoidReasonRequired));
    }

    #[test]
    fn test_into_app_error() {
        let err = BankError::InsufficientFunds {
            account_id: Uuid::nil(),
            balance: dec!(500),
            requested: dec!(800),
        };
        assert_eq!(err.status_code(), 422);
        let app: AppError = err.into();
        assert_eq!(app.error_code(), "INSUFFICIENT_FUNDS");

        let app: AppError = BankError::ConcurrencyExhausted { attempts: 3 }.into();
        assert_eq!(app.status_code(), 409);
    }

    #[test]
    fn test_display() {
        let err = BankError::InvalidStatusTransition {
            from: BankTransactionStatus::Cleared,
            to: BankTransactionStatus::Cleared,
        };
        assert_eq!(
            err.to_string(),
            "Invalid bank transaction status transition from cleared to cleared"
        );
    }
}
