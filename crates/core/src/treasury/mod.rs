//! Treasury: bank accounts, bank transactions and journal sync.
//!
//! - Balance arithmetic applied under the account row lock
//! - Transaction status rules (pending, cleared, voided)
//! - Journal line classification into bank movements
//! - Sync discrepancy reporting
//! - Bounded retry for lock-contended writes

pub mod balance;
pub mod error;
pub mod retry;
pub mod sync;
pub mod types;

#[cfg(test)]
mod balance_props;

pub use balance::{
    apply_movement, ensure_confirmable, ensure_voidable, reverse_movement, validate_amount,
};
pub use error::BankError;
pub use retry::{RetryError, RetryPolicy, with_retry};
pub use sync::{SyncPlan, build_sync_report, plan_bank_movements};
pub use types::{
    BankMovement, BankTransactionStatus, BankTransactionType, EntryMetadata, SkippedLine,
    SyncDiscrepancy, SyncOutcome, SyncReport, SyncedTransaction,
};
