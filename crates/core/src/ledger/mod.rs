//! Double-entry ledger rules.
//!
//! - Line and account validation run before any journal write
//! - Totals are compared decimal-exact
//! - Cancellation builds reversing lines instead of mutating postings

pub mod error;
pub mod reversal;
pub mod types;
pub mod validation;

#[cfg(test)]
mod validation_props;

pub use error::{LedgerError, MalformedReason};
pub use reversal::{reversal_description, reversing_lines};
pub use types::{AMOUNT_SCALE, AccountInfo, EntrySide, LedgerLine, LedgerTotals, MAX_AMOUNT};
pub use validation::{check_line, validate_accounts, validate_lines};
