//! Ledger domain types shared by vouchers and journal entries.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use ledgersync_shared::types::{AccountId, ThirdPartyId};
use uuid::Uuid;

use super::error::LedgerError;

/// Maximum number of fractional digits an amount may carry.
///
/// Matches the `NUMERIC(19, 4)` storage of every amount column, so the
/// balance comparison done here is the same one the database would see.
pub const AMOUNT_SCALE: u32 = 4;

/// Largest amount or balance a `NUMERIC(19, 4)` column holds:
/// `999_999_999_999_999.9999`.
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(0x89E7_FFFF, 0x8AC7_2304, 0, false, AMOUNT_SCALE);

/// Side of a ledger line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntrySide {
    /// Debit line.
    Debit,
    /// Credit line.
    Credit,
}

/// One line of a voucher or journal entry.
///
/// Exactly one of `debit` / `credit` must be positive; the other must be zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerLine {
    /// Position of the line, 1-based.
    pub line_number: u32,
    /// Chart of accounts node the line posts to.
    pub account_id: AccountId,
    /// Optional third party.
    pub third_party_id: Option<ThirdPartyId>,
    /// Debit amount (zero on credit lines).
    pub debit: Decimal,
    /// Credit amount (zero on debit lines).
    pub credit: Decimal,
    /// Optional line description.
    pub description: Option<String>,
}

impl LedgerLine {
    /// Creates a debit line.
    #[must_use]
    pub fn debit(line_number: u32, account_id: AccountId, amount: Decimal) -> Self {
        Self {
            line_number,
            account_id,
            third_party_id: None,
            debit: amount,
            credit: Decimal::ZERO,
            description: None,
        }
    }

    /// Creates a credit line.
    #[must_use]
    pub fn credit(line_number: u32, account_id: AccountId, amount: Decimal) -> Self {
        Self {
            line_number,
            account_id,
            third_party_id: None,
            debit: Decimal::ZERO,
            credit: amount,
            description: None,
        }
    }

    /// Returns the side and amount of a well-formed line.
    ///
    /// Returns `None` when both or neither side is set.
    #[must_use]
    pub fn side(&self) -> Option<(EntrySide, Decimal)> {
        match (self.debit.is_zero(), self.credit.is_zero()) {
            (false, true) => Some((EntrySide::Debit, self.debit)),
            (true, false) => Some((EntrySide::Credit, self.credit)),
            _ => None,
        }
    }
}

/// Debit and credit sums of a set of lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerTotals {
    /// Sum of all debit amounts.
    pub debit_total: Decimal,
    /// Sum of all credit amounts.
    pub credit_total: Decimal,
}

impl LedgerTotals {
    /// Sums the debit and credit columns of the given lines.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::TotalOutOfRange` if either sum leaves the
    /// storable range.
    pub fn from_lines(lines: &[LedgerLine]) -> Result<Self, LedgerError> {
        let mut totals = Self {
            debit_total: Decimal::ZERO,
            credit_total: Decimal::ZERO,
        };
        for line in lines {
            totals.debit_total = checked_total(totals.debit_total, line.debit)?;
            totals.credit_total = checked_total(totals.credit_total, line.credit)?;
        }
        Ok(totals)
    }

    /// Returns true if debits equal credits exactly.
    #[must_use]
    pub fn is_balanced(&self) -> bool {
        self.debit_total == self.credit_total
    }

    /// Returns debits minus credits.
    #[must_use]
    pub fn difference(&self) -> Decimal {
        self.debit_total - self.credit_total
    }
}

fn checked_total(sum: Decimal, amount: Decimal) -> Result<Decimal, LedgerError> {
    sum.checked_add(amount)
        .filter(|total| total.abs() <= MAX_AMOUNT)
        .ok_or(LedgerError::TotalOutOfRange)
}

/// Chart-of-accounts facts needed before posting to an account.
#[derive(Debug, Clone)]
pub struct AccountInfo {
    /// The account ID.
    pub id: Uuid,
    /// Whether the account is active.
    pub is_active: bool,
    /// Whether the account accepts postings (leaf node).
    pub allows_entries: bool,
}
