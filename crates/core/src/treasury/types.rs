//! Bank ledger domain types.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Kind of bank movement. The sign is implied by the kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BankTransactionType {
    /// Money in.
    Deposit,
    /// Money out.
    Withdrawal,
    /// Money out to another account.
    Transfer,
    /// Money out to a third party.
    Payment,
    /// Money in from a third party.
    Receipt,
}

impl BankTransactionType {
    /// Returns the string representation of the type.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Deposit => "deposit",
            Self::Withdrawal => "withdrawal",
            Self::Transfer => "transfer",
            Self::Payment => "payment",
            Self::Receipt => "receipt",
        }
    }

    /// Parses a type from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "deposit" => Some(Self::Deposit),
            "withdrawal" => Some(Self::Withdrawal),
            "transfer" => Some(Self::Transfer),
            "payment" => Some(Self::Payment),
            "receipt" => Some(Self::Receipt),
            _ => None,
        }
    }

    /// True for kinds that increase the balance.
    #[must_use]
    pub const fn is_inflow(&self) -> bool {
        matches!(self, Self::Deposit | Self::Receipt)
    }

    /// Signed balance effect of a positive amount.
    #[must_use]
    pub fn signed(&self, amount: Decimal) -> Decimal {
        if self.is_inflow() { amount } else { -amount }
    }
}

impl fmt::Display for BankTransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Bank transaction status.
///
/// - Pending → Cleared (confirm, applies the balance)
/// - Pending → Voided (void, no balance effect)
/// - Cleared → Voided (void, reverses the balance)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BankTransactionStatus {
    /// Recorded, not yet reflected in the balance.
    Pending,
    /// Reflected in the balance.
    Cleared,
    /// Cancelled; balance effect reversed if it was cleared.
    Voided,
}

impl BankTransactionStatus {
    /// Returns the string representation of the status.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Cleared => "cleared",
            Self::Voided => "voided",
        }
    }

    /// Parses a status from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "pending" => Some(Self::Pending),
            "cleared" => Some(Self::Cleared),
            "voided" => Some(Self::Voided),
            _ => None,
        }
    }
}

impl fmt::Display for BankTransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A bank movement derived from one journal line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BankMovement {
    /// Journal line the movement comes from.
    pub order_number: u32,
    /// Bank account whose GL account the line posts to.
    pub bank_account_id: Uuid,
    /// Deposit for debits, withdrawal for credits.
    pub transaction_type: BankTransactionType,
    /// Positive amount.
    pub amount: Decimal,
    /// Line description, if any.
    pub description: Option<String>,
}

/// Metadata copied from the journal entry onto derived transactions.
#[derive(Debug, Clone)]
pub struct EntryMetadata {
    /// Journal entry number, used as the transaction reference.
    pub entry_number: String,
    /// Entry date.
    pub entry_date: NaiveDate,
    /// Entry description.
    pub description: Option<String>,
}

/// A journal line that was not synced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedLine {
    /// Journal line number.
    pub order_number: u32,
    /// Why it was skipped.
    pub reason: String,
}

/// Result of a bank sync attempt for one journal entry.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SyncOutcome {
    /// Bank transactions created, in line order.
    pub created: Vec<Uuid>,
    /// Lines that were skipped or failed.
    pub failures: Vec<SkippedLine>,
}

/// Minimal view of an existing bank transaction for sync checks.
#[derive(Debug, Clone)]
pub struct SyncedTransaction {
    /// Transaction ID.
    pub id: Uuid,
    /// Account it belongs to.
    pub bank_account_id: Uuid,
    /// Movement kind.
    pub transaction_type: BankTransactionType,
    /// Positive amount.
    pub amount: Decimal,
    /// Current status.
    pub status: BankTransactionStatus,
}

/// A difference between journal lines and bank transactions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SyncDiscrepancy {
    /// Number of live transactions differs from bank-linked lines.
    CountMismatch {
        /// Bank-linked lines.
        expected: usize,
        /// Live transactions found.
        actual: usize,
    },
    /// A bank-linked line has no matching transaction.
    MissingTransaction {
        /// Journal line number.
        order_number: u32,
        /// Account that should have the transaction.
        bank_account_id: Uuid,
        /// Expected movement kind.
        transaction_type: BankTransactionType,
        /// Expected amount.
        amount: Decimal,
    },
    /// A transaction references the entry but matches no line.
    UnexpectedTransaction {
        /// The transaction.
        bank_transaction_id: Uuid,
        /// Its account.
        bank_account_id: Uuid,
    },
}

/// Read-only comparison of a journal entry against its bank transactions.
#[derive(Debug, Clone, Serialize)]
pub struct SyncReport {
    /// The journal entry checked.
    pub journal_entry_id: Uuid,
    /// Bank-linked lines found on the entry.
    pub expected_count: usize,
    /// Non-voided transactions referencing the entry.
    pub actual_count: usize,
    /// Voided transactions referencing the entry.
    pub voided_count: usize,
    /// True when there are no discrepancies.
    pub is_synced: bool,
    /// Differences found.
    pub discrepancies: Vec<SyncDiscrepancy>,
}
