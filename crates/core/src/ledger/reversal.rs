//! Reversing entries for cancelled postings.
//!
//! A posted journal entry is never modified. Cancelling it posts a new
//! entry with every debit and credit swapped.

use ledgersync_shared::types::JournalEntryId;

use super::types::LedgerLine;

/// Builds the lines of a reversing entry.
///
/// Line order, accounts and third parties are preserved. Descriptions are
/// prefixed with `Reversal: `.
#[must_use]
pub fn reversing_lines(original: &[LedgerLine]) -> Vec<LedgerLine> {
    original
        .iter()
        .map(|line| LedgerLine {
            line_number: line.line_number,
            account_id: line.account_id,
            third_party_id: line.third_party_id,
            debit: line.credit,
            credit: line.debit,
            description: Some(format!(
                "Reversal: {}",
                line.description.clone().unwrap_or_default()
            )),
        })
        .collect()
}

/// Description for the reversing entry header.
#[must_use]
pub fn reversal_description(original: JournalEntryId, entry_number: &str, reason: &str) -> String {
    format!("Reversal of {entry_number} ({original}). Reason: {reason}")
}
