//! Voucher line preparation.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use ledgersync_shared::types::{AccountId, ThirdPartyId};

use crate::ledger::{LedgerError, LedgerLine, LedgerTotals, check_line};

/// Caller-supplied voucher line. Position comes from its index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoucherLineInput {
    /// Account to post to.
    pub account_id: AccountId,
    /// Optional third party; inherited from the header when absent.
    pub third_party_id: Option<ThirdPartyId>,
    /// Debit amount.
    #[serde(default)]
    pub debit: Decimal,
    /// Credit amount.
    #[serde(default)]
    pub credit: Decimal,
    /// Optional description.
    pub description: Option<String>,
}

/// Numbers lines 1..=n, fills in the header third party, and rejects
/// malformed lines.
///
/// Balance is not required here; drafts may be saved unbalanced.
///
/// # Errors
///
/// Returns `LedgerError::MalformedLine` for the first invalid line.
pub fn prepare_lines(
    inputs: &[VoucherLineInput],
    header_third_party: Option<ThirdPartyId>,
) -> Result<(Vec<LedgerLine>, LedgerTotals), LedgerError> {
    let lines: Vec<LedgerLine> = inputs
        .iter()
        .zip(1u32..)
        .map(|(input, line_number)| LedgerLine {
            line_number,
            account_id: input.account_id,
            third_party_id: input.third_party_id.or(header_third_party),
            debit: input.debit,
            credit: input.credit,
            description: input.description.clone(),
        })
        .collect();

    for line in &lines {
        check_line(line)?;
    }

    let totals = LedgerTotals::from_lines(&lines)?;
    Ok((lines, totals))
}
