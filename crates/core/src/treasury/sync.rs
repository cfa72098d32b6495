//! Bank sync planning and discrepancy reporting.
//!
//! Journal lines posting to a GL account linked to an active bank account
//! become bank movements: a debit is money in (deposit), a credit is money
//! out (withdrawal).

use rust_decimal::Decimal;
use std::collections::HashMap;
use uuid::Uuid;

use super::types::{
    BankMovement, BankTransactionStatus, BankTransactionType, SkippedLine, SyncDiscrepancy,
    SyncReport, SyncedTransaction,
};
use crate::ledger::{EntrySide, LedgerLine};

/// Movements to create and lines skipped as malformed.
#[derive(Debug, Default)]
pub struct SyncPlan {
    /// Movements in line order.
    pub movements: Vec<BankMovement>,
    /// Bank-linked lines that could not be classified.
    pub skipped: Vec<SkippedLine>,
}

/// Classifies journal lines against the GL to bank account links.
///
/// `links` maps a GL account ID to the active bank account bound to it.
/// Lines on unlinked accounts are ignored.
#[must_use]
pub fn plan_bank_movements(lines: &[LedgerLine], links: &HashMap<Uuid, Uuid>) -> SyncPlan {
    let mut plan = SyncPlan::default();

    for line in lines {
        let Some(&bank_account_id) = links.get(&line.account_id.into_inner()) else {
            continue;
        };

        match line.side() {
            Some((side, amount)) if amount > Decimal::ZERO => {
                let transaction_type = match side {
                    EntrySide::Debit => BankTransactionType::Deposit,
                    EntrySide::Credit => BankTransactionType::Withdrawal,
                };
                plan.movements.push(BankMovement {
                    order_number: line.line_number,
                    bank_account_id,
                    transaction_type,
                    amount,
                    description: line.description.clone(),
                });
            }
            _ => plan.skipped.push(SkippedLine {
                order_number: line.line_number,
                reason: "line must carry exactly one positive debit or credit".to_string(),
            }),
        }
    }

    plan
}

/// Compares expected movements with the transactions found for an entry.
///
/// Voided transactions are counted separately and never match a line.
/// Matching is by account, type and amount; each transaction matches at
/// most one line.
#[must_use]
pub fn build_sync_report(
    journal_entry_id: Uuid,
    expected: &[BankMovement],
    actual: &[SyncedTransaction],
) -> SyncReport {
    let live: Vec<&SyncedTransaction> = actual
        .iter()
        .filter(|t| t.status != BankTransactionStatus::Voided)
        .collect();
    let voided_count = actual.len() - live.len();

    let mut discrepancies = Vec::new();
    if expected.len() != live.len() {
        discrepancies.push(SyncDiscrepancy::CountMismatch {
            expected: expected.len(),
            actual: live.len(),
        });
    }

    let mut unmatched: Vec<&SyncedTransaction> = live.clone();
    for movement in expected {
        let found = unmatched.iter().position(|t| {
            t.bank_account_id == movement.bank_account_id
                && t.transaction_type == movement.transaction_type
                && t.amount == movement.amount
        });
        match found {
            Some(index) => {
                unmatched.swap_remove(index);
            }
            None => discrepancies.push(SyncDiscrepancy::MissingTransaction {
                order_number: movement.order_number,
                bank_account_id: movement.bank_account_id,
                transaction_type: movement.transaction_type,
                amount: movement.amount,
            }),
        }
    }

    discrepancies.extend(unmatched.into_iter().map(|t| {
        SyncDiscrepancy::UnexpectedTransaction {
            bank_transaction_id: t.id,
            bank_account_id: t.bank_account_id,
        }
    }));

    SyncReport {
        journal_entry_id,
        expected_count: expected.len(),
        actual_count: live.len(),
        voided_count,
        is_synced: discrepancies.is_empty(),
        discrepancies,
    }
}
