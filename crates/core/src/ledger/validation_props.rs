//! Property-based tests for ledger balance validation.
//!
//! - Balanced line sets always validate and report matching totals.
//! - Any non-zero perturbation of one side is reported as an imbalance.
//! - Malformed lines are rejected regardless of balance.
//! - Reversing a balanced set yields a balanced set with swapped totals.

use proptest::prelude::*;
use rust_decimal::Decimal;
use ledgersync_shared::types::AccountId;

use super::error::{LedgerError, MalformedReason};
use super::reversal::reversing_lines;
use super::types::{LedgerLine, LedgerTotals};
use super::validation::validate_lines;

/// Amounts from 0.01 to 1,000,000.00.
fn positive_amount() -> impl Strategy<Value = Decimal> {
    (1i64..100_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Builds a balanced set: one debit per amount, offset by a single credit.
fn balanced(amounts: &[Decimal]) -> Vec<LedgerLine> {
    let mut lines: Vec<LedgerLine> = amounts
        .iter()
        .zip(1u32..)
        .map(|(amount, n)| LedgerLine::debit(n, AccountId::new(), *amount))
        .collect();
    let total: Decimal = amounts.iter().copied().sum();
    let next = u32::try_from(lines.len()).unwrap_or(u32::MAX - 1) + 1;
    lines.push(LedgerLine::credit(next, AccountId::new(), total));
    lines
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn prop_balanced_sets_validate(amounts in prop::collection::vec(positive_amount(), 1..10)) {
        let lines = balanced(&amounts);
        let totals = validate_lines(&lines).unwrap();
        prop_assert_eq!(totals.debit_total, totals.credit_total);
        prop_assert_eq!(totals.debit_total, amounts.iter().copied().sum::<Decimal>());
    }

    #[test]
    fn prop_perturbed_sets_rejected(
        amounts in prop::collection::vec(positive_amount(), 1..10),
        delta in positive_amount(),
    ) {
        let mut lines = balanced(&amounts);
        lines[0].debit += delta;
        let expected = LedgerTotals::from_lines(&lines).unwrap();
        let result = validate_lines(&lines);
        prop_assert_eq!(
            result,
            Err(LedgerError::Imbalance {
                debit_total: expected.debit_total,
                credit_total: expected.credit_total,
            })
        );
    }

    #[test]
    fn prop_two_sided_line_rejected(
        amounts in prop::collection::vec(positive_amount(), 1..10),
        extra in positive_amount(),
    ) {
        let mut lines = balanced(&amounts);
        let last = lines.len() - 1;
        lines[last].debit = extra;
        let result = validate_lines(&lines);
        let is_both_sides = matches!(
            result,
            Err(LedgerError::MalformedLine { reason: MalformedReason::BothSides, .. })
        );
        prop_assert!(is_both_sides);
    }

    #[test]
    fn prop_reversal_swaps_totals(amounts in prop::collection::vec(positive_amount(), 1..10)) {
        let lines = balanced(&amounts);
        let original = LedgerTotals::from_lines(&lines).unwrap();
        let reversed = reversing_lines(&lines);
        let totals = validate_lines(&reversed).unwrap();
        prop_assert_eq!(totals.debit_total, original.credit_total);
        prop_assert_eq!(totals.credit_total, original.debit_total);
    }
}
