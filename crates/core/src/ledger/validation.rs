//! Ledger balance validation.
//!
//! Runs before any journal or voucher write. Comparisons are decimal-exact.

use rust_decimal::Decimal;
use uuid::Uuid;

use super::error::{LedgerError, MalformedReason};
use super::types::{AMOUNT_SCALE, AccountInfo, LedgerLine, LedgerTotals, MAX_AMOUNT};

/// Checks a single line for the debit XOR credit rule.
///
/// # Errors
///
/// Returns `LedgerError::MalformedLine` when the line is rejected.
pub fn check_line(line: &LedgerLine) -> Result<(), LedgerError> {
    let malformed = |reason| LedgerError::MalformedLine {
        line_number: line.line_number,
        reason,
    };

    if line.debit < Decimal::ZERO || line.credit < Decimal::ZERO {
        return Err(malformed(MalformedReason::NegativeAmount));
    }

    match (line.debit.is_zero(), line.credit.is_zero()) {
        (true, true) => return Err(malformed(MalformedReason::NoAmount)),
        (false, false) => return Err(malformed(MalformedReason::BothSides)),
        _ => {}
    }

    if line.debit > MAX_AMOUNT || line.credit > MAX_AMOUNT {
        return Err(malformed(MalformedReason::AmountTooLarge));
    }

    if exceeds_scale(line.debit) || exceeds_scale(line.credit) {
        return Err(malformed(MalformedReason::ExcessPrecision));
    }

    Ok(())
}

fn exceeds_scale(amount: Decimal) -> bool {
    amount.normalize().scale() > AMOUNT_SCALE
}

/// Validates that a set of lines is well-formed and balanced.
///
/// Returns the computed totals on success.
///
/// # Errors
///
/// Returns `NoLines`, `MalformedLine` for the first bad line, or
/// `Imbalance` with both totals.
pub fn validate_lines(lines: &[LedgerLine]) -> Result<LedgerTotals, LedgerError> {
    if lines.is_empty() {
        return Err(LedgerError::NoLines);
    }

    for line in lines {
        check_line(line)?;
    }

    let totals = LedgerTotals::from_lines(lines)?;
    if !totals.is_balanced() {
        return Err(LedgerError::Imbalance {
            debit_total: totals.debit_total,
            credit_total: totals.credit_total,
        });
    }

    Ok(totals)
}

/// Checks every referenced account against the chart of accounts.
///
/// `lookup` returns `None` for unknown accounts.
///
/// # Errors
///
/// Returns the first account failure found, in line order.
pub fn validate_accounts<F>(lines: &[LedgerLine], lookup: F) -> Result<(), LedgerError>
where
    F: Fn(Uuid) -> Option<AccountInfo>,
{
    for line in lines {
        let id = line.account_id.into_inner();
        let info = lookup(id).ok_or(LedgerError::AccountNotFound(id))?;
        if !info.is_active {
            return Err(LedgerError::AccountInactive(id));
        }
        if !info.allows_entries {
            return Err(LedgerError::AccountDoesNotAllowEntries(id));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ledgersync_shared::types::AccountId;
    use rust_decimal_macros::dec;

    #[test]
    fn test_balanced_lines() {
        let (bank, expense) = (AccountId::new(), AccountId::new());
        let lines = vec![
            LedgerLine::debit(1, bank, dec!(1000)),
            LedgerLine::credit(2, expense, dec!(1000)),
        ];
        let totals = validate_lines(&lines).unwrap();
        assert_eq!(totals.debit_total, dec!(1000));
        assert_eq!(totals.credit_total, dec!(1000));
    }

    #[test]
    fn test_unbalanced_lines() {
        let account = AccountId::new();
        let lines = vec![
            LedgerLine::debit(1, account, dec!(100.00)),
            LedgerLine::credit(2, account, dec!(99.99)),
        ];
        assert_eq!(
            validate_lines(&lines),
            Err(LedgerError::Imbalance {
                debit_total: dec!(100.00),
                credit_total: dec!(99.99),
            })
        );
    }

    #[test]
    fn test_scale_difference_is_not_imbalance() {
        let account = AccountId::new();
        let lines = vec![
            LedgerLine::debit(1, account, dec!(10.5)),
            LedgerLine::credit(2, account, dec!(10.5000)),
        ];
        assert!(validate_lines(&lines).is_ok());
    }

    #[test]
    fn test_no_lines() {
        assert_eq!(validate_lines(&[]), Err(LedgerError::NoLines));
    }

    #[test]
    fn test_both_sides_rejected() {
        let account = AccountId::new();
        let mut line = LedgerLine::debit(1, account, dec!(10));
        line.credit = dec!(10);
        assert_eq!(
            validate_lines(&[line]),
            Err(LedgerError::MalformedLine {
                line_number: 1,
                reason: MalformedReason::BothSides,
            })
        );
    }

    #[test]
    fn test_empty_line_rejected() {
        let account = AccountId::new();
        let lines = vec![
            LedgerLine::debit(1, account, dec!(10)),
            LedgerLine::credit(2, account, dec!(10)),
            LedgerLine::debit(3, account, Decimal::ZERO),
        ];
        assert_eq!(
            validate_lines(&lines),
            Err(LedgerError::MalformedLine {
                line_number: 3,
                reason: MalformedReason::NoAmount,
            })
        );
    }

    #[test]
    fn test_negative_rejected() {
        let account = AccountId::new();
        let line = LedgerLine::debit(1, account, dec!(-5));
        assert!(matches!(
            check_line(&line),
            Err(LedgerError::MalformedLine {
                reason: MalformedReason::NegativeAmount,
                ..
            })
        ));
    }

    #[test]
    fn test_amount_beyond_storage_rejected() {
        let account = AccountId::new();
        let line = LedgerLine::credit(4, account, MAX_AMOUNT + dec!(0.0001));
        assert_eq!(
            check_line(&line),
            Err(LedgerError::MalformedLine {
                line_number: 4,
                reason: MalformedReason::AmountTooLarge,
            })
        );
        assert!(check_line(&LedgerLine::credit(4, account, MAX_AMOUNT)).is_ok());
    }

    #[test]
    fn test_excess_precision_rejected() {
        let account = AccountId::new();
        let line = LedgerLine::debit(1, account, dec!(1.00001));
        assert!(matches!(
            check_line(&line),
            Err(LedgerError::MalformedLine {
                reason: MalformedReason::ExcessPrecision,
                ..
            })
        ));
        // trailing zeros beyond the scale are fine
        assert!(check_line(&LedgerLine::debit(1, account, dec!(1.000000))).is_ok());
    }

    #[test]
    fn test_account_checks() {
        let (active, inactive, header) = (AccountId::new(), AccountId::new(), AccountId::new());
        let lookup = |id: Uuid| {
            if id == active.into_inner() {
                Some(AccountInfo { id, is_active: true, allows_entries: true })
            } else if id == inactive.into_inner() {
                Some(AccountInfo { id, is_active: false, allows_entries: true })
            } else if id == header.into_inner() {
                Some(AccountInfo { id, is_active: true, allows_entries: false })
            } else {
                None
            }
        };

        let ok = vec![LedgerLine::debit(1, active, dec!(1))];
        assert!(validate_accounts(&ok, lookup).is_ok());

        let bad = vec![LedgerLine::debit(1, inactive, dec!(1))];
        assert_eq!(
            validate_accounts(&bad, lookup),
            Err(LedgerError::AccountInactive(inactive.into_inner()))
        );

        let bad = vec![LedgerLine::debit(1, header, dec!(1))];
        assert_eq!(
            validate_accounts(&bad, lookup),
            Err(LedgerError::AccountDoesNotAllowEntries(header.into_inner()))
        );

        let missing = AccountId::new();
        let bad = vec![LedgerLine::debit(1, missing, dec!(1))];
        assert_eq!(
            validate_accounts(&bad, lookup),
            Err(LedgerError::AccountNotFound(missing.into_inner()))
        );
    }
}
