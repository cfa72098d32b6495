//! Balance arithmetic and status rules for bank transactions.
//!
//! Callers hold the bank account row lock while these run.

use rust_decimal::Decimal;
use uuid::Uuid;

use super::error::BankError;
use super::types::{BankTransactionStatus, BankTransactionType};
use crate::ledger::{AMOUNT_SCALE, MAX_AMOUNT};

/// Checks that an amount is strictly positive and fits `NUMERIC(19, 4)`.
///
/// # Errors
///
/// Returns `BankError::InvalidAmount` otherwise.
pub fn validate_amount(amount: Decimal) -> Result<(), BankError> {
    if amount <= Decimal::ZERO || amount > MAX_AMOUNT || amount.normalize().scale() > AMOUNT_SCALE
    {
        return Err(BankError::InvalidAmount(amount));
    }
    Ok(())
}

/// Computes the balance after applying a movement.
///
/// # Errors
///
/// Returns `BankError::InsufficientFunds` if the result is negative and
/// overdraft is not allowed, `BankError::BalanceOutOfRange` if it cannot be
/// stored.
pub fn apply_movement(
    account_id: Uuid,
    balance: Decimal,
    transaction_type: BankTransactionType,
    amount: Decimal,
    allow_overdraft: bool,
) -> Result<Decimal, BankError> {
    let new_balance =
        checked_balance(account_id, balance.checked_add(transaction_type.signed(amount)))?;
    if new_balance < Decimal::ZERO && !allow_overdraft {
        return Err(BankError::InsufficientFunds {
            account_id,
            balance,
            requested: amount,
        });
    }
    Ok(new_balance)
}

/// Computes the balance after undoing a cleared movement.
///
/// Voids are never refused for lack of funds, so the result may be negative.
///
/// # Errors
///
/// Returns `BankError::BalanceOutOfRange` if the result cannot be stored.
pub fn reverse_movement(
    account_id: Uuid,
    balance: Decimal,
    transaction_type: BankTransactionType,
    amount: Decimal,
) -> Result<Decimal, BankError> {
    checked_balance(account_id, balance.checked_sub(transaction_type.signed(amount)))
}

fn checked_balance(account_id: Uuid, balance: Option<Decimal>) -> Result<Decimal, BankError> {
    balance
        .filter(|b| b.abs() <= MAX_AMOUNT)
        .ok_or(BankError::BalanceOutOfRange(account_id))
}

/// Checks that a transaction can be confirmed.
///
/// # Errors
///
/// Returns `BankError::InvalidStatusTransition` unless the status is pending.
pub fn ensure_confirmable(status: BankTransactionStatus) -> Result<(), BankError> {
    match status {
        BankTransactionStatus::Pending => Ok(()),
        other => Err(BankError::InvalidStatusTransition {
            from: other,
            to: BankTransactionStatus::Cleared,
        }),
    }
}

/// Checks that a transaction can be voided.
///
/// Returns true when the balance effect must be reversed (it was cleared).
///
/// # Errors
///
/// Returns `VoidReasonRequired` for a blank reason or `AlreadyVoided`.
pub fn ensure_voidable(
    transaction_id: Uuid,
    status: BankTransactionStatus,
    reason: &str,
) -> Result<bool, BankError> {
    if reason.trim().is_empty() {
        return Err(BankError::VoidReasonRequired);
    }
    match status {
        BankTransactionStatus::Pending => Ok(false),
        BankTransactionStatus::Cleared => Ok(true),
        BankTransactionStatus::Voided => Err(BankError::AlreadyVoided(transaction_id)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_validate_amount() {
        assert!(validate_amount(dec!(0.01)).is_ok());
        assert!(matches!(validate_amount(Decimal::ZERO), Err(BankError::InvalidAmount(_))));
        assert!(matches!(validate_amount(dec!(-1)), Err(BankError::InvalidAmount(_))));
        assert!(matches!(validate_amount(dec!(1.00001)), Err(BankError::InvalidAmount(_))));
    }

    #[test]
    fn test_deposit_adds() {
        let id = Uuid::nil();
        let balance =
            apply_movement(id, dec!(500), BankTransactionType::Deposit, dec!(1000), false).unwrap();
        assert_eq!(balance, dec!(1500));
    }

    #[test]
    fn test_withdrawal_insufficient() {
        let id = Uuid::nil();
        let result = apply_movement(id, dec!(500), BankTransactionType::Withdrawal, dec!(800), false);
        assert!(matches!(
            result,
            Err(BankError::InsufficientFunds { balance, requested, .. })
                if balance == dec!(500) && requested == dec!(800)
        ));
    }

    #[test]
    fn test_withdrawal_overdraft_allowed() {
        let id = Uuid::nil();
        let balance =
            apply_movement(id, dec!(500), BankTransactionType::Payment, dec!(800), true).unwrap();
        assert_eq!(balance, dec!(-300));
    }

    #[test]
    fn test_withdrawal_to_exactly_zero() {
        let id = Uuid::nil();
        let balance =
            apply_movement(id, dec!(500), BankTransactionType::Transfer, dec!(500), false).unwrap();
        assert_eq!(balance, Decimal::ZERO);
    }

    #[test]
    fn test_reverse() {
        let id = Uuid::nil();
        assert_eq!(
            reverse_movement(id, dec!(1500), BankTransactionType::Deposit, dec!(1000)).unwrap(),
            dec!(500)
        );
        assert_eq!(
            reverse_movement(id, dec!(200), BankTransactionType::Withdrawal, dec!(300)).unwrap(),
            dec!(500)
        );
        // reversing a deposit that was already spent goes negative
        assert_eq!(
            reverse_movement(id, dec!(100), BankTransactionType::Receipt, dec!(300)).unwrap(),
            dec!(-200)
        );
    }

    #[test]
    fn test_amount_beyond_storage_rejected() {
        assert!(validate_amount(MAX_AMOUNT).is_ok());
        assert!(matches!(
            validate_amount(MAX_AMOUNT + dec!(0.0001)),
            Err(BankError::InvalidAmount(_))
        ));
        assert!(matches!(validate_amount(Decimal::MAX), Err(BankError::InvalidAmount(_))));
    }

    #[test]
    fn test_balance_out_of_range() {
        let id = Uuid::from_u128(7);
        let result = apply_movement(id, MAX_AMOUNT, BankTransactionType::Deposit, dec!(1), false);
        assert!(matches!(result, Err(BankError::BalanceOutOfRange(a)) if a == id));

        // would overflow Decimal itself without the checked arithmetic
        let result = apply_movement(id, Decimal::MAX, BankTransactionType::Receipt, Decimal::MAX, true);
        assert!(matches!(result, Err(BankError::BalanceOutOfRange(_))));

        let result =
            reverse_movement(id, -MAX_AMOUNT, BankTransactionType::Deposit, dec!(1));
        assert!(matches!(result, Err(BankError::BalanceOutOfRange(_))));
    }

    #[test]
    fn test_confirm_rules() {
        assert!(ensure_confirmable(BankTransactionStatus::Pending).is_ok());
        assert!(matches!(
            ensure_confirmable(BankTransactionStatus::Cleared),
            Err(BankError::InvalidStatusTransition { .. })
        ));
        assert!(matches!(
            ensure_confirmable(BankTransactionStatus::Voided),
            Err(BankError::InvalidStatusTransition { .. })
        ));
    }

    #[test]
    fn test_void_rules() {
        let id = Uuid::nil();
        assert!(!ensure_voidable(id, BankTransactionStatus::Pending, "dup").unwrap());
        assert!(ensure_voidable(id, BankTransactionStatus::Cleared, "dup").unwrap());
        assert!(matches!(
            ensure_voidable(id, BankTransactionStatus::Voided, "dup"),
            Err(BankError::AlreadyVoided(_))
        ));
        assert!(matches!(
            ensure_voidable(id, BankTransactionStatus::Cleared, "  "),
            Err(BankError::VoidReasonRequired)
        ));
    }
}
