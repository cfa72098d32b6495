//! Property-based tests for bank balance arithmetic.
//!
//! - Applying then reversing any movement restores the starting balance.
//! - Final balance is independent of the order movements are applied in.
//! - Without overdraft, an accepted movement never leaves a negative balance.

use proptest::prelude::*;
use rust_decimal::Decimal;
use uuid::Uuid;

use super::balance::{apply_movement, reverse_movement};
use super::types::BankTransactionType;

fn amount() -> impl Strategy<Value = Decimal> {
    (1i64..10_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

fn balance() -> impl Strategy<Value = Decimal> {
    (0i64..10_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

fn tx_type() -> impl Strategy<Value = BankTransactionType> {
    prop_oneof![
        Just(BankTransactionType::Deposit),
        Just(BankTransactionType::Withdrawal),
        Just(BankTransactionType::Transfer),
        Just(BankTransactionType::Payment),
        Just(BankTransactionType::Receipt),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn prop_void_restores_balance(start in balance(), kind in tx_type(), amt in amount()) {
        let after = apply_movement(Uuid::nil(), start, kind, amt, true).unwrap();
        prop_assert_eq!(reverse_movement(Uuid::nil(), after, kind, amt).unwrap(), start);
    }

    #[test]
    fn prop_order_independent(
        start in balance(),
        a in (tx_type(), amount()),
        b in (tx_type(), amount()),
    ) {
        let id = Uuid::nil();
        let ab = apply_movement(id, start, a.0, a.1, true)
            .and_then(|x| apply_movement(id, x, b.0, b.1, true))
            .unwrap();
        let ba = apply_movement(id, start, b.0, b.1, true)
            .and_then(|x| apply_movement(id, x, a.0, a.1, true))
            .unwrap();
        prop_assert_eq!(ab, ba);
        prop_assert_eq!(ab, start + a.0.signed(a.1) + b.0.signed(b.1));
    }

    #[test]
    fn prop_no_overdraft_never_negative(start in balance(), kind in tx_type(), amt in amount()) {
        if let Ok(new_balance) = apply_movement(Uuid::nil(), start, kind, amt, false) {
            prop_assert!(new_balance >= Decimal::ZERO);
        } else {
            prop_assert!(!kind.is_inflow());
            prop_assert!(amt > start);
        }
    }
}
