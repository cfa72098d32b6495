//! Property-based tests for the voucher state machine.
//!
//! The transition functions must agree with `is_valid_transition` for every
//! status, and cancelled vouchers must reject every action.

use proptest::prelude::*;
use uuid::Uuid;

use ledgersync_shared::types::ActorId;

use super::error::VoucherError;
use super::service::VoucherStateMachine;
use super::types::VoucherStatus;

fn arb_status() -> impl Strategy<Value = VoucherStatus> {
    prop_oneof![
        Just(VoucherStatus::Draft),
        Just(VoucherStatus::Validated),
        Just(VoucherStatus::Approved),
        Just(VoucherStatus::Cancelled),
    ]
}

fn arb_actor() -> impl Strategy<Value = ActorId> {
    any::<u128>().prop_map(|v| ActorId::from_uuid(Uuid::from_u128(v)))
}

fn arb_reason() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9]{1,40}"
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn prop_validate_matches_table(status in arb_status(), actor in arb_actor()) {
        let result = VoucherStateMachine::validate(status, actor);
        prop_assert_eq!(
            result.is_ok(),
            VoucherStateMachine::is_valid_transition(status, VoucherStatus::Validated)
        );
    }

    #[test]
    fn prop_approve_matches_table(status in arb_status(), actor in arb_actor()) {
        let result = VoucherStateMachine::approve(status, actor);
        prop_assert_eq!(
            result.is_ok(),
            VoucherStateMachine::is_valid_transition(status, VoucherStatus::Approved)
        );
        if let Ok(action) = result {
            prop_assert_eq!(action.actor_id(), actor);
            prop_assert_eq!(action.previous_status(), VoucherStatus::Validated);
        }
    }

    #[test]
    fn prop_cancel_matches_table(
        status in arb_status(),
        actor in arb_actor(),
        reason in arb_reason(),
    ) {
        let result = VoucherStateMachine::cancel(status, actor, &reason);
        prop_assert_eq!(
            result.is_ok(),
            VoucherStateMachine::is_valid_transition(status, VoucherStatus::Cancelled)
        );
        if let Ok(action) = result {
            prop_assert_eq!(action.comment(), Some(reason.as_str()));
        }
    }

    #[test]
    fn prop_blank_reason_always_rejected(
        status in arb_status(),
        actor in arb_actor(),
        blanks in "[ \t]{0,10}",
    ) {
        let result = VoucherStateMachine::cancel(status, actor, &blanks);
        prop_assert!(matches!(result, Err(VoucherError::CancellationReasonRequired)));
    }

    #[test]
    fn prop_only_draft_is_editable(status in arb_status()) {
        prop_assert_eq!(
            VoucherStateMachine::ensure_editable(status).is_ok(),
            status == VoucherStatus::Draft
        );
    }
}
