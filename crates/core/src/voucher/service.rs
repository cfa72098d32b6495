//! Voucher state machine.
//!
//! Pure transition rules. The repository layer holds the voucher row lock
//! while calling these, so a status read here cannot go stale.

use chrono::Utc;

use ledgersync_shared::types::ActorId;

use super::error::VoucherError;
use super::types::{VoucherAction, VoucherStatus};

/// Stateless service for voucher status transitions.
pub struct VoucherStateMachine;

impl VoucherStateMachine {
    /// Validate a draft voucher.
    ///
    /// # Errors
    ///
    /// Returns `VoucherError::InvalidTransition` if not in Draft status.
    pub fn validate(
        current_status: VoucherStatus,
        actor_id: ActorId,
    ) -> Result<VoucherAction, VoucherError> {
        match current_status {
            VoucherStatus::Draft => Ok(VoucherAction::Validate {
                previous_status: current_status,
                actor_id,
                at: Utc::now(),
            }),
            _ => Err(VoucherError::InvalidTransition {
                from: current_status,
                to: VoucherStatus::Validated,
            }),
        }
    }

    /// Approve a validated voucher.
    ///
    /// # Errors
    ///
    /// Returns `VoucherError::InvalidTransition` if not in Validated status.
    pub fn approve(
        current_status: VoucherStatus,
        actor_id: ActorId,
    ) -> Result<VoucherAction, VoucherError> {
        match current_status {
            VoucherStatus::Validated => Ok(VoucherAction::Approve {
                previous_status: current_status,
                actor_id,
                at: Utc::now(),
            }),
            _ => Err(VoucherError::InvalidTransition {
                from: current_status,
                to: VoucherStatus::Approved,
            }),
        }
    }

    /// Cancel a voucher in any non-terminal status.
    ///
    /// The reason is trimmed before it is recorded.
    ///
    /// # Errors
    ///
    /// Returns `CancellationReasonRequired` for a blank reason, or
    /// `InvalidTransition` if the voucher is already cancelled.
    pub fn cancel(
        current_status: VoucherStatus,
        actor_id: ActorId,
        reason: &str,
    ) -> Result<VoucherAction, VoucherError> {
        let reason = reason.trim();
        if reason.is_empty() {
            return Err(VoucherError::CancellationReasonRequired);
        }

        if current_status.is_terminal() {
            return Err(VoucherError::InvalidTransition {
                from: current_status,
                to: VoucherStatus::Cancelled,
            });
        }

        Ok(VoucherAction::Cancel {
            previous_status: current_status,
            actor_id,
            at: Utc::now(),
            reason: reason.to_string(),
        })
    }

    /// Checks that header and lines may be changed or deleted.
    ///
    /// # Errors
    ///
    /// Returns `VoucherError::NotEditable` unless the voucher is a draft.
    pub fn ensure_editable(current_status: VoucherStatus) -> Result<(), VoucherError> {
        if current_status.is_editable() {
            Ok(())
        } else {
            Err(VoucherError::NotEditable(current_status))
        }
    }

    /// Check if a status transition is valid.
    #[must_use]
    pub fn is_valid_transition(from: VoucherStatus, to: VoucherStatus) -> bool {
        matches!(
            (from, to),
            (VoucherStatus::Draft, VoucherStatus::Validated)
                | (VoucherStatus::Validated, VoucherStatus::Approved)
                | (
                    VoucherStatus::Draft | VoucherStatus::Validated | VoucherStatus::Approved,
                    VoucherStatus::Cancelled
                )
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_from_draft() {
        let action = VoucherStateMachine::validate(VoucherStatus::Draft, ActorId::new()).unwrap();
        assert_eq!(action.new_status(), VoucherStatus::Validated);
        assert_eq!(action.previous_status(), VoucherStatus::Draft);
        assert_eq!(action.comment(), None);
    }

    #[test]
    fn test_validate_twice_fails() {
        let result = VoucherStateMachine::validate(VoucherStatus::Validated, ActorId::new());
        assert!(matches!(
            result,
            Err(VoucherError::InvalidTransition {
                from: VoucherStatus::Validated,
                to: VoucherStatus::Validated
            })
        ));
    }

    #[test]
    fn test_approve_from_validated() {
        let actor = ActorId::new();
        let action = VoucherStateMachine::approve(VoucherStatus::Validated, actor).unwrap();
        assert_eq!(action.new_status(), VoucherStatus::Approved);
        assert_eq!(action.actor_id(), actor);
    }

    #[test]
    fn test_approve_from_draft_fails() {
        let result = VoucherStateMachine::approve(VoucherStatus::Draft, ActorId::new());
        assert!(matches!(result, Err(VoucherError::InvalidTransition { .. })));
    }

    #[test]
    fn test_approve_twice_fails() {
        let result = VoucherStateMachine::approve(VoucherStatus::Approved, ActorId::new());
        assert!(matches!(
            result,
            Err(VoucherError::InvalidTransition {
                from: VoucherStatus::Approved,
                to: VoucherStatus::Approved
            })
        ));
    }

    #[test]
    fn test_cancel_approved() {
        let action =
            VoucherStateMachine::cancel(VoucherStatus::Approved, ActorId::new(), "  duplicate  ")
                .unwrap();
        assert_eq!(action.new_status(), VoucherStatus::Cancelled);
        assert_eq!(action.comment(), Some("duplicate"));
    }

    #[test]
    fn test_cancel_requires_reason() {
        let result = VoucherStateMachine::cancel(VoucherStatus::Draft, ActorId::new(), "   ");
        assert!(matches!(result, Err(VoucherError::CancellationReasonRequired)));
    }

    #[test]
    fn test_cancelled_is_terminal() {
        let actor = ActorId::new();
        assert!(VoucherStateMachine::cancel(VoucherStatus::Cancelled, actor, "again").is_err());
        assert!(VoucherStateMachine::validate(VoucherStatus::Cancelled, actor).is_err());
        assert!(VoucherStateMachine::approve(VoucherStatus::Cancelled, actor).is_err());
    }

    #[test]
    fn test_ensure_editable() {
        assert!(VoucherStateMachine::ensure_editable(VoucherStatus::Draft).is_ok());
        assert!(matches!(
            VoucherStateMachine::ensure_editable(VoucherStatus::Approved),
            Err(VoucherError::NotEditable(VoucherStatus::Approved))
        ));
    }

    #[test]
    fn test_is_valid_transition() {
        use VoucherStatus::{Approved, Cancelled, Draft, Validated};
        assert!(VoucherStateMachine::is_valid_transition(Draft, Validated));
        assert!(VoucherStateMachine::is_valid_transition(Validated, Approved));
        assert!(VoucherStateMachine::is_valid_transition(Approved, Cancelled));
        assert!(VoucherStateMachine::is_valid_transition(Draft, Cancelled));
        assert!(!VoucherStateMachine::is_valid_transition(Draft, Approved));
        assert!(!VoucherStateMachine::is_valid_transition(Approved, Validated));
        assert!(!VoucherStateMachine::is_valid_transition(Cancelled, Draft));
    }
}
