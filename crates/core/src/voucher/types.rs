//! Voucher lifecycle types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use ledgersync_shared::types::ActorId;

/// Voucher status.
///
/// The valid transitions are:
/// - Draft → Validated (validate)
/// - Validated → Approved (approve)
/// - Draft | Validated | Approved → Cancelled (cancel)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VoucherStatus {
    /// Header and lines may still change.
    Draft,
    /// Balanced checkpoint awaiting approval.
    Validated,
    /// Posted to the journal.
    Approved,
    /// Terminal.
    Cancelled,
}

impl VoucherStatus {
    /// Returns the string representation of the status.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "DRAFT",
            Self::Validated => "VALIDATED",
            Self::Approved => "APPROVED",
            Self::Cancelled => "CANCELLED",
        }
    }

    /// Parses a status from a string, case-insensitively.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_uppercase().as_str() {
            "DRAFT" => Some(Self::Draft),
            "VALIDATED" => Some(Self::Validated),
            "APPROVED" => Some(Self::Approved),
            "CANCELLED" => Some(Self::Cancelled),
            _ => None,
        }
    }

    /// Returns true if header and lines may be modified.
    #[must_use]
    pub const fn is_editable(&self) -> bool {
        matches!(self, Self::Draft)
    }

    /// Returns true if no further transition is possible.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

impl fmt::Display for VoucherStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A validated status transition with its audit data.
#[derive(Debug, Clone)]
pub enum VoucherAction {
    /// Draft → Validated.
    Validate {
        /// Status before the transition.
        previous_status: VoucherStatus,
        /// Actor performing it.
        actor_id: ActorId,
        /// When it happened.
        at: DateTime<Utc>,
    },
    /// Validated → Approved.
    Approve {
        /// Status before the transition.
        previous_status: VoucherStatus,
        /// Approver.
        actor_id: ActorId,
        /// When it happened.
        at: DateTime<Utc>,
    },
    /// Any non-terminal status → Cancelled.
    Cancel {
        /// Status before the transition.
        previous_status: VoucherStatus,
        /// Actor cancelling.
        actor_id: ActorId,
        /// When it happened.
        at: DateTime<Utc>,
        /// Trimmed, non-empty reason.
        reason: String,
    },
}

impl VoucherAction {
    /// Returns the status before this action.
    #[must_use]
    pub const fn previous_status(&self) -> VoucherStatus {
        match self {
            Self::Validate { previous_status, .. }
            | Self::Approve { previous_status, .. }
            | Self::Cancel { previous_status, .. } => *previous_status,
        }
    }

    /// Returns the status resulting from this action.
    #[must_use]
    pub const fn new_status(&self) -> VoucherStatus {
        match self {
            Self::Validate { .. } => VoucherStatus::Validated,
            Self::Approve { .. } => VoucherStatus::Approved,
            Self::Cancel { .. } => VoucherStatus::Cancelled,
        }
    }

    /// Returns the acting identity.
    #[must_use]
    pub const fn actor_id(&self) -> ActorId {
        match self {
            Self::Validate { actor_id, .. }
            | Self::Approve { actor_id, .. }
            | Self::Cancel { actor_id, .. } => *actor_id,
        }
    }

    /// Returns the transition timestamp.
    #[must_use]
    pub const fn at(&self) -> DateTime<Utc> {
        match self {
            Self::Validate { at, .. } | Self::Approve { at, .. } | Self::Cancel { at, .. } => *at,
        }
    }

    /// Comment recorded in the status history.
    #[must_use]
    pub fn comment(&self) -> Option<&str> {
        match self {
            Self::Cancel { reason, .. } => Some(reason),
            _ => None,
        }
    }
}
