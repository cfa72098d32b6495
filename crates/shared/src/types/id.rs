//! Typed IDs for type-safe entity references.
//!
//! Using typed IDs prevents accidentally passing a `BankAccountId` where the
//! linked `AccountId` is expected.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Macro to generate typed ID wrappers.
macro_rules! typed_id {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub Uuid);

        impl $name {
            /// Creates a new random ID using UUID v7 (time-ordered).
            #[must_use]
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }

            /// Creates an ID from an existing UUID.
            #[must_use]
            pub const fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Returns the inner UUID.
            #[must_use]
            pub const fn into_inner(self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl std::str::FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(Uuid::parse_str(s)?))
            }
        }
    };
}

typed_id!(ActorId, "Identity of the caller performing an operation.");
typed_id!(
    AccountId,
    "Unique identifier for a chart of accounts node."
);
typed_id!(ThirdPartyId, "Unique identifier for a third party.");
typed_id!(FiscalPeriodId, "Unique identifier for a fiscal period.");
typed_id!(VoucherTypeId, "Unique identifier for a voucher type.");
typed_id!(VoucherId, "Unique identifier for a voucher.");
typed_id!(JournalEntryId, "Unique identifier for a posted journal entry.");
typed_id!(BankAccountId, "Unique identifier for a bank account.");
typed_id!(BankTransactionId, "Unique identifier for a bank transaction.");

#[cfg(test)]
#[path = "id_tests.rs"]
mod tests;
