//! Voucher lifecycle: DRAFT → VALIDATED → APPROVED, with CANCELLED
//! reachable from any non-terminal status.

pub mod error;
pub mod lines;
pub mod service;
pub mod types;

#[cfg(test)]
mod service_props;

pub use error::VoucherError;
pub use lines::{VoucherLineInput, prepare_lines};
pub use service::VoucherStateMachine;
pub use types::{VoucherAction, VoucherStatus};
