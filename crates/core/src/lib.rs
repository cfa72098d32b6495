//! Core business logic for LedgerSync.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! All domain types, validation rules, and calculations live here.
//!
//! # Modules
//!
//! - `ledger` - Double-entry line validation and reversal
//! - `sequence` - Voucher and journal entry numbering
//! - `voucher` - Voucher state machine
//! - `treasury` - Bank balances, bank sync planning, lock-conflict retry

pub mod ledger;
pub mod sequence;
pub mod treasury;
pub mod voucher;
