//! `SeaORM` entity definitions.

pub mod prelude;

pub mod bank_accounts;
pub mod bank_transaction_status_history;
pub mod bank_transactions;
pub mod chart_of_accounts;
pub mod fiscal_periods;
pub mod journal_entries;
pub mod journal_entry_lines;
pub mod journal_sequences;
pub mod sea_orm_active_enums;
pub mod third_parties;
pub mod voucher_lines;
pub mod voucher_status_history;
pub mod voucher_types;
pub mod vouchers;
