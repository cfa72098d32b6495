//! Entity re-exports.

pub use super::bank_accounts::Entity as BankAccounts;
pub use super::bank_transaction_status_history::Entity as BankTransactionStatusHistory;
pub use super::bank_transactions::Entity as BankTransactions;
pub use super::chart_of_accounts::Entity as ChartOfAccounts;
pub use super::fiscal_periods::Entity as FiscalPeriods;
pub use super::journal_entries::Entity as JournalEntries;
pub use super::journal_entry_lines::Entity as JournalEntryLines;
pub use super::journal_sequences::Entity as JournalSequences;
pub use super::third_parties::Entity as ThirdParties;
pub use super::voucher_lines::Entity as VoucherLines;
pub use super::voucher_status_history::Entity as VoucherStatusHistory;
pub use super::voucher_types::Entity as VoucherTypes;
pub use super::vouchers::Entity as Vouchers;
