//! Repository abstractions for data access.
//!
//! Repositories provide a clean interface for database operations,
//! hiding the `SeaORM` implementation details from the rest of the application.
//! Collaborators that take a connection argument run inside the caller's
//! transaction.

pub mod bank_ledger;
pub mod bank_sync;
pub mod journal;
pub mod master_data;
pub mod sequence;
pub mod voucher;

pub use bank_ledger::{
    BankLedgerRepository, BankTransactionFilter, CreateBankTransactionInput, OpenBankAccountInput,
};
pub use bank_sync::BankSyncRepository;
pub use journal::{JournalEntryWithLines, JournalRepository, PostJournalEntryInput};
pub use master_data::MasterDataRepository;
pub use sequence::{SequenceGenerator, VoucherNumber};
pub use voucher::{
    ApprovalResult, CancelResult, CreateVoucherInput, DRAFT_DELETED_COMMENT, UpdateVoucherInput,
    VoucherFilter, VoucherRepository, VoucherWithLines,
};
