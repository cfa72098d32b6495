//! Bank sync engine.
//!
//! Derives bank transactions from posted journal lines that touch
//! bank-linked GL accounts, voids them again when the entry is cancelled,
//! and reports discrepancies between the two.

use std::collections::HashMap;

use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    TransactionTrait,
};
use tracing::{info, warn};
use uuid::Uuid;

use ledgersync_core::ledger::LedgerLine;
use ledgersync_core::treasury::{
    BankError, BankTransactionStatus, EntryMetadata, SkippedLine, SyncOutcome, SyncReport,
    SyncedTransaction, build_sync_report, plan_bank_movements,
};
use ledgersync_core::voucher::VoucherError;

use crate::entities::{bank_accounts, bank_transactions, sea_orm_active_enums};
use crate::lock::bank_db_error;

use super::bank_ledger::{BankLedgerRepository, CreateBankTransactionInput};
use super::journal::JournalRepository;

/// Document type recorded on transactions derived from journal entries.
pub const DOCUMENT_JOURNAL_ENTRY: &str = "journal_entry";

/// Bank sync repository.
#[derive(Debug, Clone)]
pub struct BankSyncRepository {
    db: DatabaseConnection,
    ledger: BankLedgerRepository,
}

impl BankSyncRepository {
    /// Creates a new bank sync repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection, ledger: BankLedgerRepository) -> Self {
        Self { db, ledger }
    }

    /// Creates cleared bank transactions for the bank-linked lines of a
    /// posted journal entry.
    ///
    /// Runs inside the posting transaction. Lines are processed one after
    /// another; a malformed line or a failed transaction is recorded in
    /// `failures` and the next line is still attempted.
    ///
    /// # Errors
    ///
    /// Returns an error only if the bank account lookup itself fails.
    pub async fn sync_from_journal_lines<C>(
        &self,
        conn: &C,
        journal_entry_id: Uuid,
        lines: &[LedgerLine],
        metadata: &EntryMetadata,
        actor_id: Uuid,
    ) -> Result<SyncOutcome, BankError>
    where
        C: ConnectionTrait + TransactionTrait,
    {
        let links = Self::bank_links(conn, lines).await?;
        let plan = plan_bank_movements(lines, &links);
        let mut outcome = SyncOutcome::default();

        for skipped in plan.skipped {
            warn!(
                journal_entry_id = %journal_entry_id,
                order_number = skipped.order_number,
                reason = %skipped.reason,
                "Skipping malformed bank-linked journal line"
            );
            outcome.failures.push(skipped);
        }

        for movement in &plan.movements {
            let input = CreateBankTransactionInput {
                bank_account_id: movement.bank_account_id,
                transaction_type: movement.transaction_type,
                amount: movement.amount,
                transaction_date: metadata.entry_date,
                description: movement
                    .description
                    .clone()
                    .or_else(|| metadata.description.clone()),
                reference: Some(metadata.entry_number.clone()),
                cleared: true,
                allow_overdraft: false,
                journal_entry_id: Some(journal_entry_id),
                document_type: Some(DOCUMENT_JOURNAL_ENTRY.to_string()),
                document_id: Some(journal_entry_id),
                created_by: actor_id,
            };

            match self.ledger.create_cleared_within(conn, &input).await {
                Ok(tx) => {
                    info!(
                        journal_entry_id = %journal_entry_id,
                        bank_transaction_id = %tx.id,
                        bank_account_id = %tx.bank_account_id,
                        transaction_type = movement.transaction_type.as_str(),
                        amount = %tx.amount,
                        "Bank transaction synced from journal line"
                    );
                    outcome.created.push(tx.id);
                }
                Err(err) => {
                    warn!(
                        journal_entry_id = %journal_entry_id,
                        bank_account_id = %movement.bank_account_id,
                        order_number = movement.order_number,
                        error = %err,
                        "Bank sync failed for journal line"
                    );
                    outcome.failures.push(SkippedLine {
                        order_number: movement.order_number,
                        reason: err.to_string(),
                    });
                }
            }
        }

        Ok(outcome)
    }

    /// Voids every live bank transaction derived from a journal entry.
    ///
    /// Runs inside the caller's transaction and stops at the first failure.
    ///
    /// # Errors
    ///
    /// Returns the first void failure.
    pub async fn void_by_journal_entry<C>(
        &self,
        conn: &C,
        journal_entry_id: Uuid,
        actor_id: Uuid,
        reason: &str,
    ) -> Result<Vec<Uuid>, BankError>
    where
        C: ConnectionTrait + TransactionTrait,
    {
        let transactions = bank_transactions::Entity::find()
            .filter(bank_transactions::Column::JournalEntryId.eq(journal_entry_id))
            .filter(
                bank_transactions::Column::Status
                    .ne(sea_orm_active_enums::BankTransactionStatus::Voided),
            )
            .order_by_asc(bank_transactions::Column::CreatedAt)
            .all(conn)
            .await
            .map_err(bank_db_error)?;

        let mut voided = Vec::with_capacity(transactions.len());
        for tx in transactions {
            let tx = self.ledger.void_within(conn, tx.id, actor_id, reason).await?;
            voided.push(tx.id);
        }

        if !voided.is_empty() {
            info!(
                journal_entry_id = %journal_entry_id,
                voided = voided.len(),
                "Voided bank transactions derived from journal entry"
            );
        }

        Ok(voided)
    }

    /// Compares a journal entry's bank-linked lines with the bank
    /// transactions referencing it. Read-only.
    ///
    /// # Errors
    ///
    /// Returns `VoucherError::JournalEntryNotFound` if the entry does not exist.
    pub async fn validate_sync(&self, journal_entry_id: Uuid) -> Result<SyncReport, VoucherError> {
        let entry = JournalRepository::find_with_lines(&self.db, journal_entry_id)
            .await
            .map_err(|e| VoucherError::Database(e.to_string()))?
            .ok_or(VoucherError::JournalEntryNotFound(journal_entry_id))?;

        let lines = entry.ledger_lines();
        let links = Self::bank_links(&self.db, &lines).await?;
        let expected = plan_bank_movements(&lines, &links).movements;

        let actual: Vec<SyncedTransaction> = bank_transactions::Entity::find()
            .filter(bank_transactions::Column::JournalEntryId.eq(journal_entry_id))
            .all(&self.db)
            .await
            .map_err(|e| VoucherError::Database(e.to_string()))?
            .into_iter()
            .map(|tx| SyncedTransaction {
                id: tx.id,
                bank_account_id: tx.bank_account_id,
                transaction_type: tx.transaction_type.into(),
                amount: tx.amount,
                status: BankTransactionStatus::from(tx.status),
            })
            .collect();

        Ok(build_sync_report(journal_entry_id, &expected, &actual))
    }

    /// Maps GL account IDs on `lines` to their active bank accounts, in one query.
    async fn bank_links<C>(conn: &C, lines: &[LedgerLine]) -> Result<HashMap<Uuid, Uuid>, BankError>
    where
        C: ConnectionTrait,
    {
        let mut account_ids: Vec<Uuid> = lines.iter().map(|l| l.account_id.into_inner()).collect();
        account_ids.sort_unstable();
        account_ids.dedup();
        if account_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let accounts = bank_accounts::Entity::find()
            .filter(bank_accounts::Column::GlAccountId.is_in(account_ids))
            .filter(bank_accounts::Column::IsActive.eq(true))
            .all(conn)
            .await
            .map_err(bank_db_error)?;

        Ok(accounts
            .into_iter()
            .map(|a| (a.gl_account_id, a.id))
            .collect())
    }
}
