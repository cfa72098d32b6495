//! Voucher repository: draft management and status transitions.
//!
//! Each transition locks the voucher row first. Approval then draws the
//! journal entry number, posts the entry and syncs bank transactions in the
//! same database transaction. Lock order is voucher, counter, bank account.

use chrono::{NaiveDate, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection,
    DatabaseTransaction, DbErr, EntityTrait, ModelTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, TransactionTrait, prelude::DateTimeWithTimeZone,
};
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use ledgersync_core::ledger::{LedgerLine, validate_accounts, validate_lines};
use ledgersync_core::treasury::{BankError, EntryMetadata, SkippedLine, SyncOutcome};
use ledgersync_core::voucher::{
    VoucherAction, VoucherError, VoucherLineInput, VoucherStateMachine, VoucherStatus,
    prepare_lines,
};
use ledgersync_shared::types::{AccountId, ActorId, PageRequest, PageResponse, ThirdPartyId};

use crate::entities::{
    sea_orm_active_enums::{self, FiscalPeriodStatus},
    voucher_lines, voucher_status_history, vouchers,
};
use crate::lock::bank_db_error;

use super::bank_ledger::BankLedgerRepository;
use super::bank_sync::BankSyncRepository;
use super::journal::{JournalRepository, PostJournalEntryInput};
use super::master_data::MasterDataRepository;
use super::sequence::SequenceGenerator;

/// History comment recorded when a draft is deleted.
pub const DRAFT_DELETED_COMMENT: &str = "Draft deleted";

/// Input for creating a draft voucher.
#[derive(Debug, Clone)]
pub struct CreateVoucherInput {
    /// Voucher type; supplies the consecutive counter.
    pub voucher_type_id: Uuid,
    /// Document date.
    pub date: NaiveDate,
    /// Fiscal period.
    pub fiscal_period_id: Uuid,
    /// Header third party, inherited by lines without one.
    pub third_party_id: Option<Uuid>,
    /// Optional description.
    pub description: Option<String>,
    /// Lines in order.
    pub lines: Vec<VoucherLineInput>,
    /// Creating actor.
    pub created_by: Uuid,
}

/// Input for replacing a draft's header and lines.
#[derive(Debug, Clone)]
pub struct UpdateVoucherInput {
    /// Document date.
    pub date: NaiveDate,
    /// Fiscal period.
    pub fiscal_period_id: Uuid,
    /// Header third party.
    pub third_party_id: Option<Uuid>,
    /// Optional description.
    pub description: Option<String>,
    /// Replacement lines.
    pub lines: Vec<VoucherLineInput>,
}

/// Filter options for listing vouchers.
#[derive(Debug, Clone, Default)]
pub struct VoucherFilter {
    /// Filter by status.
    pub status: Option<VoucherStatus>,
    /// Filter by voucher type.
    pub voucher_type_id: Option<Uuid>,
    /// Filter by fiscal period.
    pub fiscal_period_id: Option<Uuid>,
    /// Filter by header third party.
    pub third_party_id: Option<Uuid>,
    /// Filter by date range start.
    pub date_from: Option<NaiveDate>,
    /// Filter by date range end.
    pub date_to: Option<NaiveDate>,
}

impl VoucherFilter {
    fn condition(&self) -> Condition {
        let mut condition = Condition::all();
        if let Some(status) = self.status {
            condition = condition.add(
                vouchers::Column::Status.eq(sea_orm_active_enums::VoucherStatus::from(status)),
            );
        }
        if let Some(id) = self.voucher_type_id {
            condition = condition.add(vouchers::Column::VoucherTypeId.eq(id));
        }
        if let Some(id) = self.fiscal_period_id {
            condition = condition.add(vouchers::Column::FiscalPeriodId.eq(id));
        }
        if let Some(id) = self.third_party_id {
            condition = condition.add(vouchers::Column::ThirdPartyId.eq(id));
        }
        if let Some(from) = self.date_from {
            condition = condition.add(vouchers::Column::Date.gte(from));
        }
        if let Some(to) = self.date_to {
            condition = condition.add(vouchers::Column::Date.lte(to));
        }
        condition
    }
}

/// Voucher header with its lines in order.
#[derive(Debug, Clone, Serialize)]
pub struct VoucherWithLines {
    /// Header.
    pub voucher: vouchers::Model,
    /// Lines ordered by `line_number`.
    pub lines: Vec<voucher_lines::Model>,
}

/// Result of an approval.
#[derive(Debug, Clone, Serialize)]
pub struct ApprovalResult {
    /// The approved voucher.
    pub voucher: vouchers::Model,
    /// Posted journal entry.
    pub journal_entry_id: Uuid,
    /// Its number.
    pub entry_number: String,
    /// Bank transactions created by the sync.
    pub bank_transaction_ids: Vec<Uuid>,
    /// Bank-linked lines that were not synced.
    pub bank_sync_failures: Vec<SkippedLine>,
}

/// Result of a cancellation.
#[derive(Debug, Clone, Serialize)]
pub struct CancelResult {
    /// The cancelled voucher.
    pub voucher: vouchers::Model,
    /// Status before cancelling.
    pub previous_status: VoucherStatus,
    /// Always `CANCELLED`.
    pub new_status: VoucherStatus,
    /// Reversing journal entry, for approved vouchers.
    pub reversal_entry_id: Option<Uuid>,
    /// Bank transactions voided.
    pub voided_bank_transaction_ids: Vec<Uuid>,
}

/// Voucher repository.
#[derive(Debug, Clone)]
pub struct VoucherRepository {
    db: DatabaseConnection,
    bank_sync: BankSyncRepository,
}

impl VoucherRepository {
    /// Creates a new voucher repository.
    #[must_use]
    pub fn new(db: DatabaseConnection, bank_ledger: BankLedgerRepository) -> Self {
        let bank_sync = BankSyncRepository::new(db.clone(), bank_ledger);
        Self { db, bank_sync }
    }

    /// Creates a draft voucher.
    ///
    /// # Errors
    ///
    /// Returns a reference lookup error, `VoucherError::Ledger` for a
    /// malformed line or an unusable account, or a numbering error.
    pub async fn create_voucher(
        &self,
        input: CreateVoucherInput,
    ) -> Result<VoucherWithLines, VoucherError> {
        let (lines, totals) =
            prepare_lines(&input.lines, input.third_party_id.map(ThirdPartyId::from_uuid))?;

        let txn = self.db.begin().await.map_err(db_error)?;

        let voucher_type = MasterDataRepository::get_voucher_type(&txn, input.voucher_type_id)
            .await
            .map_err(db_error)?
            .ok_or(VoucherError::VoucherTypeNotFound(input.voucher_type_id))?;
        if !voucher_type.is_active {
            return Err(VoucherError::VoucherTypeInactive(voucher_type.id));
        }
        check_references(&txn, input.fiscal_period_id, input.third_party_id, &lines).await?;

        let number = SequenceGenerator::next_consecutive(&txn, input.voucher_type_id).await?;

        let now: DateTimeWithTimeZone = Utc::now().into();
        let voucher = vouchers::ActiveModel {
            id: Set(Uuid::now_v7()),
            voucher_type_id: Set(input.voucher_type_id),
            consecutive: Set(number.consecutive),
            voucher_number: Set(number.voucher_number),
            date: Set(input.date),
            fiscal_period_id: Set(input.fiscal_period_id),
            third_party_id: Set(input.third_party_id),
            description: Set(input.description),
            total_debit: Set(totals.debit_total),
            total_credit: Set(totals.credit_total),
            status: Set(sea_orm_active_enums::VoucherStatus::Draft),
            journal_entry_id: Set(None),
            created_by: Set(input.created_by),
            approved_by: Set(None),
            approved_at: Set(None),
            cancelled_by: Set(None),
            cancelled_at: Set(None),
            cancellation_reason: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&txn)
        .await
        .map_err(db_error)?;

        let line_models = insert_lines(&txn, voucher.id, &lines, now).await?;

        voucher_status_history::ActiveModel {
            id: Set(Uuid::now_v7()),
            voucher_id: Set(voucher.id),
            previous_status: Set(None),
            new_status: Set(sea_orm_active_enums::VoucherStatus::Draft),
            actor_id: Set(input.created_by),
            comment: Set(None),
            created_at: Set(now),
        }
        .insert(&txn)
        .await
        .map_err(db_error)?;

        txn.commit().await.map_err(db_error)?;

        info!(
            voucher_id = %voucher.id,
            voucher_number = %voucher.voucher_number,
            lines = line_models.len(),
            "Voucher created"
        );

        Ok(VoucherWithLines {
            voucher,
            lines: line_models,
        })
    }

    /// Replaces a draft's header fields and lines.
    ///
    /// # Errors
    ///
    /// Returns `VoucherError::NotEditable` unless the voucher is a draft.
    pub async fn update_draft(
        &self,
        voucher_id: Uuid,
        input: UpdateVoucherInput,
    ) -> Result<VoucherWithLines, VoucherError> {
        let (lines, totals) =
            prepare_lines(&input.lines, input.third_party_id.map(ThirdPartyId::from_uuid))?;

        let txn = self.db.begin().await.map_err(db_error)?;
        let voucher = lock_voucher(&txn, voucher_id).await?;
        VoucherStateMachine::ensure_editable(voucher.status.into())?;
        check_references(&txn, input.fiscal_period_id, input.third_party_id, &lines).await?;

        voucher_lines::Entity::delete_many()
            .filter(voucher_lines::Column::VoucherId.eq(voucher_id))
            .exec(&txn)
            .await
            .map_err(db_error)?;

        let now: DateTimeWithTimeZone = Utc::now().into();
        let line_models = insert_lines(&txn, voucher_id, &lines, now).await?;

        let mut active: vouchers::ActiveModel = voucher.into();
        active.date = Set(input.date);
        active.fiscal_period_id = Set(input.fiscal_period_id);
        active.third_party_id = Set(input.third_party_id);
        active.description = Set(input.description);
        active.total_debit = Set(totals.debit_total);
        active.total_credit = Set(totals.credit_total);
        active.updated_at = Set(now);
        let voucher = active.update(&txn).await.map_err(db_error)?;

        txn.commit().await.map_err(db_error)?;

        info!(voucher_id = %voucher_id, lines = line_models.len(), "Draft voucher updated");

        Ok(VoucherWithLines {
            voucher,
            lines: line_models,
        })
    }

    /// Deletes a draft voucher and its lines.
    ///
    /// Status history is kept, and the deletion is appended to it.
    ///
    /// # Errors
    ///
    /// Returns `VoucherError::NotEditable` unless the voucher is a draft.
    pub async fn delete_draft(&self, voucher_id: Uuid, actor_id: Uuid) -> Result<(), VoucherError> {
        let txn = self.db.begin().await.map_err(db_error)?;
        let voucher = lock_voucher(&txn, voucher_id).await?;
        VoucherStateMachine::ensure_editable(voucher.status.into())?;

        voucher_lines::Entity::delete_many()
            .filter(voucher_lines::Column::VoucherId.eq(voucher_id))
            .exec(&txn)
            .await
            .map_err(db_error)?;

        // History outlives the voucher; the deletion is its last row.
        voucher_status_history::ActiveModel {
            id: Set(Uuid::now_v7()),
            voucher_id: Set(voucher_id),
            previous_status: Set(Some(voucher.status)),
            new_status: Set(voucher.status),
            actor_id: Set(actor_id),
            comment: Set(Some(DRAFT_DELETED_COMMENT.to_string())),
            created_at: Set(Utc::now().into()),
        }
        .insert(&txn)
        .await
        .map_err(db_error)?;

        voucher.delete(&txn).await.map_err(db_error)?;

        txn.commit().await.map_err(db_error)?;

        info!(voucher_id = %voucher_id, actor_id = %actor_id, "Draft voucher deleted");
        Ok(())
    }

    /// Moves a draft to VALIDATED once its lines balance.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTransition` unless the voucher is a draft, or
    /// `VoucherError::Ledger` if the lines do not balance.
    pub async fn validate_voucher(
        &self,
        voucher_id: Uuid,
        actor_id: Uuid,
    ) -> Result<vouchers::Model, VoucherError> {
        let txn = self.db.begin().await.map_err(db_error)?;
        let voucher = lock_voucher(&txn, voucher_id).await?;
        let action = VoucherStateMachine::validate(voucher.status.into(), ActorId::from_uuid(actor_id))?;

        let lines = load_ledger_lines(&txn, voucher_id).await?;
        validate_lines(&lines)?;

        let voucher = apply_transition(&txn, voucher, &action).await?;
        txn.commit().await.map_err(db_error)?;

        info!(voucher_id = %voucher_id, actor_id = %actor_id, "Voucher validated");
        Ok(voucher)
    }

    /// Approves a validated voucher: posts its journal entry and syncs bank
    /// transactions, all in one database transaction.
    ///
    /// Bank sync is best-effort: its failures are returned in
    /// `bank_sync_failures` and do not roll back the approval.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTransition` unless the voucher is VALIDATED,
    /// `VoucherError::Ledger` for unbalanced lines or an account that is no
    /// longer active or postable, or a numbering error.
    /// Nothing is persisted on error.
    pub async fn approve_voucher(
        &self,
        voucher_id: Uuid,
        actor_id: Uuid,
    ) -> Result<ApprovalResult, VoucherError> {
        let txn = self.db.begin().await.map_err(db_error)?;
        let voucher = lock_voucher(&txn, voucher_id).await?;
        let action = VoucherStateMachine::approve(voucher.status.into(), ActorId::from_uuid(actor_id))?;

        let period = MasterDataRepository::get_fiscal_period(&txn, voucher.fiscal_period_id)
            .await
            .map_err(db_error)?
            .ok_or(VoucherError::FiscalPeriodNotFound(voucher.fiscal_period_id))?;
        if period.status == FiscalPeriodStatus::Closed {
            return Err(VoucherError::FiscalPeriodClosed(period.id));
        }

        let lines = load_ledger_lines(&txn, voucher_id).await?;
        // Accounts may have been deactivated since validation.
        check_accounts(&txn, &lines).await?;

        let posted = JournalRepository::post_entry(
            &txn,
            PostJournalEntryInput {
                entry_date: voucher.date,
                fiscal_period_id: voucher.fiscal_period_id,
                description: Some(
                    voucher
                        .description
                        .clone()
                        .unwrap_or_else(|| voucher.voucher_number.clone()),
                ),
                source_document_id: voucher.id,
                lines: &lines,
                reverses_entry_id: None,
                created_by: actor_id,
            },
        )
        .await?;

        let metadata = EntryMetadata {
            entry_number: posted.entry.entry_number.clone(),
            entry_date: posted.entry.entry_date,
            description: posted.entry.description.clone(),
        };
        let sync = self
            .sync_bank(&txn, posted.entry.id, &lines, &metadata, actor_id)
            .await;

        let mut active: vouchers::ActiveModel = voucher.into();
        active.journal_entry_id = Set(Some(posted.entry.id));
        active.approved_by = Set(Some(actor_id));
        active.approved_at = Set(Some(action.at().into()));
        let voucher = apply_transition(&txn, active, &action).await?;

        txn.commit().await.map_err(db_error)?;

        info!(
            voucher_id = %voucher_id,
            journal_entry_id = %posted.entry.id,
            entry_number = %posted.entry.entry_number,
            bank_transactions = sync.created.len(),
            bank_sync_failures = sync.failures.len(),
            "Voucher approved"
        );

        Ok(ApprovalResult {
            voucher,
            journal_entry_id: posted.entry.id,
            entry_number: posted.entry.entry_number,
            bank_transaction_ids: sync.created,
            bank_sync_failures: sync.failures,
        })
    }

    /// Cancels a voucher in any non-terminal status.
    ///
    /// For an approved voucher this posts a reversing journal entry dated
    /// today and voids every bank transaction derived from the original
    /// entry before the status flips. A failed void aborts the cancellation.
    ///
    /// # Errors
    ///
    /// Returns `CancellationReasonRequired`, `InvalidTransition` for a
    /// cancelled voucher, or `VoucherError::Bank` if a void fails.
    pub async fn cancel_voucher(
        &self,
        voucher_id: Uuid,
        actor_id: Uuid,
        reason: &str,
    ) -> Result<CancelResult, VoucherError> {
        let txn = self.db.begin().await.map_err(db_error)?;
        let voucher = lock_voucher(&txn, voucher_id).await?;
        let action = VoucherStateMachine::cancel(
            voucher.status.into(),
            ActorId::from_uuid(actor_id),
            reason,
        )?;
        let reason = action.comment().unwrap_or_default().to_string();

        let (reversal_entry_id, voided) = match (action.previous_status(), voucher.journal_entry_id)
        {
            (VoucherStatus::Approved, Some(entry_id)) => {
                let original = JournalRepository::find_with_lines(&txn, entry_id)
                    .await
                    .map_err(db_error)?
                    .ok_or(VoucherError::JournalEntryNotFound(entry_id))?;

                // Draw the reversal number before touching bank accounts.
                let today = action.at().date_naive();
                let period_id = MasterDataRepository::open_fiscal_period_for_date(&txn, today)
                    .await
                    .map_err(db_error)?
                    .map_or(original.entry.fiscal_period_id, |p| p.id);
                let reversal = JournalRepository::post_reversal(
                    &txn, &original, today, period_id, &reason, actor_id,
                )
                .await?;

                let voided = self
                    .bank_sync
                    .void_by_journal_entry(&txn, entry_id, actor_id, &reason)
                    .await?;

                (Some(reversal.entry.id), voided)
            }
            _ => (None, Vec::new()),
        };

        let mut active: vouchers::ActiveModel = voucher.into();
        active.cancelled_by = Set(Some(actor_id));
        active.cancelled_at = Set(Some(action.at().into()));
        active.cancellation_reason = Set(Some(reason));
        let voucher = apply_transition(&txn, active, &action).await?;

        txn.commit().await.map_err(db_error)?;

        info!(
            voucher_id = %voucher_id,
            previous_status = %action.previous_status(),
            reversal_entry_id = ?reversal_entry_id,
            voided_bank_transactions = voided.len(),
            "Voucher cancelled"
        );

        Ok(CancelResult {
            voucher,
            previous_status: action.previous_status(),
            new_status: action.new_status(),
            reversal_entry_id,
            voided_bank_transaction_ids: voided,
        })
    }

    /// Gets a voucher with its lines.
    ///
    /// # Errors
    ///
    /// Returns `VoucherError::NotFound` if it does not exist.
    pub async fn get_voucher(&self, voucher_id: Uuid) -> Result<VoucherWithLines, VoucherError> {
        let voucher = vouchers::Entity::find_by_id(voucher_id)
            .one(&self.db)
            .await
            .map_err(db_error)?
            .ok_or(VoucherError::NotFound(voucher_id))?;

        let lines = voucher_lines::Entity::find()
            .filter(voucher_lines::Column::VoucherId.eq(voucher_id))
            .order_by_asc(voucher_lines::Column::LineNumber)
            .all(&self.db)
            .await
            .map_err(db_error)?;

        Ok(VoucherWithLines { voucher, lines })
    }

    /// Lists vouchers, newest first.
    ///
    /// # Errors
    ///
    /// Returns `VoucherError::Database` if the query fails.
    pub async fn list_vouchers(
        &self,
        filter: &VoucherFilter,
        page: &PageRequest,
    ) -> Result<PageResponse<vouchers::Model>, VoucherError> {
        let query = vouchers::Entity::find().filter(filter.condition());

        let total = query.clone().count(&self.db).await.map_err(db_error)?;
        let data = query
            .order_by_desc(vouchers::Column::Date)
            .order_by_desc(vouchers::Column::Consecutive)
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await
            .map_err(db_error)?;

        Ok(PageResponse::for_request(data, page, total))
    }

    /// Status history of a voucher, oldest first.
    ///
    /// History survives draft deletion and is still returned afterwards.
    ///
    /// # Errors
    ///
    /// Returns `VoucherError::NotFound` if the voucher never existed.
    pub async fn get_status_history(
        &self,
        voucher_id: Uuid,
    ) -> Result<Vec<voucher_status_history::Model>, VoucherError> {
        let history = voucher_status_history::Entity::find()
            .filter(voucher_status_history::Column::VoucherId.eq(voucher_id))
            .order_by_asc(voucher_status_history::Column::CreatedAt)
            .order_by_asc(voucher_status_history::Column::Id)
            .all(&self.db)
            .await
            .map_err(db_error)?;

        if history.is_empty() {
            vouchers::Entity::find_by_id(voucher_id)
                .one(&self.db)
                .await
                .map_err(db_error)?
                .ok_or(VoucherError::NotFound(voucher_id))?;
        }

        Ok(history)
    }

    /// Runs the bank sync in a savepoint and degrades any failure to a
    /// recorded outcome, leaving the approval intact.
    async fn sync_bank(
        &self,
        txn: &DatabaseTransaction,
        journal_entry_id: Uuid,
        lines: &[LedgerLine],
        metadata: &EntryMetadata,
        actor_id: Uuid,
    ) -> SyncOutcome {
        let result = async {
            let savepoint = txn.begin().await.map_err(bank_db_error)?;
            let outcome = self
                .bank_sync
                .sync_from_journal_lines(&savepoint, journal_entry_id, lines, metadata, actor_id)
                .await?;
            savepoint.commit().await.map_err(bank_db_error)?;
            Ok::<_, BankError>(outcome)
        }
        .await;

        match result {
            Ok(outcome) => outcome,
            Err(err) => {
                warn!(
                    journal_entry_id = %journal_entry_id,
                    error = %err,
                    "Bank sync failed, approval continues without bank transactions"
                );
                SyncOutcome {
                    created: Vec::new(),
                    failures: vec![SkippedLine {
                        order_number: 0,
                        reason: err.to_string(),
                    }],
                }
            }
        }
    }
}

/// Locks the voucher row for the rest of the transaction.
async fn lock_voucher<C>(conn: &C, voucher_id: Uuid) -> Result<vouchers::Model, VoucherError>
where
    C: ConnectionTrait,
{
    vouchers::Entity::find_by_id(voucher_id)
        .lock_exclusive()
        .one(conn)
        .await
        .map_err(db_error)?
        .ok_or(VoucherError::NotFound(voucher_id))
}

/// Checks the fiscal period, third parties and accounts referenced by a voucher.
async fn check_references<C>(
    conn: &C,
    fiscal_period_id: Uuid,
    third_party_id: Option<Uuid>,
    lines: &[LedgerLine],
) -> Result<(), VoucherError>
where
    C: ConnectionTrait,
{
    let period = MasterDataRepository::get_fiscal_period(conn, fiscal_period_id)
        .await
        .map_err(db_error)?
        .ok_or(VoucherError::FiscalPeriodNotFound(fiscal_period_id))?;
    if period.status == FiscalPeriodStatus::Closed {
        return Err(VoucherError::FiscalPeriodClosed(fiscal_period_id));
    }

    let mut third_parties: Vec<Uuid> = lines
        .iter()
        .filter_map(|l| l.third_party_id.map(ThirdPartyId::into_inner))
        .chain(third_party_id)
        .collect();
    third_parties.sort_unstable();
    third_parties.dedup();
    for id in third_parties {
        if !MasterDataRepository::third_party_exists(conn, id)
            .await
            .map_err(db_error)?
        {
            return Err(VoucherError::ThirdPartyNotFound(id));
        }
    }

    check_accounts(conn, lines).await
}

/// Checks that every line account exists, is active and accepts postings.
async fn check_accounts<C>(conn: &C, lines: &[LedgerLine]) -> Result<(), VoucherError>
where
    C: ConnectionTrait,
{
    let account_ids: Vec<Uuid> = lines.iter().map(|l| l.account_id.into_inner()).collect();
    let accounts = MasterDataRepository::account_infos(conn, &account_ids)
        .await
        .map_err(db_error)?;
    validate_accounts(lines, |id| accounts.get(&id).cloned())?;

    Ok(())
}

async fn insert_lines<C>(
    conn: &C,
    voucher_id: Uuid,
    lines: &[LedgerLine],
    now: DateTimeWithTimeZone,
) -> Result<Vec<voucher_lines::Model>, VoucherError>
where
    C: ConnectionTrait,
{
    let mut models = Vec::with_capacity(lines.len());
    for line in lines {
        let model = voucher_lines::ActiveModel {
            id: Set(Uuid::now_v7()),
            voucher_id: Set(voucher_id),
            line_number: Set(i32::try_from(line.line_number).unwrap_or(i32::MAX)),
            account_id: Set(line.account_id.into_inner()),
            third_party_id: Set(line.third_party_id.map(ThirdPartyId::into_inner)),
            description: Set(line.description.clone()),
            debit_amount: Set(line.debit),
            credit_amount: Set(line.credit),
            created_at: Set(now),
        }
        .insert(conn)
        .await
        .map_err(db_error)?;
        models.push(model);
    }
    Ok(models)
}

/// Re-reads a voucher's lines in ledger form.
async fn load_ledger_lines<C>(conn: &C, voucher_id: Uuid) -> Result<Vec<LedgerLine>, VoucherError>
where
    C: ConnectionTrait,
{
    let lines = voucher_lines::Entity::find()
        .filter(voucher_lines::Column::VoucherId.eq(voucher_id))
        .order_by_asc(voucher_lines::Column::LineNumber)
        .all(conn)
        .await
        .map_err(db_error)?;

    Ok(lines
        .into_iter()
        .map(|l| LedgerLine {
            line_number: u32::try_from(l.line_number).unwrap_or_default(),
            account_id: AccountId::from_uuid(l.account_id),
            third_party_id: l.third_party_id.map(ThirdPartyId::from_uuid),
            debit: l.debit_amount,
            credit: l.credit_amount,
            description: l.description,
        })
        .collect())
}

/// Writes the new status and the matching history row.
async fn apply_transition<C, M>(
    conn: &C,
    voucher: M,
    action: &VoucherAction,
) -> Result<vouchers::Model, VoucherError>
where
    C: ConnectionTrait,
    M: Into<vouchers::ActiveModel>,
{
    let mut active: vouchers::ActiveModel = voucher.into();
    active.status = Set(action.new_status().into());
    active.updated_at = Set(action.at().into());
    let voucher = active.update(conn).await.map_err(db_error)?;

    voucher_status_history::ActiveModel {
        id: Set(Uuid::now_v7()),
        voucher_id: Set(voucher.id),
        previous_status: Set(Some(action.previous_status().into())),
        new_status: Set(action.new_status().into()),
        actor_id: Set(action.actor_id().into_inner()),
        comment: Set(action.comment().map(str::to_string)),
        created_at: Set(action.at().into()),
    }
    .insert(conn)
    .await
    .map_err(db_error)?;

    Ok(voucher)
}

#[allow(clippy::needless_pass_by_value)]
fn db_error(err: DbErr) -> VoucherError {
    VoucherError::Database(err.to_string())
}
