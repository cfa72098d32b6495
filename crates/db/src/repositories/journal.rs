//! Journal entry repository.
//!
//! Entries are inserted already posted and never updated. A cancellation
//! posts a second entry with every side swapped.

use chrono::{Datelike, NaiveDate, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, QueryOrder, Set,
};
use serde::Serialize;
use uuid::Uuid;

use ledgersync_core::ledger::{LedgerLine, reversal_description, reversing_lines, validate_lines};
use ledgersync_core::voucher::VoucherError;
use ledgersync_shared::types::{AccountId, JournalEntryId, ThirdPartyId};

use crate::entities::{journal_entries, journal_entry_lines};

use super::sequence::SequenceGenerator;

/// Source document type for entries posted from vouchers.
pub const SOURCE_VOUCHER: &str = "voucher";

/// Status of every stored journal entry.
pub const STATUS_POSTED: &str = "posted";

/// Journal entry header with lines ordered by `order_number`.
#[derive(Debug, Clone, Serialize)]
pub struct JournalEntryWithLines {
    /// Entry header.
    pub entry: journal_entries::Model,
    /// Entry lines.
    pub lines: Vec<journal_entry_lines::Model>,
}

impl JournalEntryWithLines {
    /// Lines in ledger form.
    #[must_use]
    pub fn ledger_lines(&self) -> Vec<LedgerLine> {
        self.lines.iter().map(to_ledger_line).collect()
    }
}

/// Input for posting a journal entry.
#[derive(Debug, Clone)]
pub struct PostJournalEntryInput<'a> {
    /// Entry date; its year scopes the entry number.
    pub entry_date: NaiveDate,
    /// Fiscal period the entry belongs to.
    pub fiscal_period_id: Uuid,
    /// Optional description.
    pub description: Option<String>,
    /// Source voucher.
    pub source_document_id: Uuid,
    /// Lines in order.
    pub lines: &'a [LedgerLine],
    /// Entry this one reverses, if any.
    pub reverses_entry_id: Option<Uuid>,
    /// Posting actor.
    pub created_by: Uuid,
}

/// Journal entry repository.
#[derive(Debug, Clone)]
pub struct JournalRepository {
    db: DatabaseConnection,
}

impl JournalRepository {
    /// Creates a new journal repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Gets a journal entry with its lines.
    ///
    /// # Errors
    ///
    /// Returns `VoucherError::JournalEntryNotFound` if it does not exist.
    pub async fn get_journal_entry(&self, id: Uuid) -> Result<JournalEntryWithLines, VoucherError> {
        Self::find_with_lines(&self.db, id)
            .await
            .map_err(db_error)?
            .ok_or(VoucherError::JournalEntryNotFound(id))
    }

    /// Loads an entry and its lines on the given connection.
    pub async fn find_with_lines<C>(
        conn: &C,
        id: Uuid,
    ) -> Result<Option<JournalEntryWithLines>, DbErr>
    where
        C: ConnectionTrait,
    {
        let Some(entry) = journal_entries::Entity::find_by_id(id).one(conn).await? else {
            return Ok(None);
        };

        let lines = journal_entry_lines::Entity::find()
            .filter(journal_entry_lines::Column::JournalEntryId.eq(id))
            .order_by_asc(journal_entry_lines::Column::OrderNumber)
            .all(conn)
            .await?;

        Ok(Some(JournalEntryWithLines { entry, lines }))
    }

    /// Validates and inserts a posted entry.
    ///
    /// The balance check runs before the entry number is drawn, so an
    /// unbalanced set of lines writes nothing.
    ///
    /// # Errors
    ///
    /// Returns `VoucherError::Ledger` for malformed or unbalanced lines,
    /// `VoucherError::Sequence` if numbering fails.
    pub async fn post_entry<C>(
        conn: &C,
        input: PostJournalEntryInput<'_>,
    ) -> Result<JournalEntryWithLines, VoucherError>
    where
        C: ConnectionTrait,
    {
        let totals = validate_lines(input.lines)?;
        let entry_number =
            SequenceGenerator::next_entry_number(conn, input.entry_date.year()).await?;

        let now = Utc::now().into();
        let entry_id = Uuid::now_v7();

        let entry = journal_entries::ActiveModel {
            id: Set(entry_id),
            entry_number: Set(entry_number),
            entry_date: Set(input.entry_date),
            fiscal_period_id: Set(input.fiscal_period_id),
            description: Set(input.description),
            source_document_type: Set(SOURCE_VOUCHER.to_string()),
            source_document_id: Set(input.source_document_id),
            status: Set(STATUS_POSTED.to_string()),
            total_debit: Set(totals.debit_total),
            total_credit: Set(totals.credit_total),
            reverses_entry_id: Set(input.reverses_entry_id),
            created_by: Set(input.created_by),
            created_at: Set(now),
        }
        .insert(conn)
        .await
        .map_err(db_error)?;

        let mut lines = Vec::with_capacity(input.lines.len());
        for line in input.lines {
            let model = journal_entry_lines::ActiveModel {
                id: Set(Uuid::now_v7()),
                journal_entry_id: Set(entry_id),
                order_number: Set(i32::try_from(line.line_number).unwrap_or(i32::MAX)),
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
            lines.push(model);
        }

        Ok(JournalEntryWithLines { entry, lines })
    }

    /// Posts the reversing entry for `original`.
    ///
    /// The original entry is left untouched.
    ///
    /// # Errors
    ///
    /// Same as [`Self::post_entry`].
    pub async fn post_reversal<C>(
        conn: &C,
        original: &JournalEntryWithLines,
        entry_date: NaiveDate,
        fiscal_period_id: Uuid,
        reason: &str,
        actor_id: Uuid,
    ) -> Result<JournalEntryWithLines, VoucherError>
    where
        C: ConnectionTrait,
    {
        let lines = reversing_lines(&original.ledger_lines());
        let description = reversal_description(
            JournalEntryId::from_uuid(original.entry.id),
            &original.entry.entry_number,
            reason,
        );

        Self::post_entry(
            conn,
            PostJournalEntryInput {
                entry_date,
                fiscal_period_id,
                description: Some(description),
                source_document_id: original.entry.source_document_id,
                lines: &lines,
                reverses_entry_id: Some(original.entry.id),
                created_by: actor_id,
            },
        )
        .await
    }
}

/// Converts a stored line to ledger form.
pub(crate) fn to_ledger_line(model: &journal_entry_lines::Model) -> LedgerLine {
    LedgerLine {
        line_number: u32::try_from(model.order_number).unwrap_or_default(),
        account_id: AccountId::from_uuid(model.account_id),
        third_party_id: model.third_party_id.map(ThirdPartyId::from_uuid),
        debit: model.debit_amount,
        credit: model.credit_amount,
        description: model.description.clone(),
    }
}

#[allow(clippy::needless_pass_by_value)]
fn db_error(err: DbErr) -> VoucherError {
    VoucherError::Database(err.to_string())
}
