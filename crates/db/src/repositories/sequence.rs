//! Locked-row counters for voucher consecutives and journal entry numbers.
//!
//! Every function runs on the caller's transaction. The counter row stays
//! locked until that transaction ends, so concurrent callers are serialized
//! per voucher type and per calendar year. A rolled back caller leaves a gap.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QuerySelect,
    Set, sea_query::OnConflict,
};
use uuid::Uuid;

use ledgersync_core::sequence::{
    SequenceError, entry_number_pattern, format_entry_number, format_voucher_number,
    max_entry_sequence, next_value,
};

use crate::entities::{journal_entries, journal_sequences, voucher_types};

/// A consecutive drawn for a voucher type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoucherNumber {
    /// Per-type consecutive.
    pub consecutive: i64,
    /// `{type_code}-{consecutive:06}`.
    pub voucher_number: String,
}

/// Sequence generator over counter rows.
pub struct SequenceGenerator;

impl SequenceGenerator {
    /// Draws the next consecutive for a voucher type.
    ///
    /// Locks the voucher type row, increments `current_consecutive` and
    /// writes it back.
    ///
    /// # Errors
    ///
    /// Returns `SequenceError::CounterNotFound` if the voucher type row is
    /// missing; the caller must abort.
    pub async fn next_consecutive<C>(
        conn: &C,
        voucher_type_id: Uuid,
    ) -> Result<VoucherNumber, SequenceError>
    where
        C: ConnectionTrait,
    {
        let counter = voucher_types::Entity::find_by_id(voucher_type_id)
            .lock_exclusive()
            .one(conn)
            .await
            .map_err(db_error)?
            .ok_or_else(|| SequenceError::CounterNotFound(format!("voucher type {voucher_type_id}")))?;

        let consecutive = next_value(counter.current_consecutive, &counter.code)?;
        let voucher_number = format_voucher_number(&counter.code, consecutive);

        let mut active: voucher_types::ActiveModel = counter.into();
        active.current_consecutive = Set(consecutive);
        active.updated_at = Set(Utc::now().into());
        active.update(conn).await.map_err(db_error)?;

        Ok(VoucherNumber {
            consecutive,
            voucher_number,
        })
    }

    /// Draws the next journal entry number for a calendar year.
    ///
    /// The year's counter row is created on first use, seeded from the
    /// highest `JE-{year}-NNNNN` already stored.
    ///
    /// # Errors
    ///
    /// Returns `SequenceError::Database` if a statement fails.
    pub async fn next_entry_number<C>(conn: &C, year: i32) -> Result<String, SequenceError>
    where
        C: ConnectionTrait,
    {
        Self::ensure_year_counter(conn, year).await?;

        let counter = journal_sequences::Entity::find_by_id(year)
            .lock_exclusive()
            .one(conn)
            .await
            .map_err(db_error)?
            .ok_or_else(|| SequenceError::CounterNotFound(format!("journal entries {year}")))?;

        let sequence = next_value(counter.last_value, "journal entries")?;

        let mut active: journal_sequences::ActiveModel = counter.into();
        active.last_value = Set(sequence);
        active.updated_at = Set(Utc::now().into());
        active.update(conn).await.map_err(db_error)?;

        Ok(format_entry_number(year, sequence))
    }

    /// Creates the year's counter row if it does not exist yet.
    async fn ensure_year_counter<C>(conn: &C, year: i32) -> Result<(), SequenceError>
    where
        C: ConnectionTrait,
    {
        let exists = journal_sequences::Entity::find_by_id(year)
            .one(conn)
            .await
            .map_err(db_error)?
            .is_some();
        if exists {
            return Ok(());
        }

        let existing: Vec<String> = journal_entries::Entity::find()
            .select_only()
            .column(journal_entries::Column::EntryNumber)
            .filter(journal_entries::Column::EntryNumber.like(entry_number_pattern(year)))
            .into_tuple()
            .all(conn)
            .await
            .map_err(db_error)?;
        let seed = max_entry_sequence(existing.iter().map(String::as_str), year);

        let counter = journal_sequences::ActiveModel {
            year: Set(year),
            last_value: Set(seed),
            updated_at: Set(Utc::now().into()),
        };

        // A concurrent first use may have inserted the row already.
        journal_sequences::Entity::insert(counter)
            .on_conflict(
                OnConflict::column(journal_sequences::Column::Year)
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(conn)
            .await
            .map_err(db_error)?;

        Ok(())
    }
}

#[allow(clippy::needless_pass_by_value)]
fn db_error(err: DbErr) -> SequenceError {
    SequenceError::Database(err.to_string())
}
