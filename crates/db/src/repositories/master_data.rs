//! Lookups against master data owned by other subsystems.
//!
//! Third parties, fiscal periods, voucher types and the chart of accounts are
//! read here for reference checks before any insert. Functions take the
//! caller's connection or transaction.

use std::collections::HashMap;

use chrono::NaiveDate;
use sea_orm::{ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter};
use uuid::Uuid;

use ledgersync_core::ledger::AccountInfo;

use crate::entities::{
    chart_of_accounts, fiscal_periods, sea_orm_active_enums::FiscalPeriodStatus, third_parties,
    voucher_types,
};

/// Read-only access to master data.
pub struct MasterDataRepository;

impl MasterDataRepository {
    /// Returns true if an active third party exists.
    pub async fn third_party_exists<C>(conn: &C, id: Uuid) -> Result<bool, DbErr>
    where
        C: ConnectionTrait,
    {
        Ok(Self::get_third_party(conn, id)
            .await?
            .is_some_and(|tp| tp.is_active))
    }

    /// Gets a third party by ID.
    pub async fn get_third_party<C>(
        conn: &C,
        id: Uuid,
    ) -> Result<Option<third_parties::Model>, DbErr>
    where
        C: ConnectionTrait,
    {
        third_parties::Entity::find_by_id(id).one(conn).await
    }

    /// Gets a fiscal period by ID.
    pub async fn get_fiscal_period<C>(
        conn: &C,
        id: Uuid,
    ) -> Result<Option<fiscal_periods::Model>, DbErr>
    where
        C: ConnectionTrait,
    {
        fiscal_periods::Entity::find_by_id(id).one(conn).await
    }

    /// Finds the open fiscal period containing a date.
    pub async fn open_fiscal_period_for_date<C>(
        conn: &C,
        date: NaiveDate,
    ) -> Result<Option<fiscal_periods::Model>, DbErr>
    where
        C: ConnectionTrait,
    {
        fiscal_periods::Entity::find()
            .filter(fiscal_periods::Column::StartDate.lte(date))
            .filter(fiscal_periods::Column::EndDate.gte(date))
            .filter(fiscal_periods::Column::Status.eq(FiscalPeriodStatus::Open))
            .one(conn)
            .await
    }

    /// Gets a voucher type by ID without locking its counter.
    pub async fn get_voucher_type<C>(
        conn: &C,
        id: Uuid,
    ) -> Result<Option<voucher_types::Model>, DbErr>
    where
        C: ConnectionTrait,
    {
        voucher_types::Entity::find_by_id(id).one(conn).await
    }

    /// Loads posting facts for a set of accounts in one query.
    ///
    /// Unknown IDs are absent from the map.
    pub async fn account_infos<C>(
        conn: &C,
        account_ids: &[Uuid],
    ) -> Result<HashMap<Uuid, AccountInfo>, DbErr>
    where
        C: ConnectionTrait,
    {
        if account_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let accounts = chart_of_accounts::Entity::find()
            .filter(chart_of_accounts::Column::Id.is_in(account_ids.iter().copied()))
            .all(conn)
            .await?;

        Ok(accounts
            .into_iter()
            .map(|a| {
                (
                    a.id,
                    AccountInfo {
                        id: a.id,
                        is_active: a.is_active,
                        allows_entries: a.allows_entries,
                    },
                )
            })
            .collect())
    }
}
