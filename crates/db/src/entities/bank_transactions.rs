//! `SeaORM` Entity for bank_transactions table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::{BankTransactionStatus, BankTransactionType};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "bank_transactions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub bank_account_id: Uuid,
    pub transaction_type: BankTransactionType,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub amount: Decimal,
    /// Overdraft permitted for this transaction when it clears.
    pub allow_overdraft: bool,
    /// Balance after this transaction; `None` until cleared.
    #[sea_orm(column_type = "Decimal(Some((19, 4)))", nullable)]
    pub running_balance: Option<Decimal>,
    pub status: BankTransactionStatus,
    pub transaction_date: Date,
    pub description: Option<String>,
    pub reference: Option<String>,
    pub journal_entry_id: Option<Uuid>,
    pub document_type: Option<String>,
    pub document_id: Option<Uuid>,
    pub created_by: Uuid,
    pub confirmed_by: Option<Uuid>,
    pub confirmed_at: Option<DateTimeWithTimeZone>,
    pub voided_by: Option<Uuid>,
    pub voided_at: Option<DateTimeWithTimeZone>,
    pub void_reason: Option<String>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::bank_accounts::Entity",
        from = "Column::BankAccountId",
        to = "super::bank_accounts::Column::Id"
    )]
    BankAccounts,
    #[sea_orm(
        belongs_to = "super::journal_entries::Entity",
        from = "Column::JournalEntryId",
        to = "super::journal_entries::Column::Id",
        on_delete = "Restrict"
    )]
    JournalEntries,
}

impl Related<super::bank_accounts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::BankAccounts.def()
    }
}

impl Related<super::journal_entries::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::JournalEntries.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
