//! `SeaORM` Entity for journal_entries table.
//!
//! Rows are inserted already posted and never updated.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "journal_entries")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub entry_number: String,
    pub entry_date: Date,
    pub fiscal_period_id: Uuid,
    pub description: Option<String>,
    pub source_document_type: String,
    pub source_document_id: Uuid,
    pub status: String,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub total_debit: Decimal,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub total_credit: Decimal,
    pub reverses_entry_id: Option<Uuid>,
    pub created_by: Uuid,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::journal_entry_lines::Entity")]
    JournalEntryLines,
    #[sea_orm(has_many = "super::bank_transactions::Entity")]
    BankTransactions,
}

impl Related<super::journal_entry_lines::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::JournalEntryLines.def()
    }
}

impl Related<super::bank_transactions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::BankTransactions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
