//! `SeaORM` Entity for journal_entry_lines table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "journal_entry_lines")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub journal_entry_id: Uuid,
    pub order_number: i32,
    pub account_id: Uuid,
    pub third_party_id: Option<Uuid>,
    pub description: Option<String>,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub debit_amount: Decimal,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub credit_amount: Decimal,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::journal_entries::Entity",
        from = "Column::JournalEntryId",
        to = "super::journal_entries::Column::Id"
    )]
    JournalEntries,
}

impl Related<super::journal_entries::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::JournalEntries.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
