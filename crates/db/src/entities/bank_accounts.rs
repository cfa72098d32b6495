//! `SeaORM` Entity for bank_accounts table.
//!
//! `current_balance` only changes under a row lock held by the bank ledger.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "bank_accounts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub account_number: String,
    pub name: String,
    #[sea_orm(unique)]
    pub gl_account_id: Uuid,
    pub currency: String,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub current_balance: Decimal,
    pub allow_overdraft: bool,
    pub is_active: bool,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::chart_of_accounts::Entity",
        from = "Column::GlAccountId",
        to = "super::chart_of_accounts::Column::Id"
    )]
    ChartOfAccounts,
    #[sea_orm(has_many = "super::bank_transactions::Entity")]
    BankTransactions,
}

impl Related<super::chart_of_accounts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ChartOfAccounts.def()
    }
}

impl Related<super::bank_transactions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::BankTransactions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
