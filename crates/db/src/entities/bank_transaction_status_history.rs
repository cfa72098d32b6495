//! `SeaORM` Entity for bank_transaction_status_history table. Append-only.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::BankTransactionStatus;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "bank_transaction_status_history")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub bank_transaction_id: Uuid,
    pub previous_status: Option<BankTransactionStatus>,
    pub new_status: BankTransactionStatus,
    pub actor_id: Uuid,
    pub comment: Option<String>,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::bank_transactions::Entity",
        from = "Column::BankTransactionId",
        to = "super::bank_transactions::Column::Id"
    )]
    BankTransactions,
}

impl Related<super::bank_transactions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::BankTransactions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
