//! `SeaORM` Entity for voucher_lines table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "voucher_lines")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub voucher_id: Uuid,
    pub line_number: i32,
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
        belongs_to = "super::vouchers::Entity",
        from = "Column::VoucherId",
        to = "super::vouchers::Column::Id",
        on_delete = "Cascade"
    )]
    Vouchers,
    #[sea_orm(
        belongs_to = "super::chart_of_accounts::Entity",
        from = "Column::AccountId",
        to = "super::chart_of_accounts::Column::Id"
    )]
    ChartOfAccounts,
}

impl Related<super::vouchers::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Vouchers.def()
    }
}

impl Related<super::chart_of_accounts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ChartOfAccounts.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
