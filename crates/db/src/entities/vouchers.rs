//! `SeaORM` Entity for vouchers table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::VoucherStatus;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "vouchers")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub voucher_type_id: Uuid,
    pub consecutive: i64,
    #[sea_orm(unique)]
    pub voucher_number: String,
    pub date: Date,
    pub fiscal_period_id: Uuid,
    pub third_party_id: Option<Uuid>,
    pub description: Option<String>,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub total_debit: Decimal,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub total_credit: Decimal,
    pub status: VoucherStatus,
    pub journal_entry_id: Option<Uuid>,
    pub created_by: Uuid,
    pub approved_by: Option<Uuid>,
    pub approved_at: Option<DateTimeWithTimeZone>,
    pub cancelled_by: Option<Uuid>,
    pub cancelled_at: Option<DateTimeWithTimeZone>,
    pub cancellation_reason: Option<String>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::voucher_types::Entity",
        from = "Column::VoucherTypeId",
        to = "super::voucher_types::Column::Id"
    )]
    VoucherTypes,
    #[sea_orm(
        belongs_to = "super::fiscal_periods::Entity",
        from = "Column::FiscalPeriodId",
        to = "super::fiscal_periods::Column::Id"
    )]
    FiscalPeriods,
    #[sea_orm(has_many = "super::voucher_lines::Entity")]
    VoucherLines,
    #[sea_orm(has_many = "super::voucher_status_history::Entity")]
    VoucherStatusHistory,
}

impl Related<super::voucher_types::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::VoucherTypes.def()
    }
}

impl Related<super::fiscal_periods::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::FiscalPeriods.def()
    }
}

impl Related<super::voucher_lines::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::VoucherLines.def()
    }
}

impl Related<super::voucher_status_history::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::VoucherStatusHistory.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
