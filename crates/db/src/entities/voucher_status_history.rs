//! `SeaORM` Entity for voucher_status_history table. Append-only.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::VoucherStatus;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "voucher_status_history")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub voucher_id: Uuid,
    pub previous_status: Option<VoucherStatus>,
    pub new_status: VoucherStatus,
    pub actor_id: Uuid,
    pub comment: Option<String>,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::vouchers::Entity",
        from = "Column::VoucherId",
        to = "super::vouchers::Column::Id"
    )]
    Vouchers,
}

impl Related<super::vouchers::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Vouchers.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
