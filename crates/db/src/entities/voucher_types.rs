//! `SeaORM` Entity for voucher_types table.
//!
//! `current_consecutive` is the per-type counter row locked while numbering.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "voucher_types")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub code: String,
    pub name: String,
    pub current_consecutive: i64,
    pub is_active: bool,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::vouchers::Entity")]
    Vouchers,
}

impl Related<super::vouchers::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Vouchers.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
