//! String-backed enums stored in `VARCHAR` columns with `CHECK` constraints.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use ledgersync_core::treasury::{
    BankTransactionStatus as CoreBankStatus, BankTransactionType as CoreBankType,
};
use ledgersync_core::voucher::VoucherStatus as CoreVoucherStatus;

/// Voucher status column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VoucherStatus {
    /// Editable.
    #[sea_orm(string_value = "DRAFT")]
    Draft,
    /// Balanced checkpoint.
    #[sea_orm(string_value = "VALIDATED")]
    Validated,
    /// Posted.
    #[sea_orm(string_value = "APPROVED")]
    Approved,
    /// Terminal.
    #[sea_orm(string_value = "CANCELLED")]
    Cancelled,
}

impl From<VoucherStatus> for CoreVoucherStatus {
    fn from(status: VoucherStatus) -> Self {
        match status {
            VoucherStatus::Draft => Self::Draft,
            VoucherStatus::Validated => Self::Validated,
            VoucherStatus::Approved => Self::Approved,
            VoucherStatus::Cancelled => Self::Cancelled,
        }
    }
}

impl From<CoreVoucherStatus> for VoucherStatus {
    fn from(status: CoreVoucherStatus) -> Self {
        match status {
            CoreVoucherStatus::Draft => Self::Draft,
            CoreVoucherStatus::Validated => Self::Validated,
            CoreVoucherStatus::Approved => Self::Approved,
            CoreVoucherStatus::Cancelled => Self::Cancelled,
        }
    }
}

/// Bank transaction type column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "lowercase")]
pub enum BankTransactionType {
    /// Money in.
    #[sea_orm(string_value = "deposit")]
    Deposit,
    /// Money out.
    #[sea_orm(string_value = "withdrawal")]
    Withdrawal,
    /// Money out to another account.
    #[sea_orm(string_value = "transfer")]
    Transfer,
    /// Money out to a third party.
    #[sea_orm(string_value = "payment")]
    Payment,
    /// Money in from a third party.
    #[sea_orm(string_value = "receipt")]
    Receipt,
}

impl From<BankTransactionType> for CoreBankType {
    fn from(value: BankTransactionType) -> Self {
        match value {
            BankTransactionType::Deposit => Self::Deposit,
            BankTransactionType::Withdrawal => Self::Withdrawal,
            BankTransactionType::Transfer => Self::Transfer,
            BankTransactionType::Payment => Self::Payment,
            BankTransactionType::Receipt => Self::Receipt,
        }
    }
}

impl From<CoreBankType> for BankTransactionType {
    fn from(value: CoreBankType) -> Self {
        match value {
            CoreBankType::Deposit => Self::Deposit,
            CoreBankType::Withdrawal => Self::Withdrawal,
            CoreBankType::Transfer => Self::Transfer,
            CoreBankType::Payment => Self::Payment,
            CoreBankType::Receipt => Self::Receipt,
        }
    }
}

/// Bank transaction status column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "lowercase")]
pub enum BankTransactionStatus {
    /// Not yet in the balance.
    #[sea_orm(string_value = "pending")]
    Pending,
    /// In the balance.
    #[sea_orm(string_value = "cleared")]
    Cleared,
    /// Cancelled.
    #[sea_orm(string_value = "voided")]
    Voided,
}

impl From<BankTransactionStatus> for CoreBankStatus {
    fn from(value: BankTransactionStatus) -> Self {
        match value {
            BankTransactionStatus::Pending => Self::Pending,
            BankTransactionStatus::Cleared => Self::Cleared,
            BankTransactionStatus::Voided => Self::Voided,
        }
    }
}

impl From<CoreBankStatus> for BankTransactionStatus {
    fn from(value: CoreBankStatus) -> Self {
        match value {
            CoreBankStatus::Pending => Self::Pending,
            CoreBankStatus::Cleared => Self::Cleared,
            CoreBankStatus::Voided => Self::Voided,
        }
    }
}

/// Fiscal period status column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "lowercase")]
pub enum FiscalPeriodStatus {
    /// Accepts postings.
    #[sea_orm(string_value = "open")]
    Open,
    /// Closed to postings.
    #[sea_orm(string_value = "closed")]
    Closed,
}
