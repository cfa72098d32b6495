//! Sync validation between journal entries and bank transactions.

mod common;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use uuid::Uuid;

use common::{credit, date, debit, setup};
use ledgersync_core::treasury::{BankTransactionType, SyncDiscrepancy};
use ledgersync_core::voucher::VoucherError;

#[tokio::test]
async fn test_manual_void_shows_up_as_missing_transaction() {
    let ctx = setup().await;
    let bank = ctx.open_bank_account(ctx.bank_gl_id, Decimal::ZERO).await;
    let voucher_id = ctx
        .validated_voucher(vec![
            debit(ctx.bank_gl_id, dec!(250)),
            credit(ctx.revenue_gl_id, dec!(250)),
        ])
        .await;
    let approval = ctx
        .vouchers
        .approve_voucher(voucher_id, ctx.actor_id)
        .await
        .unwrap();

    let before = ctx.sync.validate_sync(approval.journal_entry_id).await.unwrap();
    assert!(before.is_synced);
    assert_eq!(before.expected_count, 1);
    assert_eq!(before.actual_count, 1);

    ctx.bank
        .void_bank_transaction(approval.bank_transaction_ids[0], ctx.actor_id, "Deposit bounced")
        .await
        .unwrap();

    let after = ctx.sync.validate_sync(approval.journal_entry_id).await.unwrap();
    assert!(!after.is_synced);
    assert_eq!(after.actual_count, 0);
    assert_eq!(after.voided_count, 1);
    assert!(after.discrepancies.contains(&SyncDiscrepancy::MissingTransaction {
        order_number: 1,
        bank_account_id: bank.id,
        transaction_type: BankTransactionType::Deposit,
        amount: dec!(250),
    }));
    assert!(after.discrepancies.contains(&SyncDiscrepancy::CountMismatch {
        expected: 1,
        actual: 0,
    }));
}

#[tokio::test]
async fn test_entry_without_bank_lines_is_synced() {
    let ctx = setup().await;
    ctx.open_bank_account(ctx.bank_gl_id, Decimal::ZERO).await;
    let voucher_id = ctx
        .validated_voucher(vec![
            debit(ctx.expense_gl_id, dec!(75)),
            credit(ctx.revenue_gl_id, dec!(75)),
        ])
        .await;
    let approval = ctx
        .vouchers
        .approve_voucher(voucher_id, ctx.actor_id)
        .await
        .unwrap();

    let report = ctx.sync.validate_sync(approval.journal_entry_id).await.unwrap();

    assert!(report.is_synced);
    assert_eq!(report.expected_count, 0);
    assert_eq!(report.actual_count, 0);
}

#[tokio::test]
async fn test_validate_sync_unknown_entry() {
    let ctx = setup().await;
    let missing = Uuid::now_v7();

    let result = ctx.sync.validate_sync(missing).await;

    assert!(matches!(result, Err(VoucherError::JournalEntryNotFound(id)) if id == missing));
}

#[tokio::test]
async fn test_entry_numbers_restart_each_year() {
    let ctx = setup().await;
    let lines = || {
        vec![
            debit(ctx.expense_gl_id, dec!(10)),
            credit(ctx.revenue_gl_id, dec!(10)),
        ]
    };

    let this_year = ctx.validated_voucher(lines()).await;
    let mut next_year_input = ctx.voucher_input(lines());
    next_year_input.date = date(2027, 1, 5);
    let next_year = ctx
        .vouchers
        .create_voucher(next_year_input)
        .await
        .unwrap()
        .voucher
        .id;
    ctx.vouchers
        .validate_voucher(next_year, ctx.actor_id)
        .await
        .unwrap();

    let a = ctx
        .vouchers
        .approve_voucher(this_year, ctx.actor_id)
        .await
        .unwrap();
    let b = ctx
        .vouchers
        .approve_voucher(next_year, ctx.actor_id)
        .await
        .unwrap();

    assert_eq!(a.entry_number, "JE-2026-00001");
    assert_eq!(b.entry_number, "JE-2027-00001");
}
