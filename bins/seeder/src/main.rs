//! Development data for LedgerSync.
//!
//! Seeds a small chart of accounts, a third party, an open fiscal period, a
//! voucher type and one bank account so vouchers can be posted right away.
//! Every record has a fixed id, so running the seeder twice is harmless.
//!
//! Usage: cargo run --bin seeder

use chrono::{Datelike, NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use uuid::Uuid;

use ledgersync_core::treasury::RetryPolicy;
use ledgersync_db::BankLedgerRepository;
use ledgersync_db::entities::{
    bank_accounts, chart_of_accounts, fiscal_periods, sea_orm_active_enums::FiscalPeriodStatus,
    third_parties, voucher_types,
};
use ledgersync_db::repositories::OpenBankAccountInput;
use ledgersync_shared::DatabaseConfig;

/// Actor recorded on seeded rows.
const SEED_ACTOR_ID: Uuid = Uuid::from_u128(0x0000_0000_0000_0000_0000_0000_0000_0001);

const BANK_GL_ID: Uuid = Uuid::from_u128(0x0000_0000_0000_0000_0000_0000_0000_1105);
const PAYROLL_BANK_GL_ID: Uuid = Uuid::from_u128(0x0000_0000_0000_0000_0000_0000_0000_1110);
const RECEIVABLES_GL_ID: Uuid = Uuid::from_u128(0x0000_0000_0000_0000_0000_0000_0000_1305);
const SALES_GL_ID: Uuid = Uuid::from_u128(0x0000_0000_0000_0000_0000_0000_0000_4135);
const EXPENSES_GL_ID: Uuid = Uuid::from_u128(0x0000_0000_0000_0000_0000_0000_0000_5105);
const THIRD_PARTY_ID: Uuid = Uuid::from_u128(0x0000_0000_0000_0000_0000_0000_0000_0a01);
const VOUCHER_TYPE_ID: Uuid = Uuid::from_u128(0x0000_0000_0000_0000_0000_0000_0000_0c01);

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let Ok(url) = std::env::var("DATABASE_URL") else {
        eprintln!("DATABASE_URL must be set in environment");
        std::process::exit(1);
    };

    println!("Connecting to database...");
    let config = DatabaseConfig {
        url,
        max_connections: 2,
        min_connections: 1,
        connect_timeout_secs: 8,
        statement_timeout_secs: 30,
    };
    let db = match ledgersync_db::connect(&config).await {
        Ok(db) => db,
        Err(e) => {
            eprintln!("Failed to connect to database: {e}");
            std::process::exit(1);
        }
    };

    println!("Seeding chart of accounts...");
    seed_chart_of_accounts(&db).await;

    println!("Seeding third party...");
    seed_third_party(&db).await;

    println!("Seeding fiscal period...");
    seed_fiscal_period(&db).await;

    println!("Seeding voucher type...");
    seed_voucher_type(&db).await;

    println!("Seeding bank account...");
    seed_bank_account(&db).await;

    println!("Seeding complete!");
}

async fn seed_chart_of_accounts(db: &DatabaseConnection) {
    let accounts = [
        (BANK_GL_ID, "1105", "Bank - Main"),
        (PAYROLL_BANK_GL_ID, "1110", "Bank - Payroll"),
        (RECEIVABLES_GL_ID, "1305", "Accounts receivable"),
        (SALES_GL_ID, "4135", "Sales"),
        (EXPENSES_GL_ID, "5105", "Office expenses"),
    ];

    for (id, code, name) in accounts {
        if exists(chart_of_accounts::Entity::find_by_id(id).one(db).await) {
            println!("  Account {code} already exists, skipping...");
            continue;
        }

        let account = chart_of_accounts::ActiveModel {
            id: Set(id),
            code: Set(code.to_string()),
            name: Set(name.to_string()),
            is_active: Set(true),
            allows_entries: Set(true),
            created_at: Set(Utc::now().into()),
        };

        match account.insert(db).await {
            Ok(_) => println!("  Created account {code} {name}"),
            Err(e) => eprintln!("Failed to insert account {code}: {e}"),
        }
    }
}

async fn seed_third_party(db: &DatabaseConnection) {
    if exists(third_parties::Entity::find_by_id(THIRD_PARTY_ID).one(db).await) {
        println!("  Third party already exists, skipping...");
        return;
    }

    let third_party = third_parties::ActiveModel {
        id: Set(THIRD_PARTY_ID),
        name: Set("Acme Supplies".to_string()),
        tax_id: Set(Some("900123456".to_string())),
        is_active: Set(true),
        created_at: Set(Utc::now().into()),
    };

    match third_party.insert(db).await {
        Ok(_) => println!("  Created third party: Acme Supplies"),
        Err(e) => eprintln!("Failed to insert third party: {e}"),
    }
}

/// Seeds an open period covering the current calendar year.
async fn seed_fiscal_period(db: &DatabaseConnection) {
    let year = Utc::now().year();
    let name = format!("FY{year}");

    let existing = fiscal_periods::Entity::find()
        .filter(fiscal_periods::Column::Name.eq(name.as_str()))
        .one(db)
        .await;
    if exists(existing) {
        println!("  Fiscal period {name} already exists, skipping...");
        return;
    }

    let (Some(start), Some(end)) = (
        NaiveDate::from_ymd_opt(year, 1, 1),
        NaiveDate::from_ymd_opt(year, 12, 31),
    ) else {
        eprintln!("Invalid fiscal year {year}");
        return;
    };

    let period = fiscal_periods::ActiveModel {
        id: Set(Uuid::now_v7()),
        name: Set(name.clone()),
        start_date: Set(start),
        end_date: Set(end),
        status: Set(FiscalPeriodStatus::Open),
        created_at: Set(Utc::now().into()),
    };

    match period.insert(db).await {
        Ok(_) => println!("  Created fiscal period {name} ({start} to {end})"),
        Err(e) => eprintln!("Failed to insert fiscal period: {e}"),
    }
}

async fn seed_voucher_type(db: &DatabaseConnection) {
    if exists(voucher_types::Entity::find_by_id(VOUCHER_TYPE_ID).one(db).await) {
        println!("  Voucher type already exists, skipping...");
        return;
    }

    let voucher_type = voucher_types::ActiveModel {
        id: Set(VOUCHER_TYPE_ID),
        code: Set("CE".to_string()),
        name: Set("Cash receipt".to_string()),
        current_consecutive: Set(0),
        is_active: Set(true),
        created_at: Set(Utc::now().into()),
        updated_at: Set(Utc::now().into()),
    };

    match voucher_type.insert(db).await {
        Ok(_) => println!("  Created voucher type CE"),
        Err(e) => eprintln!("Failed to insert voucher type: {e}"),
    }
}

/// Opens the main bank account through the ledger so the opening balance
/// lands as a cleared deposit.
async fn seed_bank_account(db: &DatabaseConnection) {
    let existing = bank_accounts::Entity::find()
        .filter(bank_accounts::Column::GlAccountId.eq(BANK_GL_ID))
        .one(db)
        .await;
    if exists(existing) {
        println!("  Bank account already exists, skipping...");
        return;
    }

    let ledger = BankLedgerRepository::new(db.clone(), RetryPolicy::no_retry(), false);
    let result = ledger
        .open_account(OpenBankAccountInput {
            account_number: "001-234567-89".to_string(),
            name: "Main operating account".to_string(),
            gl_account_id: BANK_GL_ID,
            currency: "USD".to_string(),
            opening_balance: Decimal::new(1_000_000, 2),
            opening_date: Utc::now().date_naive(),
            allow_overdraft: false,
            created_by: SEED_ACTOR_ID,
        })
        .await;

    match result {
        Ok(account) => println!(
            "  Created bank account {} with balance {}",
            account.account_number, account.current_balance
        ),
        Err(e) => eprintln!("Failed to open bank account: {e}"),
    }
}

fn exists<T>(lookup: Result<Option<T>, sea_orm::DbErr>) -> bool {
    lookup.ok().flatten().is_some()
}
