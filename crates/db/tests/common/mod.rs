//! Shared fixtures for database integration tests.
//!
//! With `TEST_DATABASE_URL` set, each test migrates a fresh schema on that
//! PostgreSQL server. Otherwise it gets its own in-memory SQLite database
//! behind a single pooled connection, so a transaction holds the database
//! exclusively until it commits, the same serialization a PostgreSQL row
//! lock gives.

#![allow(dead_code)]

use std::path::Path;
use std::time::Duration;

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::{
    ActiveModelTrait, ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbBackend,
    EntityTrait, PaginatorTrait, Set,
};
use uuid::Uuid;

use ledgersync_core::treasury::RetryPolicy;
use ledgersync_core::voucher::VoucherLineInput;
use ledgersync_db::entities::{
    bank_accounts, chart_of_accounts, fiscal_periods, journal_entries,
    sea_orm_active_enums::FiscalPeriodStatus, third_parties, voucher_types,
};
use ledgersync_db::migration::{Migrator, MigratorTrait};
use ledgersync_db::repositories::{
    BankLedgerRepository, BankSyncRepository, CreateVoucherInput, OpenBankAccountInput, VoucherRepository,
};
use ledgersync_shared::types::AccountId;

/// PostgreSQL server for integration tests; SQLite when unset.
pub const TEST_DATABASE_URL_ENV: &str = "TEST_DATABASE_URL";

/// SQLite rendition of the PostgreSQL schema. Money columns are REAL:
/// `SeaORM` decodes SQLite decimals through `f64` whatever the column
/// affinity, and a TEXT value would not decode at all. Exact `NUMERIC(19,4)`
/// storage is covered when the suite runs against PostgreSQL.
const SQLITE_SCHEMA: &str = r"
CREATE TABLE chart_of_accounts (
    id BLOB PRIMARY KEY,
    code TEXT NOT NULL UNIQUE,
    name TEXT NOT NULL,
    is_active INTEGER NOT NULL,
    allows_entries INTEGER NOT NULL,
    created_at TEXT NOT NULL
);
CREATE TABLE third_parties (
    id BLOB PRIMARY KEY,
    name TEXT NOT NULL,
    tax_id TEXT,
    is_active INTEGER NOT NULL,
    created_at TEXT NOT NULL
);
CREATE TABLE fiscal_periods (
    id BLOB PRIMARY KEY,
    name TEXT NOT NULL,
    start_date TEXT NOT NULL,
    end_date TEXT NOT NULL,
    status TEXT NOT NULL,
    created_at TEXT NOT NULL
);
CREATE TABLE voucher_types (
    id BLOB PRIMARY KEY,
    code TEXT NOT NULL UNIQUE,
    name TEXT NOT NULL,
    current_consecutive INTEGER NOT NULL,
    is_active INTEGER NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);
CREATE TABLE journal_entries (
    id BLOB PRIMARY KEY,
    entry_number TEXT NOT NULL UNIQUE,
    entry_date TEXT NOT NULL,
    fiscal_period_id BLOB NOT NULL REFERENCES fiscal_periods(id),
    description TEXT,
    source_document_type TEXT NOT NULL,
    source_document_id BLOB NOT NULL,
    status TEXT NOT NULL,
    total_debit REAL NOT NULL,
    total_credit REAL NOT NULL,
    reverses_entry_id BLOB REFERENCES journal_entries(id),
    created_by BLOB NOT NULL,
    created_at TEXT NOT NULL
);
CREATE TABLE journal_entry_lines (
    id BLOB PRIMARY KEY,
    journal_entry_id BLOB NOT NULL REFERENCES journal_entries(id),
    order_number INTEGER NOT NULL,
    account_id BLOB NOT NULL REFERENCES chart_of_accounts(id),
    third_party_id BLOB REFERENCES third_parties(id),
    description TEXT,
    debit_amount REAL NOT NULL,
    credit_amount REAL NOT NULL,
    created_at TEXT NOT NULL
);
CREATE TABLE journal_sequences (
    year INTEGER PRIMARY KEY,
    last_value INTEGER NOT NULL,
    updated_at TEXT NOT NULL
);
CREATE TABLE vouchers (
    id BLOB PRIMARY KEY,
    voucher_type_id BLOB NOT NULL REFERENCES voucher_types(id),
    consecutive INTEGER NOT NULL,
    voucher_number TEXT NOT NULL UNIQUE,
    date TEXT NOT NULL,
    fiscal_period_id BLOB NOT NULL REFERENCES fiscal_periods(id),
    third_party_id BLOB REFERENCES third_parties(id),
    description TEXT,
    total_debit REAL NOT NULL,
    total_credit REAL NOT NULL,
    status TEXT NOT NULL,
    journal_entry_id BLOB REFERENCES journal_entries(id),
    created_by BLOB NOT NULL,
    approved_by BLOB,
    approved_at TEXT,
    cancelled_by BLOB,
    cancelled_at TEXT,
    cancellation_reason TEXT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    UNIQUE (voucher_type_id, consecutive)
);
CREATE TABLE voucher_lines (
    id BLOB PRIMARY KEY,
    voucher_id BLOB NOT NULL REFERENCES vouchers(id) ON DELETE CASCADE,
    line_number INTEGER NOT NULL,
    account_id BLOB NOT NULL REFERENCES chart_of_accounts(id),
    third_party_id BLOB REFERENCES third_parties(id),
    description TEXT,
    debit_amount REAL NOT NULL,
    credit_amount REAL NOT NULL,
    created_at TEXT NOT NULL
);
CREATE TABLE voucher_status_history (
    id BLOB PRIMARY KEY,
    voucher_id BLOB NOT NULL,
    previous_status TEXT,
    new_status TEXT NOT NULL,
    actor_id BLOB NOT NULL,
    comment TEXT,
    created_at TEXT NOT NULL
);
CREATE TABLE bank_accounts (
    id BLOB PRIMARY KEY,
    account_number TEXT NOT NULL UNIQUE,
    name TEXT NOT NULL,
    gl_account_id BLOB NOT NULL UNIQUE REFERENCES chart_of_accounts(id),
    currency TEXT NOT NULL,
    current_balance REAL NOT NULL,
    allow_overdraft INTEGER NOT NULL,
    is_active INTEGER NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);
CREATE TABLE bank_transactions (
    id BLOB PRIMARY KEY,
    bank_account_id BLOB NOT NULL REFERENCES bank_accounts(id),
    transaction_type TEXT NOT NULL,
    amount REAL NOT NULL,
    allow_overdraft INTEGER NOT NULL DEFAULT 0,
    running_balance REAL,
    status TEXT NOT NULL,
    transaction_date TEXT NOT NULL,
    description TEXT,
    reference TEXT,
    journal_entry_id BLOB REFERENCES journal_entries(id) ON DELETE RESTRICT,
    document_type TEXT,
    document_id BLOB,
    created_by BLOB NOT NULL,
    confirmed_by BLOB,
    confirmed_at TEXT,
    voided_by BLOB,
    voided_at TEXT,
    void_reason TEXT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);
CREATE TABLE bank_transaction_status_history (
    id BLOB PRIMARY KEY,
    bank_transaction_id BLOB NOT NULL REFERENCES bank_transactions(id),
    previous_status TEXT,
    new_status TEXT NOT NULL,
    actor_id BLOB NOT NULL,
    comment TEXT,
    created_at TEXT NOT NULL
);
";

/// Voucher type code used by the fixture.
pub const VOUCHER_TYPE_CODE: &str = "CE";

/// Master data and repositories for one test.
pub struct TestContext {
    pub db: DatabaseConnection,
    pub bank: BankLedgerRepository,
    pub sync: BankSyncRepository,
    pub vouchers: VoucherRepository,
    pub actor_id: Uuid,
    pub voucher_type_id: Uuid,
    pub fiscal_period_id: Uuid,
    pub third_party_id: Uuid,
    /// GL account bound to a bank account by [`TestContext::open_bank_account`].
    pub bank_gl_id: Uuid,
    /// Second bank GL account.
    pub second_bank_gl_id: Uuid,
    pub expense_gl_id: Uuid,
    pub revenue_gl_id: Uuid,
    /// Inactive GL account.
    pub inactive_gl_id: Uuid,
}

/// Builds a fresh database with master data and repositories.
pub async fn setup() -> TestContext {
    let db = match std::env::var(TEST_DATABASE_URL_ENV) {
        Ok(url) => postgres_schema(&url).await,
        Err(_) => {
            let db = sqlite(ConnectOptions::new("sqlite::memory:")).await;
            db.execute_unprepared(SQLITE_SCHEMA).await.unwrap();
            db
        }
    };
    seed(db).await
}

/// Like [`setup`], on an SQLite file that other connections can share.
///
/// Lock waits give up after `busy_timeout`.
pub async fn setup_sqlite_file(path: &Path, busy_timeout: Duration) -> TestContext {
    let db = sqlite(sqlite_file_options(path, busy_timeout)).await;
    db.execute_unprepared(SQLITE_SCHEMA).await.unwrap();
    seed(db).await
}

/// A second connection to a database built by [`setup_sqlite_file`].
pub async fn connect_sqlite_file(path: &Path) -> DatabaseConnection {
    sqlite(sqlite_file_options(path, Duration::from_secs(5))).await
}

/// Removes an SQLite file and its journal.
pub fn remove_sqlite_file(path: &Path) {
    let _ = std::fs::remove_file(path);
    let _ = std::fs::remove_file(path.with_extension("db-journal"));
}

fn sqlite_file_options(path: &Path, busy_timeout: Duration) -> ConnectOptions {
    let mut options = ConnectOptions::new(format!("sqlite://{}?mode=rwc", path.display()));
    options.map_sqlx_sqlite_opts(move |opts| opts.busy_timeout(busy_timeout));
    options
}

async fn sqlite(mut options: ConnectOptions) -> DatabaseConnection {
    options
        .max_connections(1)
        .min_connections(1)
        .acquire_timeout(Duration::from_secs(30))
        .sqlx_logging(false);
    Database::connect(options).await.unwrap()
}

/// Migrates a schema of its own on the PostgreSQL server at `url`.
async fn postgres_schema(url: &str) -> DatabaseConnection {
    let schema = format!("test_{}", Uuid::now_v7().simple());
    let admin = Database::connect(url).await.unwrap();
    admin
        .execute_unprepared(&format!("CREATE SCHEMA {schema}"))
        .await
        .unwrap();
    admin.close().await.unwrap();

    let mut options = ConnectOptions::new(url);
    options
        .max_connections(5)
        .acquire_timeout(Duration::from_secs(30))
        .set_schema_search_path(schema)
        .sqlx_logging(false);
    let db = Database::connect(options).await.unwrap();
    Migrator::up(&db, None).await.unwrap();
    db
}

async fn seed(db: DatabaseConnection) -> TestContext {
    let now: DateTimeWithTimeZone = Utc::now().into();

    let account = |code: &str, name: &str, is_active: bool| chart_of_accounts::ActiveModel {
        id: Set(Uuid::now_v7()),
        code: Set(code.to_string()),
        name: Set(name.to_string()),
        is_active: Set(is_active),
        allows_entries: Set(true),
        created_at: Set(now),
    };
    let bank_gl = account("1105", "Bank - Main", true).insert(&db).await.unwrap();
    let second_bank_gl = account("1110", "Bank - Payroll", true).insert(&db).await.unwrap();
    let expense_gl = account("5105", "Office expenses", true).insert(&db).await.unwrap();
    let revenue_gl = account("4135", "Sales", true).insert(&db).await.unwrap();
    let inactive_gl = account("5199", "Retired", false).insert(&db).await.unwrap();

    let third_party = third_parties::ActiveModel {
        id: Set(Uuid::now_v7()),
        name: Set("Acme Supplies".to_string()),
        tax_id: Set(Some("900123456".to_string())),
        is_active: Set(true),
        created_at: Set(now),
    }
    .insert(&db)
    .await
    .unwrap();

    let period = fiscal_periods::ActiveModel {
        id: Set(Uuid::now_v7()),
        name: Set("FY2026".to_string()),
        start_date: Set(date(2026, 1, 1)),
        end_date: Set(date(2026, 12, 31)),
        status: Set(FiscalPeriodStatus::Open),
        created_at: Set(now),
    }
    .insert(&db)
    .await
    .unwrap();

    let voucher_type = voucher_types::ActiveModel {
        id: Set(Uuid::now_v7()),
        code: Set(VOUCHER_TYPE_CODE.to_string()),
        name: Set("Cash receipt".to_string()),
        current_consecutive: Set(0),
        is_active: Set(true),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(&db)
    .await
    .unwrap();

    let bank = BankLedgerRepository::new(db.clone(), RetryPolicy::new(3, 0, 0), false);
    let sync = BankSyncRepository::new(db.clone(), bank.clone());
    let vouchers = VoucherRepository::new(db.clone(), bank.clone());

    TestContext {
        db,
        bank,
        sync,
        vouchers,
        actor_id: Uuid::now_v7(),
        voucher_type_id: voucher_type.id,
        fiscal_period_id: period.id,
        third_party_id: third_party.id,
        bank_gl_id: bank_gl.id,
        second_bank_gl_id: second_bank_gl.id,
        expense_gl_id: expense_gl.id,
        revenue_gl_id: revenue_gl.id,
        inactive_gl_id: inactive_gl.id,
    }
}

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

pub fn debit(account_id: Uuid, amount: Decimal) -> VoucherLineInput {
    VoucherLineInput {
        account_id: AccountId::from_uuid(account_id),
        third_party_id: None,
        debit: amount,
        credit: Decimal::ZERO,
        description: None,
    }
}

pub fn credit(account_id: Uuid, amount: Decimal) -> VoucherLineInput {
    VoucherLineInput {
        account_id: AccountId::from_uuid(account_id),
        third_party_id: None,
        debit: Decimal::ZERO,
        credit: amount,
        description: None,
    }
}

impl TestContext {
    /// Opens a bank account bound to `gl_account_id`.
    pub async fn open_bank_account(
        &self,
        gl_account_id: Uuid,
        opening_balance: Decimal,
    ) -> bank_accounts::Model {
        self.bank
            .open_account(OpenBankAccountInput {
                account_number: format!("ACC-{}", gl_account_id.simple()),
                name: "Operating account".to_string(),
                gl_account_id,
                currency: "USD".to_string(),
                opening_balance,
                opening_date: date(2026, 1, 2),
                allow_overdraft: false,
                created_by: self.actor_id,
            })
            .await
            .unwrap()
    }

    /// Current balance of a bank account.
    pub async fn balance(&self, bank_account_id: Uuid) -> Decimal {
        self.bank
            .get_bank_account(bank_account_id)
            .await
            .unwrap()
            .current_balance
    }

    pub fn voucher_input(&self, lines: Vec<VoucherLineInput>) -> CreateVoucherInput {
        CreateVoucherInput {
            voucher_type_id: self.voucher_type_id,
            date: date(2026, 3, 15),
            fiscal_period_id: self.fiscal_period_id,
            third_party_id: Some(self.third_party_id),
            description: Some("Customer payment".to_string()),
            lines,
            created_by: self.actor_id,
        }
    }

    /// Creates and validates a voucher, returning its ID.
    pub async fn validated_voucher(&self, lines: Vec<VoucherLineInput>) -> Uuid {
        let created = self
            .vouchers
            .create_voucher(self.voucher_input(lines))
            .await
            .unwrap();
        self.vouchers
            .validate_voucher(created.voucher.id, self.actor_id)
            .await
            .unwrap();
        created.voucher.id
    }

    /// True when the suite runs against PostgreSQL.
    pub fn is_postgres(&self) -> bool {
        self.db.get_database_backend() == DbBackend::Postgres
    }

    pub async fn journal_entry_count(&self) -> u64 {
        journal_entries::Entity::find().count(&self.db).await.unwrap()
    }
}
