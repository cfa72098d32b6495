//! Database layer with `SeaORM` entities and repositories.
//!
//! This crate provides:
//! - `SeaORM` entity definitions
//! - Repositories that run each public operation in one database transaction
//! - Lock conflict detection and bounded retry for bank balance writes
//! - Database migrations

pub mod entities;
pub mod lock;
pub mod migration;
pub mod repositories;

pub use repositories::{
    BankLedgerRepository, BankSyncRepository, JournalRepository, MasterDataRepository,
    SequenceGenerator, VoucherRepository,
};

use std::time::Duration;

use ledgersync_shared::DatabaseConfig;
use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};

/// Establishes a connection pool using the configured limits.
///
/// # Errors
///
/// Returns an error if the connection cannot be established.
pub async fn connect(config: &DatabaseConfig) -> Result<DatabaseConnection, DbErr> {
    let url = with_statement_timeout(&config.url, config.statement_timeout_secs);

    let mut options = ConnectOptions::new(url);
    options
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
        .acquire_timeout(Duration::from_secs(config.connect_timeout_secs))
        .sqlx_logging(true);

    Database::connect(options).await
}

/// Adds a server-side `statement_timeout` to PostgreSQL URLs.
///
/// A stuck approval then rolls back as a whole instead of holding its row
/// locks. Other URLs, or URLs that already set `options`, are returned as is.
fn with_statement_timeout(url: &str, timeout_secs: u64) -> String {
    let is_postgres = url.starts_with("postgres://") || url.starts_with("postgresql://");
    if !is_postgres || timeout_secs == 0 || url.contains("options=") {
        return url.to_string();
    }

    let separator = if url.contains('?') { '&' } else { '?' };
    let timeout_ms = timeout_secs.saturating_mul(1000);
    format!("{url}{separator}options=-c%20statement_timeout%3D{timeout_ms}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_statement_timeout_appended() {
        assert_eq!(
            with_statement_timeout("postgres://localhost/ledgersync", 30),
            "postgres://localhost/ledgersync?options=-c%20statement_timeout%3D30000"
        );
        assert_eq!(
            with_statement_timeout("postgres://localhost/ledgersync?sslmode=disable", 5),
            "postgres://localhost/ledgersync?sslmode=disable&options=-c%20statement_timeout%3D5000"
        );
    }

    #[test]
    fn test_statement_timeout_skipped() {
        assert_eq!(with_statement_timeout("sqlite::memory:", 30), "sqlite::memory:");
        assert_eq!(
            with_statement_timeout("postgres://localhost/db", 0),
            "postgres://localhost/db"
        );
        let preset = "postgres://localhost/db?options=-c%20search_path%3Dpublic";
        assert_eq!(with_statement_timeout(preset, 30), preset);
    }
}
