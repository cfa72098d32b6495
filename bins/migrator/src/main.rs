//! Schema migration runner.
//!
//! Usage:
//!   migrator up      - Apply pending migrations
//!   migrator down    - Roll back the last migration
//!   migrator status  - List applied and pending migrations
//!   migrator fresh   - Drop every table and migrate from scratch
//!
//! The connection string is read from `DATABASE_URL`.

use ledgersync_db::migration::Migrator;
use sea_orm_migration::prelude::*;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    cli::run_cli(Migrator).await;
}
