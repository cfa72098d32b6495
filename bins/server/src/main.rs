//! LedgerSync API Server
//!
//! Main entry point for the voucher and bank ledger service.

use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ledgersync_api::{AppState, create_router};
use ledgersync_core::treasury::RetryPolicy;
use ledgersync_db::connect;
use ledgersync_shared::{AppConfig, JwtConfig, JwtService};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ledgersync=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::load()?;

    let db = connect(&config.database).await?;
    info!(
        max_connections = config.database.max_connections,
        statement_timeout_secs = config.database.statement_timeout_secs,
        "Connected to database"
    );

    let jwt_service = JwtService::new(JwtConfig {
        secret: config.jwt.secret.clone(),
        #[allow(clippy::cast_possible_wrap)]
        access_token_expires_minutes: (config.jwt.access_token_expiry_secs / 60) as i64,
    });

    let ledger = &config.bank_ledger;
    let policy = RetryPolicy::new(
        ledger.max_attempts,
        ledger.min_backoff_ms,
        ledger.max_backoff_ms,
    );
    info!(
        max_attempts = ledger.max_attempts,
        allow_overdraft = ledger.allow_overdraft,
        "Bank ledger configured"
    );

    let state = AppState::new(db, jwt_service, policy, ledger.allow_overdraft);
    let app = create_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
