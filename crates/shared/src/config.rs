//! Application configuration management.

use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
    /// JWT configuration.
    pub jwt: JwtSettings,
    /// Bank transaction ledger configuration.
    #[serde(default)]
    pub bank_ledger: BankLedgerConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Database connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
    /// Seconds to wait when acquiring a connection.
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
    /// Server-side statement timeout in seconds. An approval that exceeds it
    /// rolls back as a whole.
    #[serde(default = "default_statement_timeout")]
    pub statement_timeout_secs: u64,
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

fn default_connect_timeout() -> u64 {
    8
}

fn default_statement_timeout() -> u64 {
    30
}

/// JWT configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct JwtSettings {
    /// Secret key for signing tokens.
    pub secret: String,
    /// Access token expiration in seconds.
    #[serde(default = "default_access_token_expiry")]
    pub access_token_expiry_secs: u64,
}

fn default_access_token_expiry() -> u64 {
    900 // 15 minutes
}

/// Bank transaction ledger configuration.
///
/// Controls the bounded retry applied when a balance mutation hits a
/// lock-wait timeout or deadlock.
#[derive(Debug, Clone, Deserialize)]
pub struct BankLedgerConfig {
    /// Total attempts, including the first one.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Lower bound of the randomized backoff between attempts.
    #[serde(default = "default_min_backoff_ms")]
    pub min_backoff_ms: u64,
    /// Upper bound of the randomized backoff between attempts.
    #[serde(default = "default_max_backoff_ms")]
    pub max_backoff_ms: u64,
    /// Allow balances to go negative for every account.
    #[serde(default)]
    pub allow_overdraft: bool,
}

impl Default for BankLedgerConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            min_backoff_ms: default_min_backoff_ms(),
            max_backoff_ms: default_max_backoff_ms(),
            allow_overdraft: false,
        }
    }
}

fn default_max_attempts() -> u32 {
    3
}

fn default_min_backoff_ms() -> u64 {
    100
}

fn default_max_backoff_ms() -> u64 {
    500
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("LEDGERSYNC").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}
