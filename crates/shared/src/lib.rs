//! Shared types, errors, and configuration for LedgerSync.
//!
//! This crate provides common types used across all other crates:
//! - Typed IDs for type-safe entity references
//! - Pagination types for list endpoints
//! - Application-wide error taxonomy
//! - Configuration management
//! - Actor identity carried in JWT claims

pub mod auth;
pub mod config;
pub mod error;
pub mod jwt;
pub mod types;

pub use auth::Claims;
pub use config::{AppConfig, BankLedgerConfig, DatabaseConfig, JwtSettings, ServerConfig};
pub use error::{AppError, AppResult};
pub use jwt::{JwtConfig, JwtError, JwtService};
