//! Database operations for the Cartwise `PostgreSQL` database.
//!
//! # Schema: `cartwise`
//!
//! ## Tables
//!
//! - `app_user` - Shopper accounts (email + Argon2id password hash)
//! - `chat_record` - Append-only chatbot exchanges, newest-first index per user
//! - `tower_sessions.session` - Session storage (created by the session store migration)
//!
//! # Stores
//!
//! Handlers talk to the [`ChatLog`] and [`AccountStore`] traits. The
//! `Pg*` types are the production implementations; the `Memory*` types keep
//! everything in process for tests and local experiments.
//!
//! # Migrations
//!
//! Migrations are stored in `crates/server/migrations/` and run via:
//! ```bash
//! cargo run -p cartwise-cli -- migrate
//! ```

pub mod accounts;
pub mod chat_log;
pub mod memory;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use accounts::{AccountStore, PgAccountStore};
pub use chat_log::{ChatLog, PgChatLog};
pub use memory::{MemoryAccountStore, MemoryChatLog};

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Constraint violation (e.g., unique email).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

/// Escape `%`, `_` and `\` so user input matches literally inside `ILIKE`.
#[must_use]
pub fn escape_like(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
