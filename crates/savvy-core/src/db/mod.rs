//! Database access layer with connection pooling and migrations
//!
//! This module is organized by domain:
//! - `financial` - Manual income/expense entries
//! - `leaderboard` - Score submissions and ranking
//! - `profiles` - User goals and budgets
//! - `bank_links` - Stored aggregator access tokens
//! - `audit` - Audit log

use std::sync::Arc;

use chrono::{DateTime, Utc};
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use serde::Serialize;
use tempfile::TempDir;
use tracing::info;

use crate::error::{Error, Result};

mod audit;
mod bank_links;
mod financial;
mod leaderboard;
mod profiles;

pub type DbPool = Pool<SqliteConnectionManager>;
pub type DbConn = PooledConnection<SqliteConnectionManager>;

/// Environment variable for database encryption key
pub const DB_KEY_ENV: &str = "SAVVY_DB_KEY";

/// Derive an encryption key from a passphrase using Argon2
///
/// Uses a fixed application salt so the same passphrase always produces the same key
/// wherever the database file lives.
fn derive_key(passphrase: &str) -> Result<String> {
    use argon2::{password_hash::SaltString, Argon2, PasswordHasher};

    // Changing this invalidates every existing encrypted database
    const APP_SALT: &[u8; 16] = b"savvy-salt-v1-00";

    let salt = SaltString::encode_b64(APP_SALT)
        .map_err(|e| Error::Encryption(format!("Failed to create salt: {}", e)))?;

    let hash = Argon2::default()
        .hash_password(passphrase.as_bytes(), &salt)
        .map_err(|e| Error::Encryption(format!("Failed to derive key: {}", e)))?;

    let output = hash
        .hash
        .ok_or_else(|| Error::Encryption("No hash output".to_string()))?;
    Ok(hex::encode(output.as_bytes()))
}

/// Parse a SQLite datetime string into a DateTime<Utc>
pub(crate) fn parse_datetime(s: &str) -> DateTime<Utc> {
    // SQLite CURRENT_TIMESTAMP format
    chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
        .map(|dt| dt.and_utc())
        .unwrap_or_else(|_| Utc::now())
}

/// What `Database::reset` clears
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetScope {
    /// Leaderboard entries only
    Leaderboard,
    /// Manual financial entries only
    FinancialData,
    /// Every table, including profiles, bank links and the audit log
    All,
}

impl ResetScope {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Leaderboard => "leaderboard",
            Self::FinancialData => "financial-data",
            Self::All => "all",
        }
    }
}

impl std::str::FromStr for ResetScope {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "leaderboard" => Ok(Self::Leaderboard),
            "financial-data" => Ok(Self::FinancialData),
            "all" => Ok(Self::All),
            _ => Err(format!("Unknown reset scope: {}", s)),
        }
    }
}

/// Database wrapper with connection pooling
#[derive(Clone)]
pub struct Database {
    pool: DbPool,
    db_path: String,
    /// Scratch directory owning a throwaway database; removed with the last clone
    _scratch: Option<Arc<TempDir>>,
}

impl Database {
    /// Open an encrypted database
    ///
    /// Requires the `SAVVY_DB_KEY` environment variable. The SQLCipher key is
    /// derived from that passphrase with Argon2. Use `new_unencrypted()` for
    /// development databases.
    pub fn new(path: &str) -> Result<Self> {
        match std::env::var(DB_KEY_ENV).ok() {
            Some(key) => Self::new_with_key(path, Some(&key)),
            None => Err(Error::Encryption(format!(
                "Database encryption required. Set {} environment variable with your passphrase, \
                or use --no-encrypt for unencrypted databases (not recommended for production).",
                DB_KEY_ENV
            ))),
        }
    }

    /// Open a database without encryption
    pub fn new_unencrypted(path: &str) -> Result<Self> {
        Self::new_with_key(path, None)
    }

    /// Open a database with an explicit passphrase (or none)
    pub fn new_with_key(path: &str, passphrase: Option<&str>) -> Result<Self> {
        let manager = SqliteConnectionManager::file(path);

        let pool = match passphrase {
            Some(pass) => {
                let key = derive_key(pass)?;
                let key_pragma = format!("PRAGMA key = 'x\"{}\"';", key);

                // Every pooled connection must be keyed before first use
                let manager = manager.with_init(move |conn| {
                    conn.execute_batch(&key_pragma)?;
                    Ok(())
                });
                Pool::builder().max_size(10).build(manager)?
            }
            None => Pool::builder().max_size(10).build(manager)?,
        };

        let db = Self {
            pool,
            db_path: path.to_string(),
            _scratch: None,
        };
        db.run_migrations()?;

        Ok(db)
    }

    /// Path to the database file
    pub fn path(&self) -> &str {
        &self.db_path
    }

    /// Create a throwaway database (for testing)
    ///
    /// Backed by a file in a scratch directory since SQLCipher does not share
    /// `:memory:` databases across pooled connections. The directory is
    /// deleted when the last clone of the handle is dropped.
    pub fn in_memory() -> Result<Self> {
        let scratch = tempfile::Builder::new().prefix("savvy_test_").tempdir()?;
        let path = scratch.path().join("savvy.db").to_string_lossy().into_owned();

        let mut db = Self::new_unencrypted(&path)?;
        db._scratch = Some(Arc::new(scratch));
        Ok(db)
    }

    /// Get a connection from the pool
    pub fn conn(&self) -> Result<DbConn> {
        Ok(self.pool.get()?)
    }

    /// Clear stored data for the given scope
    pub fn reset(&self, scope: ResetScope) -> Result<()> {
        let conn = self.conn()?;

        let sql = match scope {
            ResetScope::Leaderboard => "DELETE FROM leaderboard_entries;",
            ResetScope::FinancialData => "DELETE FROM financial_data;",
            ResetScope::All => {
                r#"
                DELETE FROM leaderboard_entries;
                DELETE FROM financial_data;
                DELETE FROM profiles;
                DELETE FROM bank_links;
                DELETE FROM audit_log;
                "#
            }
        };
        conn.execute_batch(sql)?;

        info!(scope = scope.as_str(), "Database reset complete");
        Ok(())
    }

    fn run_migrations(&self) -> Result<()> {
        let conn = self.conn()?;

        conn.execute_batch(
            r#"
            PRAGMA foreign_keys = ON;

            -- WAL: readers don't block the writer
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA temp_store = MEMORY;

            -- Manual income/expense submissions
            CREATE TABLE IF NOT EXISTS financial_data (
                id INTEGER PRIMARY KEY,
                username TEXT NOT NULL,
                income REAL NOT NULL,
                expenses REAL NOT NULL,
                expense_breakdown TEXT,                    -- JSON object
                notes TEXT,
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP
            );

            CREATE INDEX IF NOT EXISTS idx_financial_data_user ON financial_data(username, created_at);

            -- One row per score submission; a user may appear many times
            CREATE TABLE IF NOT EXISTS leaderboard_entries (
                id INTEGER PRIMARY KEY,
                username TEXT NOT NULL,
                score INTEGER NOT NULL,
                savings REAL,                              -- savings rate %, NULL for direct scores
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP
            );

            CREATE INDEX IF NOT EXISTS idx_leaderboard_score ON leaderboard_entries(score DESC, id);
            CREATE INDEX IF NOT EXISTS idx_leaderboard_user ON leaderboard_entries(username);

            CREATE TABLE IF NOT EXISTS profiles (
                username TEXT PRIMARY KEY,
                goal TEXT NOT NULL DEFAULT '',
                full_name TEXT NOT NULL DEFAULT '',
                income REAL,
                target_savings_rate REAL NOT NULL DEFAULT 20,
                monthly_budget REAL,
                savings_goal REAL,
                savings_timeframe REAL,
                updated_at DATETIME DEFAULT CURRENT_TIMESTAMP
            );

            -- At most one connected bank per user
            CREATE TABLE IF NOT EXISTS bank_links (
                username TEXT PRIMARY KEY,
                access_token TEXT NOT NULL,
                item_id TEXT,
                linked_at DATETIME DEFAULT CURRENT_TIMESTAMP
            );

            CREATE TABLE IF NOT EXISTS audit_log (
                id INTEGER PRIMARY KEY,
                timestamp DATETIME DEFAULT CURRENT_TIMESTAMP,
                username TEXT NOT NULL,
                action TEXT NOT NULL,
                entity_type TEXT,
                entity_id INTEGER,
                details TEXT
            );

            CREATE INDEX IF NOT EXISTS idx_audit_log_user ON audit_log(username);
            CREATE INDEX IF NOT EXISTS idx_audit_log_timestamp ON audit_log(timestamp);
            "#,
        )?;

        info!(path = %self.db_path, "Database schema initialized");
        Ok(())
    }
}

/// Audit log entry
#[derive(Debug, Clone, Serialize)]
pub struct AuditEntry {
    pub id: i64,
    pub timestamp: String,
    pub username: String,
    pub action: String,
    pub entity_type: Option<String>,
    pub entity_id: Option<i64>,
    pub details: Option<String>,
}

#[cfg(test)]
mod tests;
