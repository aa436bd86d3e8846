//! Database Engine Trait and Core Types
//!
//! This module defines the abstraction the shop client talks to.
//! Each engine (`PostgreSQL`, `SQLite`) implements the `DatabaseEngine` trait.
//!
//! # Connection Model
//! Unlike a one-shot tool, the shop client keeps a single connection open for
//! the whole session: `connect` returns an engine value owning the connection,
//! and `close` consumes it.
//!
//! # Parameters
//! Statements use numbered placeholders (`$1`, `$2`, ...) accepted by both
//! engines. Values are passed as [`SqlValue`] and bound by the driver, never
//! formatted into the SQL text.
//!
//! Engines are feature-gated and share nothing but this trait.

use chrono::NaiveDate;
use std::path::PathBuf;

use crate::error::Result;

#[cfg(feature = "postgres")]
pub mod postgres;

#[cfg(feature = "sqlite")]
pub mod sqlite;

/// Engine behind a session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatabaseType {
    /// `PostgreSQL` database
    Postgres,
    /// `SQLite` database
    SQLite,
}

impl DatabaseType {
    /// Lowercase engine name, as accepted by `--engine`
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Postgres => "postgres",
            Self::SQLite => "sqlite",
        }
    }
}

impl std::fmt::Display for DatabaseType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Where and how to open the session connection
///
/// `PostgreSQL` uses host, port, user, password and database; `SQLite` only `file`.
#[derive(Debug, Clone)]
pub struct ConnectionConfig {
    /// Database engine type
    pub engine: DatabaseType,

    /// Hostname (for postgres)
    pub host: Option<String>,

    /// Port number (for postgres)
    pub port: Option<u16>,

    /// Username (for postgres)
    pub user: Option<String>,

    /// Password (for postgres)
    /// Never logged or formatted into errors
    pub password: Option<String>,

    /// Database name (for postgres)
    pub database: Option<String>,

    /// Database file, or `:memory:` (for sqlite)
    pub file: Option<PathBuf>,
}

impl ConnectionConfig {
    /// `PostgreSQL` server connection
    #[must_use]
    pub const fn postgres(
        host: String,
        port: u16,
        user: String,
        password: String,
        database: String,
    ) -> Self {
        Self {
            engine: DatabaseType::Postgres,
            host: Some(host),
            port: Some(port),
            user: Some(user),
            password: Some(password),
            database: Some(database),
            file: None,
        }
    }

    /// `SQLite` file connection
    #[must_use]
    pub const fn sqlite(file: PathBuf) -> Self {
        Self {
            engine: DatabaseType::SQLite,
            host: None,
            port: None,
            user: None,
            password: None,
            database: None,
            file: Some(file),
        }
    }

    /// Connection URL shown in the startup banner (never includes the password)
    #[must_use]
    pub fn display_url(&self) -> String {
        match self.engine {
            DatabaseType::Postgres => format!(
                "postgresql://{}:{}/{}",
                self.host.as_deref().unwrap_or("localhost"),
                self.port.map_or_else(String::new, |p| p.to_string()),
                self.database.as_deref().unwrap_or_default()
            ),
            DatabaseType::SQLite => format!(
                "sqlite://{}",
                self.file.as_deref().map(|p| p.display().to_string()).unwrap_or_default()
            ),
        }
    }
}

/// A value bound to a statement placeholder
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SqlValue {
    /// 32-bit integer (identifiers, year, experience, odometer)
    Int(i32),
    /// 64-bit integer (`LIMIT` counts)
    BigInt(i64),
    /// Text value
    Text(String),
    /// Calendar date
    Date(NaiveDate),
}

impl From<i32> for SqlValue {
    fn from(v: i32) -> Self {
        Self::Int(v)
    }
}

impl From<i64> for SqlValue {
    fn from(v: i64) -> Self {
        Self::BigInt(v)
    }
}

impl From<&str> for SqlValue {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<String> for SqlValue {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl From<NaiveDate> for SqlValue {
    fn from(v: NaiveDate) -> Self {
        Self::Date(v)
    }
}

/// Rows returned by a query
///
/// Every field is rendered to text by the engine; `None` is SQL `NULL`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryResult {
    /// Column names, in select-list order
    pub columns: Vec<String>,

    /// Result rows, fields in column order
    pub rows: Vec<Vec<Option<String>>>,
}

impl QueryResult {
    /// Number of rows in the result set
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// First field of the first row, if the result has one
    #[must_use]
    pub fn first_value(&self) -> Option<&str> {
        self.rows.first().and_then(|row| row.first()).and_then(|v| v.as_deref())
    }
}

/// Database engine trait
///
/// An engine value owns one open connection.
pub trait DatabaseEngine: Sized {
    /// Open a connection described by `config`
    fn connect(config: &ConnectionConfig) -> impl std::future::Future<Output = Result<Self>> + Send;

    /// Execute a mutating statement and return the number of rows affected
    fn execute(
        &mut self,
        sql: &str,
        params: &[SqlValue],
    ) -> impl std::future::Future<Output = Result<u64>> + Send;

    /// Execute a query and return its columns and text-rendered rows
    fn query(
        &mut self,
        sql: &str,
        params: &[SqlValue],
    ) -> impl std::future::Future<Output = Result<QueryResult>> + Send;

    /// Current value of the named sequence, `None` if the engine has no value for it
    fn sequence_value(
        &mut self,
        sequence: &str,
    ) -> impl std::future::Future<Output = Result<Option<i64>>> + Send;

    /// Close the connection
    fn close(self) -> impl std::future::Future<Output = Result<()>> + Send;
}
