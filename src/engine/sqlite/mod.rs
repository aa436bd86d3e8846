//! `SQLite` Database Engine Implementation
//!
//! This module implements the `DatabaseEngine` trait for `SQLite` databases.
//!
//! # Features
//! - File-based connections (`/path/to/shop.db`)
//! - In-memory connections (`:memory:`)
//!
//! # Implementation Notes
//! - Uses `rusqlite` (synchronous driver, no async needed)
//! - `$1`-style placeholders are native `SQLite` parameters, bound by position
//! - BLOB data is Base64-encoded
//! - Dates are bound as `YYYY-MM-DD` text
//! - Sequences map to `sqlite_sequence`, which only exists once an
//!   `AUTOINCREMENT` table has been created

use rusqlite::types::{ToSqlOutput, Value, ValueRef};
use rusqlite::{Connection, OpenFlags, Row};

use crate::engine::{ConnectionConfig, DatabaseEngine, DatabaseType, QueryResult, SqlValue};
use crate::error::{Result, ShopError};

/// `SQLite` database engine implementation
pub struct SqliteEngine {
    conn: Connection,
}

impl DatabaseEngine for SqliteEngine {
    async fn connect(config: &ConnectionConfig) -> Result<Self> {
        // Validate config is for SQLite
        if config.engine != DatabaseType::SQLite {
            return Err(ShopError::invalid_input(format!(
                "Expected SQLite engine, got {}",
                config.engine
            )));
        }

        let file_path = config
            .file
            .as_ref()
            .ok_or_else(|| ShopError::invalid_input("SQLite requires 'file' parameter"))?;

        let path_str = file_path.to_str().ok_or_else(|| {
            ShopError::invalid_input("SQLite file path contains invalid UTF-8 characters")
        })?;

        Ok(Self { conn: open_connection(path_str)? })
    }

    async fn execute(&mut self, sql: &str, params: &[SqlValue]) -> Result<u64> {
        let changed = self
            .conn
            .execute(sql, rusqlite::params_from_iter(params.iter().map(to_sqlite)))
            .map_err(|e| ShopError::query_failed(format!("Failed to execute statement: {e}")))?;

        Ok(changed as u64)
    }

    async fn query(&mut self, sql: &str, params: &[SqlValue]) -> Result<QueryResult> {
        execute_query(&self.conn, sql, params)
    }

    async fn sequence_value(&mut self, sequence: &str) -> Result<Option<i64>> {
        let has_sequences = execute_query(
            &self.conn,
            "SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = 'sqlite_sequence'",
            &[],
        )?;
        if has_sequences.rows.is_empty() {
            return Ok(None);
        }

        let result = execute_query(
            &self.conn,
            "SELECT seq FROM sqlite_sequence WHERE name = $1",
            &[SqlValue::from(sequence)],
        )?;

        result
            .first_value()
            .map(|v| {
                v.parse::<i64>().map_err(|e| {
                    ShopError::engine_error("sqlite", format!("Invalid sequence value '{v}': {e}"))
                })
            })
            .transpose()
    }

    async fn close(self) -> Result<()> {
        self.conn
            .close()
            .map_err(|(_, e)| ShopError::engine_error("sqlite", format!("Failed to close: {e}")))
    }
}

/// Open `SQLite` connection, creating the file if needed
fn open_connection(path: &str) -> Result<Connection> {
    let flags = OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_CREATE;

    Connection::open_with_flags(path, flags)
        .map_err(|e| ShopError::connection_failed(format!("Failed to open SQLite database: {e}")))
}

/// Map a bound value to its `SQLite` storage class
fn to_sqlite(value: &SqlValue) -> ToSqlOutput<'_> {
    match value {
        SqlValue::Int(v) => ToSqlOutput::Owned(Value::Integer(i64::from(*v))),
        SqlValue::BigInt(v) => ToSqlOutput::Owned(Value::Integer(*v)),
        SqlValue::Text(v) => ToSqlOutput::Borrowed(ValueRef::Text(v.as_bytes())),
        SqlValue::Date(v) => ToSqlOutput::Owned(Value::Text(v.format("%Y-%m-%d").to_string())),
    }
}

/// Execute query and return `QueryResult`
fn execute_query(conn: &Connection, query: &str, params: &[SqlValue]) -> Result<QueryResult> {
    let mut stmt = conn
        .prepare(query)
        .map_err(|e| ShopError::query_failed(format!("Failed to prepare query: {e}")))?;

    let column_names: Vec<String> = stmt.column_names().iter().map(|s| (*s).to_string()).collect();

    let rows = stmt
        .query(rusqlite::params_from_iter(params.iter().map(to_sqlite)))
        .map_err(|e| ShopError::query_failed(format!("Failed to execute query: {e}")))?;

    let rows_data = rows
        .mapped(|row| row_to_text(column_names.len(), row))
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| ShopError::query_failed(format!("Failed to fetch row: {e}")))?;

    Ok(QueryResult { columns: column_names, rows: rows_data })
}

/// Convert a `SQLite` row to text fields
fn row_to_text(
    column_count: usize,
    row: &Row,
) -> std::result::Result<Vec<Option<String>>, rusqlite::Error> {
    (0..column_count).map(|idx| sqlite_value_to_text(row, idx)).collect()
}

/// Convert `SQLite` value to text
fn sqlite_value_to_text(
    row: &Row,
    idx: usize,
) -> std::result::Result<Option<String>, rusqlite::Error> {
    let value_ref = row.get_ref(idx)?;

    Ok(match value_ref {
        ValueRef::Null => None,
        ValueRef::Integer(i) => Some(i.to_string()),
        ValueRef::Real(f) => Some(f.to_string()),
        ValueRef::Text(s) => {
            let text = std::str::from_utf8(s).map_err(|e| {
                rusqlite::Error::FromSqlConversionFailure(
                    idx,
                    rusqlite::types::Type::Text,
                    Box::new(e),
                )
            })?;
            Some(text.to_string())
        }
        ValueRef::Blob(b) => {
            use base64::Engine;
            Some(base64::engine::general_purpose::STANDARD.encode(b))
        }
    })
}
