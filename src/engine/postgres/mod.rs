//! `PostgreSQL` Database Engine Implementation
//!
//! This module implements the `DatabaseEngine` trait for `PostgreSQL` databases.
//!
//! # Implementation Notes
//! - Uses `tokio-postgres` (async driver, requires tokio runtime)
//! - The connection future runs on a spawned task for the whole session
//! - Parameters are bound natively (`$1`, `$2`, ...)
//! - Every result value is rendered to text; BYTEA is Base64-encoded
//! - Sequences are read with `currval`, which needs a prior `nextval` in the
//!   same session

use tokio::task::JoinHandle;
use tokio_postgres::types::{FromSql, ToSql, Type};
use tokio_postgres::{Client, Config, NoTls, Row};

use crate::engine::{ConnectionConfig, DatabaseEngine, DatabaseType, QueryResult, SqlValue};
use crate::error::{Result, ShopError};

/// `PostgreSQL` database engine implementation
pub struct PostgresEngine {
    client: Client,
    connection: JoinHandle<()>,
}

impl DatabaseEngine for PostgresEngine {
    async fn connect(config: &ConnectionConfig) -> Result<Self> {
        // Validate config is for PostgreSQL
        if config.engine != DatabaseType::Postgres {
            return Err(ShopError::invalid_input(format!(
                "Expected PostgreSQL engine, got {}",
                config.engine
            )));
        }

        let pg_config = build_pg_config(config)?;

        let (client, connection) = pg_config.connect(NoTls).await.map_err(|e| {
            ShopError::connection_failed(format!("Failed to connect to PostgreSQL: {e}"))
        })?;

        let connection = tokio::spawn(async move {
            if let Err(e) = connection.await {
                tracing::warn!(error = %e, "postgres connection terminated");
            }
        });

        Ok(Self { client, connection })
    }

    async fn execute(&mut self, sql: &str, params: &[SqlValue]) -> Result<u64> {
        let bound = bind_params(params);
        self.client
            .execute(sql, &bound)
            .await
            .map_err(|e| ShopError::query_failed(format!("Failed to execute statement: {e}")))
    }

    async fn query(&mut self, sql: &str, params: &[SqlValue]) -> Result<QueryResult> {
        let mut stmt = self
            .client
            .prepare(sql)
            .await
            .map_err(|e| ShopError::query_failed(format!("Failed to prepare query: {e}")))?;

        // Columns of types rendered below are fetched as-is; otherwise the
        // server renders every column with its own text output
        if !stmt.columns().iter().all(|c| has_native_rendering(c.type_())) {
            let names: Vec<&str> = stmt.columns().iter().map(|c| c.name()).collect();
            let text_sql = as_text_query(sql, &names);
            tracing::debug!(sql = %text_sql, "re-preparing query with text columns");
            stmt = self.client.prepare(&text_sql).await.map_err(|e| {
                ShopError::query_failed(format!("Failed to prepare text query: {e}"))
            })?;
        }

        let bound = bind_params(params);
        let rows = self
            .client
            .query(&stmt, &bound)
            .await
            .map_err(|e| ShopError::query_failed(format!("Failed to execute query: {e}")))?;

        let columns: Vec<String> = stmt.columns().iter().map(|c| c.name().to_string()).collect();

        let mut rows_data = Vec::with_capacity(rows.len());
        for row in &rows {
            rows_data.push(row_to_text(row)?);
        }

        Ok(QueryResult { columns, rows: rows_data })
    }

    async fn sequence_value(&mut self, sequence: &str) -> Result<Option<i64>> {
        let row = self
            .client
            .query_opt("SELECT currval($1::text::regclass)", &[&sequence])
            .await
            .map_err(|e| {
                ShopError::query_failed(format!("Failed to read sequence '{sequence}': {e}"))
            })?;

        row.map(|r| r.try_get::<_, i64>(0))
            .transpose()
            .map_err(|e| ShopError::query_failed(format!("Failed to get sequence value: {e}")))
    }

    async fn close(self) -> Result<()> {
        // Dropping the client ends the connection future
        drop(self.client);
        self.connection
            .await
            .map_err(|e| ShopError::engine_error("postgres", format!("Connection task failed: {e}")))
    }
}

/// Build `PostgreSQL` connection config from `ConnectionConfig`
fn build_pg_config(config: &ConnectionConfig) -> Result<Config> {
    let host = config
        .host
        .as_ref()
        .ok_or_else(|| ShopError::invalid_input("PostgreSQL requires 'host' parameter"))?;

    let port = config
        .port
        .ok_or_else(|| ShopError::invalid_input("PostgreSQL requires 'port' parameter"))?;

    let user = config
        .user
        .as_ref()
        .ok_or_else(|| ShopError::invalid_input("PostgreSQL requires 'user' parameter"))?;

    let database = config
        .database
        .as_ref()
        .ok_or_else(|| ShopError::invalid_input("PostgreSQL requires 'database' parameter"))?;

    let mut pg_config = Config::new();
    pg_config.host(host).port(port).user(user).dbname(database);

    // A blank password means "no password"; let the server decide (trust/peer auth)
    if let Some(password) = config.password.as_deref().filter(|p| !p.is_empty()) {
        pg_config.password(password);
    }

    Ok(pg_config)
}

/// Borrow statement parameters as driver values
fn bind_params(params: &[SqlValue]) -> Vec<&(dyn ToSql + Sync)> {
    params
        .iter()
        .map(|p| match p {
            SqlValue::Int(v) => v as &(dyn ToSql + Sync),
            SqlValue::BigInt(v) => v as &(dyn ToSql + Sync),
            SqlValue::Text(v) => v as &(dyn ToSql + Sync),
            SqlValue::Date(v) => v as &(dyn ToSql + Sync),
        })
        .collect()
}

/// Types `postgres_value_to_text` converts itself
fn has_native_rendering(ty: &Type) -> bool {
    matches!(
        *ty,
        Type::BOOL
            | Type::INT2
            | Type::INT4
            | Type::INT8
            | Type::FLOAT4
            | Type::FLOAT8
            | Type::VARCHAR
            | Type::TEXT
            | Type::BPCHAR
            | Type::NAME
            | Type::DATE
            | Type::TIMESTAMP
            | Type::UUID
            | Type::BYTEA
    )
}

/// Wrap a query so every output column is cast to `text`, keeping names
///
/// The subquery's columns are renamed positionally, so duplicate or unnamed
/// columns (`?column?`) still resolve.
fn as_text_query(sql: &str, names: &[&str]) -> String {
    let aliases: Vec<String> = (1..=names.len()).map(|i| format!("c{i}")).collect();
    let select: Vec<String> = names
        .iter()
        .zip(&aliases)
        .map(|(name, alias)| format!("q.{alias}::text AS \"{}\"", name.replace('"', "\"\"")))
        .collect();

    format!(
        "SELECT {} FROM ({}) AS q({})",
        select.join(", "),
        sql.trim().trim_end_matches(';'),
        aliases.join(", ")
    )
}

/// Render a `PostgreSQL` row as text fields
fn row_to_text(row: &Row) -> Result<Vec<Option<String>>> {
    (0..row.len()).map(|idx| postgres_value_to_text(row, idx)).collect()
}

/// Fetch a nullable column and render it with `Display`
fn get_text<'a, T>(row: &'a Row, idx: usize, what: &str) -> Result<Option<String>>
where
    T: FromSql<'a> + ToString,
{
    row.try_get::<_, Option<T>>(idx)
        .map(|v| v.map(|v| v.to_string()))
        .map_err(|e| ShopError::query_failed(format!("Failed to get {what} value: {e}")))
}

/// Convert a `PostgreSQL` value to text
fn postgres_value_to_text(row: &Row, idx: usize) -> Result<Option<String>> {
    let col_type = row.columns()[idx].type_();

    match *col_type {
        Type::BOOL => get_text::<bool>(row, idx, "boolean"),
        Type::INT2 => get_text::<i16>(row, idx, "i16"),
        Type::INT4 => get_text::<i32>(row, idx, "i32"),
        Type::INT8 => get_text::<i64>(row, idx, "i64"),
        Type::FLOAT4 => get_text::<f32>(row, idx, "f32"),
        Type::FLOAT8 => get_text::<f64>(row, idx, "f64"),
        Type::VARCHAR | Type::TEXT | Type::BPCHAR | Type::NAME => {
            get_text::<String>(row, idx, "string")
        }
        Type::DATE => {
            use chrono::NaiveDate;
            let v: Option<NaiveDate> = row
                .try_get(idx)
                .map_err(|e| ShopError::query_failed(format!("Failed to get date value: {e}")))?;
            Ok(v.map(|d| d.format("%Y-%m-%d").to_string()))
        }
        Type::TIMESTAMP => {
            use chrono::NaiveDateTime;
            let v: Option<NaiveDateTime> = row.try_get(idx).map_err(|e| {
                ShopError::query_failed(format!("Failed to get timestamp value: {e}"))
            })?;
            Ok(v.map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string()))
        }
        Type::UUID => get_text::<uuid::Uuid>(row, idx, "UUID"),
        Type::BYTEA => {
            let v: Option<Vec<u8>> = row
                .try_get(idx)
                .map_err(|e| ShopError::query_failed(format!("Failed to get bytea value: {e}")))?;
            use base64::Engine;
            Ok(v.map(|b| base64::engine::general_purpose::STANDARD.encode(b)))
        }
        _ => row.try_get::<_, Option<String>>(idx).map_err(|e| {
            ShopError::query_failed(format!(
                "Failed to convert PostgreSQL type '{}' to text: {}",
                col_type.name(),
                e
            ))
        }),
    }
}
