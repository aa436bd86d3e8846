//! Shop Client
//!
//! `ShopClient` is the single gateway between the workflows and the database.
//! It owns one engine connection for the whole session and exposes the
//! primitive operations the workflows are built from.

use std::io::Write;

use crate::engine::{ConnectionConfig, DatabaseEngine, QueryResult, SqlValue};
use crate::error::Result;
use crate::output;

/// Database-access facade over one open connection
pub struct ShopClient<E> {
    engine: E,
}

impl<E: DatabaseEngine> ShopClient<E> {
    /// Open the session connection
    ///
    /// The caller decides what a failure means; the binary treats it as fatal.
    pub async fn connect(config: &ConnectionConfig) -> Result<Self> {
        tracing::info!(engine = %config.engine, url = %config.display_url(), "connecting");
        let engine = E::connect(config).await?;
        Ok(Self { engine })
    }

    /// Execute a mutating statement
    pub async fn run_update(&mut self, sql: &str, params: &[SqlValue]) -> Result<u64> {
        tracing::debug!(sql, params = params.len(), "run_update");
        let affected = self.engine.execute(sql, params).await?;
        tracing::debug!(affected, "update complete");
        Ok(affected)
    }

    /// Execute a query, print it to `out` and return the row count
    pub async fn run_query_print(
        &mut self,
        out: &mut impl Write,
        sql: &str,
        params: &[SqlValue],
    ) -> Result<usize> {
        let result = self.query(sql, params).await?;
        output::write_result(out, &result)
    }

    /// Execute a query and return its rows as text fields
    pub async fn run_query_rows(
        &mut self,
        sql: &str,
        params: &[SqlValue],
    ) -> Result<Vec<Vec<Option<String>>>> {
        Ok(self.query(sql, params).await?.rows)
    }

    /// Execute a query and return 1 if it produced any row, else 0
    ///
    /// This is a presence check: five matching rows still give 1.
    pub async fn run_query_exists(&mut self, sql: &str, params: &[SqlValue]) -> Result<usize> {
        let result = self.query(sql, params).await?;
        Ok(usize::from(!result.rows.is_empty()))
    }

    /// Current value of the named sequence, or -1 if there is none
    pub async fn last_sequence_value(&mut self, sequence: &str) -> Result<i64> {
        Ok(self.engine.sequence_value(sequence).await?.unwrap_or(-1))
    }

    /// Close the connection, logging and discarding any failure
    pub async fn disconnect(self) {
        match self.engine.close().await {
            Ok(()) => tracing::info!("disconnected"),
            Err(e) => tracing::warn!(error = %e, "ignoring error while disconnecting"),
        }
    }

    async fn query(&mut self, sql: &str, params: &[SqlValue]) -> Result<QueryResult> {
        tracing::debug!(sql, params = params.len(), "query");
        let result = self.engine.query(sql, params).await?;
        tracing::debug!(rows = result.row_count(), "query complete");
        Ok(result)
    }
}
