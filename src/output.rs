//! Console Result Rendering
//!
//! Query results are printed as plain tab-separated text:
//! - one header line of column names, printed only when there is a first row
//! - one line per row, each field followed by a tab
//!
//! `NULL` fields render as `null`.

use std::io::Write;

use crate::engine::QueryResult;
use crate::error::Result;

/// Text printed for a `NULL` field
pub const NULL_TEXT: &str = "null";

/// Format one tab-terminated line from its fields
fn format_line<'a>(fields: impl IntoIterator<Item = &'a str>) -> String {
    let mut line = String::new();
    for field in fields {
        line.push_str(field);
        line.push('\t');
    }
    line
}

/// Format the header line for a result's columns
#[must_use]
pub fn format_header(columns: &[String]) -> String {
    format_line(columns.iter().map(String::as_str))
}

/// Format one data row
#[must_use]
pub fn format_row(row: &[Option<String>]) -> String {
    format_line(row.iter().map(|v| v.as_deref().unwrap_or(NULL_TEXT)))
}

/// Write a result set to `out` and return the number of rows written
pub fn write_result(out: &mut impl Write, result: &QueryResult) -> Result<usize> {
    if !result.rows.is_empty() {
        writeln!(out, "{}", format_header(&result.columns))?;
    }
    for row in &result.rows {
        writeln!(out, "{}", format_row(row))?;
    }
    out.flush()?;
    Ok(result.row_count())
}
