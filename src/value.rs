//! Typed cell values and their PostgreSQL text encoding.
//!
//! Every cell that comes out of the source database is decoded into the closed
//! [`Cell`] enum before any writer sees it. The encoding functions here produce
//! the text form used inside `copy ... from stdin` blocks; the sibling writers
//! (CSV, JSON, XML) render cells with their own format-native rules instead.

use std::collections::HashMap;

use chrono::{DateTime, FixedOffset};
use sqlx::sqlite::SqliteRow;
use sqlx::{Column, Row as _, TypeInfo, ValueRef};

use crate::error::ExportError;

/// A single decoded cell value.
///
/// The variant set is closed: any source type that does not map onto one of
/// the first six variants decodes as [`Cell::Text`], so encoding is total and
/// never fails.
#[derive(Clone, Debug, PartialEq)]
pub enum Cell {
    /// SQL NULL
    Null,
    /// Raw binary data
    Bytes(Vec<u8>),
    /// 64-bit signed integer
    Int(i64),
    /// 64-bit float
    Float(f64),
    /// Date-time with a fixed UTC offset
    Timestamp(DateTime<FixedOffset>),
    /// Boolean
    Bool(bool),
    /// Text, or the generic fallback rendering of anything else
    Text(String),
}

/// One result row: column name mapped to its decoded cell.
///
/// Writers lay rows out in the column order recorded at table-header time, so
/// the map itself carries no ordering. A column missing from the map renders
/// as NULL.
pub type RowValues = HashMap<String, Cell>;

impl Cell {
    /// Encodes this cell as PostgreSQL `copy from stdin` text.
    ///
    /// Deterministic and total: NULL becomes the `\N` sentinel, binary data a
    /// hex-escaped bytea literal, floats the shortest string that parses back
    /// to the same bits, timestamps RFC 3339, and text goes through
    /// [`escape_pg_text`].
    pub fn to_pg_text(&self) -> String {
        match self {
            Cell::Null => "\\N".to_string(),
            Cell::Bytes(data) => format!("\\x{}", hex::encode_upper(data)),
            Cell::Int(v) => v.to_string(),
            Cell::Float(v) => v.to_string(),
            Cell::Timestamp(ts) => ts.to_rfc3339(),
            Cell::Bool(v) => if *v { "true" } else { "false" }.to_string(),
            Cell::Text(s) => escape_pg_text(s),
        }
    }
}

/// Escapes text for use inside a `copy from stdin` data line.
///
/// Handles backslash, tab, carriage return, newline, backspace, and vertical
/// tab. The input is walked in a single pass, so a backslash produced by one
/// replacement is never escaped again.
pub fn escape_pg_text(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            '\n' => out.push_str("\\n"),
            '\u{0008}' => out.push_str("\\b"),
            '\u{000B}' => out.push_str("\\v"),
            _ => out.push(c),
        }
    }
    out
}

/// Decodes one sqlx row into the closed cell model.
///
/// The variant is chosen from the column's declared type, falling back to the
/// value's storage class when the declaration is unknown (expressions,
/// computed columns). Unrecognized types decode as text.
///
/// # Errors
///
/// Returns [`ExportError::Encoding`] naming the table and column when a cell
/// cannot be decoded into its expected variant.
pub fn decode_row(table: &str, row: &SqliteRow) -> Result<RowValues, ExportError> {
    let mut values = RowValues::with_capacity(row.len());

    for (index, column) in row.columns().iter().enumerate() {
        let raw = row
            .try_get_raw(index)
            .map_err(|source| encoding_error(table, column.name(), source))?;

        let cell = if raw.is_null() {
            Cell::Null
        } else {
            // Declared column type first; for expressions the declaration is
            // unknown and the value's storage class decides.
            let declared = column.type_info().name();
            let type_name = if declared == "NULL" {
                raw.type_info().name().to_string()
            } else {
                declared.to_string()
            };

            decode_cell(row, index, &type_name)
                .map_err(|source| encoding_error(table, column.name(), source))?
        };

        values.insert(column.name().to_string(), cell);
    }

    Ok(values)
}

fn decode_cell(row: &SqliteRow, index: usize, type_name: &str) -> Result<Cell, sqlx::Error> {
    let cell = match type_name {
        "INTEGER" | "INT" | "INT4" | "INT8" | "BIGINT" => Cell::Int(row.try_get(index)?),
        "REAL" | "FLOAT" | "DOUBLE" => Cell::Float(row.try_get(index)?),
        "BLOB" => Cell::Bytes(row.try_get(index)?),
        "BOOLEAN" => Cell::Bool(row.try_get(index)?),
        "DATETIME" | "TIMESTAMP" => {
            Cell::Timestamp(row.try_get::<DateTime<FixedOffset>, _>(index)?)
        }
        // TEXT and everything else falls back to the generic text rendering.
        _ => Cell::Text(row.try_get(index)?),
    };
    Ok(cell)
}

fn encoding_error(table: &str, column: &str, source: sqlx::Error) -> ExportError {
    ExportError::Encoding {
        table: table.to_string(),
        column: column.to_string(),
        source,
    }
}
