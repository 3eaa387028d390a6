//! Single-table export.
//!
//! Runs one query against an open transaction and streams every result row
//! through a [`FormatWriter`], reporting progress and timing on the log.

use std::time::{Duration, Instant};

use futures::TryStreamExt;
use log::info;
use sqlx::sqlite::SqliteConnection;
use sqlx::{Column, Executor, Statement};

use crate::config::PROGRESS_EVERY;
use crate::error::ExportError;
use crate::value::decode_row;
use crate::writer::FormatWriter;

/// Outcome of one table's export.
#[derive(Clone, Debug)]
pub struct TableReport {
    /// Table that was exported
    pub table: String,
    /// Number of rows written
    pub rows: u64,
    /// Wall-clock duration of the export
    pub elapsed: Duration,
}

/// Exports one table through `writer`.
///
/// The statement is prepared first so the column set comes from statement
/// metadata; a query with zero result rows still emits a complete
/// header/terminator block. Rows are written in cursor order with indices
/// starting at 0, and `flush_table` is called exactly once after the last
/// row. On error the function returns before `flush_table`, leaving the
/// table's block unterminated, and the caller decides whether the session
/// continues.
///
/// # Errors
///
/// [`ExportError::Query`] when the statement fails, [`ExportError::Encoding`]
/// when a cell cannot be decoded, [`ExportError::Sink`] when the destination
/// write fails.
pub async fn export_table(
    conn: &mut SqliteConnection,
    writer: &mut dyn FormatWriter,
    table: &str,
    sql: &str,
) -> Result<TableReport, ExportError> {
    let started = Instant::now();
    info!("exporting {table} ({sql})");

    let statement = (&mut *conn)
        .prepare(sql)
        .await
        .map_err(|source| ExportError::Query {
            table: table.to_string(),
            source,
        })?;
    let columns: Vec<String> = statement
        .columns()
        .iter()
        .map(|c| c.name().to_string())
        .collect();

    writer.write_table_header(table, &columns)?;

    let mut rows = statement.query().fetch(&mut *conn);
    let mut row_count: u64 = 0;

    while let Some(row) = rows.try_next().await.map_err(|source| ExportError::Query {
        table: table.to_string(),
        source,
    })? {
        let values = decode_row(table, &row)?;
        writer.write_row(row_count, &values)?;
        row_count += 1;

        if row_count % PROGRESS_EVERY == 0 {
            info!("{table}: {row_count} rows exported so far");
        }
    }
    drop(rows);

    writer.flush_table()?;

    let elapsed = started.elapsed();
    info!(
        "{table}: {row_count} rows in {:.2}s",
        elapsed.as_secs_f64()
    );

    Ok(TableReport {
        table: table.to_string(),
        rows: row_count,
        elapsed,
    })
}
