//! Multi-table export orchestration.
//!
//! A session owns one read-only transaction, one writer, and one sink for its
//! whole lifetime, and drives the ordered table list through the exporter one
//! table at a time. Tables are strictly sequential: every query runs inside
//! the same transaction, so foreign-key relationships observed in later
//! tables are consistent with rows already exported from earlier ones.

use std::time::Instant;

use log::{error, info, warn};
use sqlx::sqlite::SqliteConnection;
use sqlx::SqlitePool;

use crate::config::TableSpec;
use crate::error::ExportError;
use crate::exporter::export_table;
use crate::writer::FormatWriter;

/// Summary of a completed export session.
#[derive(Clone, Debug)]
pub struct SessionReport {
    /// Tables exported successfully
    pub tables_exported: usize,
    /// Tables skipped after a per-table failure
    pub tables_failed: usize,
    /// Total rows written across all tables
    pub total_rows: u64,
    /// Wall-clock duration of the session in seconds
    pub elapsed_seconds: f64,
}

/// Runs one export session over `specs`, in declared order.
///
/// The file envelope (header and footer) is written exactly once regardless
/// of per-table outcomes. A failing table is logged with its cause and the
/// session continues with the next spec; fatal errors (sink writes, lost
/// connection) abort immediately. The transaction is released on every exit
/// path.
///
/// # Errors
///
/// Only fatal errors are returned; per-table failures are reported through
/// the log and counted in the [`SessionReport`].
pub async fn run_session(
    pool: &SqlitePool,
    specs: &[TableSpec],
    writer: &mut dyn FormatWriter,
) -> Result<SessionReport, ExportError> {
    let started = Instant::now();

    // One transaction for the whole session: every table sees the same
    // snapshot.
    let mut tx = pool.begin().await.map_err(ExportError::Connection)?;

    writer.write_file_header()?;

    let mut tables_exported = 0;
    let mut tables_failed = 0;
    let mut total_rows = 0;

    for spec in specs {
        let query = spec.query();
        match export_table(&mut tx, writer, &spec.name, &query).await {
            Ok(report) => {
                tables_exported += 1;
                total_rows += report.rows;

                if let Some((id, sequence)) = spec.sequence_fix() {
                    apply_sequence_fix(&mut tx, writer, &spec.name, id, sequence).await?;
                }
            }
            Err(e) if e.is_fatal() => return Err(e),
            Err(e) => {
                error!("export failed for {:?}: {e}", spec.name);
                tables_failed += 1;
            }
        }
    }

    writer.write_file_footer()?;

    // Read-only session: nothing to commit.
    drop(tx);

    let elapsed_seconds = started.elapsed().as_secs_f64();
    info!(
        "session finished: {tables_exported} tables, {total_rows} rows, {tables_failed} failed, {elapsed_seconds:.2}s"
    );

    Ok(SessionReport {
        tables_exported,
        tables_failed,
        total_rows,
        elapsed_seconds,
    })
}

/// Probes `select coalesce(max(<id>), 0)` on the just-exported table and
/// emits a sequence fix when the result is positive.
///
/// A failed probe skips only the sequence fix: the table's export already
/// succeeded, so the failure is logged as a warning and the session moves on.
/// A failed `add_sequence_fix` write is a sink error and fatal.
async fn apply_sequence_fix(
    conn: &mut SqliteConnection,
    writer: &mut dyn FormatWriter,
    table: &str,
    id_column: &str,
    sequence: &str,
) -> Result<(), ExportError> {
    let sql = format!("select coalesce(max({id_column}), 0) from {table}");
    match sqlx::query_scalar::<_, i64>(&sql).fetch_one(conn).await {
        Ok(max_id) if max_id > 0 => writer.add_sequence_fix(sequence, max_id)?,
        Ok(_) => {}
        Err(e) => {
            warn!("sequence probe failed for {table:?}: {e}; leaving {sequence} untouched");
        }
    }
    Ok(())
}
