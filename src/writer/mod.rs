//! Destination format writers.
//!
//! Every destination implements [`FormatWriter`], the lifecycle contract the
//! exporter drives:
//!
//! ```text
//! write_file_header
//!   (write_table_header -> write_row* -> flush_table)*  per table, in order
//! write_file_footer
//! ```
//!
//! `add_sequence_fix` may follow a table's `flush_table` when sequence repair
//! is configured. The bulk-load dump writer uses every hook; the simpler
//! formats leave the file-level hooks as the provided no-ops.

mod csv;
mod json;
mod pgdump;
mod xml;

pub use self::csv::CsvWriter;
pub use self::json::{JsonArrayWriter, JsonLinesWriter};
pub use self::pgdump::PgDumpWriter;
pub use self::xml::XmlWriter;

use std::io;

use crate::value::RowValues;

/// Lifecycle contract every destination writer honors.
///
/// All methods surface sink failures as `io::Error`; any such failure leaves
/// the current table's block unterminated and must reach the caller, which
/// treats it as fatal for the session.
pub trait FormatWriter {
    /// Emits the global preamble. Called exactly once, before anything else.
    fn write_file_header(&mut self) -> io::Result<()> {
        Ok(())
    }

    /// Records the table's column set and emits its start marker.
    ///
    /// Column order is fixed here for the lifetime of the table's export; all
    /// row writes lay values out in this exact order.
    fn write_table_header(&mut self, table: &str, columns: &[String]) -> io::Result<()>;

    /// Appends one record over the recorded column set.
    ///
    /// `row_index` is informational (zero-based, monotonic) and never embedded
    /// in the output.
    fn write_row(&mut self, row_index: u64, values: &RowValues) -> io::Result<()>;

    /// Terminates the current table's block and drains buffered bytes to the
    /// sink. Called exactly once per table, after its last row.
    fn flush_table(&mut self) -> io::Result<()>;

    /// Emits a statement advancing `sequence` past `new_value`.
    ///
    /// Called at most once per table, only when sequence repair is configured
    /// and the observed max id is positive. Formats without a statement stream
    /// ignore it.
    fn add_sequence_fix(&mut self, sequence: &str, new_value: i64) -> io::Result<()> {
        let _ = (sequence, new_value);
        Ok(())
    }

    /// Emits the closing envelope. Called exactly once, last.
    fn write_file_footer(&mut self) -> io::Result<()> {
        Ok(())
    }
}
