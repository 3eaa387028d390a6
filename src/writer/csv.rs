//! Delimited-text writer (CSV/TSV).
//!
//! Format-native rendering with no transactional envelope: quoting and
//! delimiter handling come from the `csv` crate, NULL renders as an empty
//! field, and binary data as plain hex. With the header option enabled, each
//! table's block starts with a row of column names.

use std::io::{self, Write};

use csv::WriterBuilder;

use crate::value::{Cell, RowValues};
use crate::writer::FormatWriter;

/// Writer for delimited text output.
pub struct CsvWriter<W: Write> {
    writer: csv::Writer<W>,
    with_header: bool,
    columns: Vec<String>,
}

impl<W: Write> CsvWriter<W> {
    /// Creates a delimited-text writer.
    ///
    /// `delimiter` separates fields (`,` for CSV, `\t` for TSV); when
    /// `with_header` is set, each table starts with a column-name row.
    pub fn new(out: W, delimiter: u8, with_header: bool) -> Self {
        // Tables in one session can have different column counts; the
        // recorded column set already fixes each record's layout.
        let writer = WriterBuilder::new()
            .delimiter(delimiter)
            .flexible(true)
            .from_writer(out);
        CsvWriter {
            writer,
            with_header,
            columns: Vec::new(),
        }
    }

    /// Consumes the writer, draining its buffer, and returns the sink.
    ///
    /// # Errors
    ///
    /// Propagates the flush error if the final drain fails.
    pub fn into_inner(self) -> io::Result<W> {
        self.writer
            .into_inner()
            .map_err(|e| io::Error::other(e.to_string()))
    }
}

fn field(cell: &Cell) -> String {
    match cell {
        Cell::Null => String::new(),
        Cell::Bytes(data) => hex::encode(data),
        Cell::Int(v) => v.to_string(),
        Cell::Float(v) => v.to_string(),
        Cell::Timestamp(ts) => ts.to_rfc3339(),
        Cell::Bool(v) => v.to_string(),
        Cell::Text(s) => s.clone(),
    }
}

impl<W: Write> FormatWriter for CsvWriter<W> {
    fn write_table_header(&mut self, _table: &str, columns: &[String]) -> io::Result<()> {
        self.columns = columns.to_vec();
        if self.with_header {
            self.writer.write_record(columns).map_err(io::Error::other)?;
        }
        Ok(())
    }

    fn write_row(&mut self, _row_index: u64, values: &RowValues) -> io::Result<()> {
        let record: Vec<String> = self
            .columns
            .iter()
            .map(|column| field(values.get(column).unwrap_or(&Cell::Null)))
            .collect();
        self.writer.write_record(&record).map_err(io::Error::other)
    }

    fn flush_table(&mut self) -> io::Result<()> {
        self.writer.flush()
    }
}
