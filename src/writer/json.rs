//! JSON destination writers.
//!
//! Two variants share the row rendering: [`JsonLinesWriter`] emits one object
//! per line, [`JsonArrayWriter`] one array document spanning the whole
//! session. Binary cells encode as base64 strings; NaN and infinite floats,
//! which JSON cannot represent, encode as null.

use std::io::{self, Write};

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde_json::{Map, Value};

use crate::value::{Cell, RowValues};
use crate::writer::FormatWriter;

fn json_value(cell: &Cell) -> Value {
    match cell {
        Cell::Null => Value::Null,
        Cell::Bytes(data) => Value::String(BASE64.encode(data)),
        Cell::Int(v) => Value::from(*v),
        Cell::Float(v) => serde_json::Number::from_f64(*v)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        Cell::Timestamp(ts) => Value::String(ts.to_rfc3339()),
        Cell::Bool(v) => Value::Bool(*v),
        Cell::Text(s) => Value::String(s.clone()),
    }
}

fn json_object(columns: &[String], values: &RowValues) -> Value {
    let mut object = Map::with_capacity(columns.len());
    for column in columns {
        let cell = values.get(column).unwrap_or(&Cell::Null);
        object.insert(column.clone(), json_value(cell));
    }
    Value::Object(object)
}

/// Newline-delimited JSON writer: one object per row.
pub struct JsonLinesWriter<W: Write> {
    out: W,
    columns: Vec<String>,
}

impl<W: Write> JsonLinesWriter<W> {
    /// Creates a JSON Lines writer over `out`.
    pub fn new(out: W) -> Self {
        JsonLinesWriter {
            out,
            columns: Vec::new(),
        }
    }

    /// Consumes the writer and returns the underlying sink.
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> FormatWriter for JsonLinesWriter<W> {
    fn write_table_header(&mut self, _table: &str, columns: &[String]) -> io::Result<()> {
        self.columns = columns.to_vec();
        Ok(())
    }

    fn write_row(&mut self, _row_index: u64, values: &RowValues) -> io::Result<()> {
        serde_json::to_writer(&mut self.out, &json_object(&self.columns, values))?;
        writeln!(self.out)
    }

    fn flush_table(&mut self) -> io::Result<()> {
        self.out.flush()
    }
}

/// Single-document JSON writer: all rows of the session in one array.
pub struct JsonArrayWriter<W: Write> {
    out: W,
    columns: Vec<String>,
    any_row_written: bool,
}

impl<W: Write> JsonArrayWriter<W> {
    /// Creates a JSON array writer over `out`.
    pub fn new(out: W) -> Self {
        JsonArrayWriter {
            out,
            columns: Vec::new(),
            any_row_written: false,
        }
    }

    /// Consumes the writer and returns the underlying sink.
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> FormatWriter for JsonArrayWriter<W> {
    fn write_file_header(&mut self) -> io::Result<()> {
        write!(self.out, "[")
    }

    fn write_table_header(&mut self, _table: &str, columns: &[String]) -> io::Result<()> {
        self.columns = columns.to_vec();
        Ok(())
    }

    fn write_row(&mut self, _row_index: u64, values: &RowValues) -> io::Result<()> {
        if self.any_row_written {
            write!(self.out, ",")?;
        }
        self.any_row_written = true;
        writeln!(self.out)?;
        serde_json::to_writer(&mut self.out, &json_object(&self.columns, values))?;
        Ok(())
    }

    fn flush_table(&mut self) -> io::Result<()> {
        self.out.flush()
    }

    fn write_file_footer(&mut self) -> io::Result<()> {
        writeln!(self.out, "\n]")?;
        self.out.flush()
    }
}
