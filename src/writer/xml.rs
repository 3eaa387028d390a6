//! XML destination writer.
//!
//! One `<table>` element per exported table, one `<row>` per record, one
//! element per column. NULL cells render as self-closing elements; text is
//! entity-escaped.

use std::io::{self, Write};

use crate::value::{Cell, RowValues};
use crate::writer::FormatWriter;

/// Writer for XML output.
pub struct XmlWriter<W: Write> {
    out: W,
    columns: Vec<String>,
    // Sanitized element name per column, same order as `columns`.
    elements: Vec<String>,
}

impl<W: Write> XmlWriter<W> {
    /// Creates an XML writer over `out`.
    pub fn new(out: W) -> Self {
        XmlWriter {
            out,
            columns: Vec::new(),
            elements: Vec::new(),
        }
    }

    /// Consumes the writer and returns the underlying sink.
    pub fn into_inner(self) -> W {
        self.out
    }
}

/// Turns a column name into a valid XML element name.
///
/// Query aliases can contain anything; characters that may not appear in an
/// element name are replaced with underscores, and a name that does not start
/// with a letter or underscore gets one prepended.
fn element_name(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        if c.is_alphanumeric() || matches!(c, '_' | '-' | '.') {
            out.push(c);
        } else {
            out.push('_');
        }
    }
    let starts_valid = out
        .chars()
        .next()
        .is_some_and(|c| c.is_alphabetic() || c == '_');
    if !starts_valid {
        out.insert(0, '_');
    }
    out
}

fn escape_xml(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

fn text(cell: &Cell) -> String {
    match cell {
        Cell::Null => String::new(),
        Cell::Bytes(data) => hex::encode(data),
        Cell::Int(v) => v.to_string(),
        Cell::Float(v) => v.to_string(),
        Cell::Timestamp(ts) => ts.to_rfc3339(),
        Cell::Bool(v) => v.to_string(),
        Cell::Text(s) => escape_xml(s),
    }
}

impl<W: Write> FormatWriter for XmlWriter<W> {
    fn write_file_header(&mut self) -> io::Result<()> {
        writeln!(self.out, "<?xml version=\"1.0\" encoding=\"UTF-8\"?>")?;
        writeln!(self.out, "<tables>")
    }

    fn write_table_header(&mut self, table: &str, columns: &[String]) -> io::Result<()> {
        self.columns = columns.to_vec();
        self.elements = columns.iter().map(|c| element_name(c)).collect();
        writeln!(self.out, "  <table name=\"{}\">", escape_xml(table))
    }

    fn write_row(&mut self, _row_index: u64, values: &RowValues) -> io::Result<()> {
        writeln!(self.out, "    <row>")?;
        for (column, element) in self.columns.iter().zip(&self.elements) {
            let cell = values.get(column).unwrap_or(&Cell::Null);
            if matches!(cell, Cell::Null) {
                writeln!(self.out, "      <{element}/>")?;
            } else {
                writeln!(self.out, "      <{element}>{}</{element}>", text(cell))?;
            }
        }
        writeln!(self.out, "    </row>")
    }

    fn flush_table(&mut self) -> io::Result<()> {
        writeln!(self.out, "  </table>")?;
        self.out.flush()
    }

    fn write_file_footer(&mut self) -> io::Result<()> {
        writeln!(self.out, "</tables>")?;
        self.out.flush()
    }
}
