//! Transactional PostgreSQL bulk-load dump writer.
//!
//! Produces a single text dump consumable by `psql`:
//!
//! ```text
//! begin transaction;
//! [set constraints all deferred;]
//! [set session_replication_role to replica;]
//!
//! -- users
//!
//! [truncate table users cascade;]
//! copy users (id,name) from stdin;
//! 1\talice
//! 2\t\N
//! \.
//!
//! [select setval('users_id_seq', 2);]
//!
//! [set session_replication_role to default;]
//! commit;
//! ```
//!
//! Everything loads inside one transaction; with replica mode enabled,
//! constraint checks are deferred and trigger-based replication is disabled
//! for the duration of the load.

use std::io::{self, Write};

use log::info;

use crate::config::DumpOptions;
use crate::value::{Cell, RowValues};
use crate::writer::FormatWriter;

/// Writer for the transactional bulk-load dump format.
pub struct PgDumpWriter<W: Write> {
    out: W,
    options: DumpOptions,
    // Column order recorded by the current table's header.
    columns: Vec<String>,
}

impl<W: Write> PgDumpWriter<W> {
    /// Creates a dump writer over `out` with the given toggles.
    pub fn new(out: W, options: DumpOptions) -> Self {
        PgDumpWriter {
            out,
            options,
            columns: Vec::new(),
        }
    }

    /// Consumes the writer and returns the underlying sink.
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> FormatWriter for PgDumpWriter<W> {
    fn write_file_header(&mut self) -> io::Result<()> {
        writeln!(self.out, "begin transaction;")?;
        if self.options.replica_mode {
            writeln!(self.out, "set constraints all deferred;")?;
            writeln!(self.out, "set session_replication_role to replica;")?;
        }
        writeln!(self.out)
    }

    fn write_table_header(&mut self, table: &str, columns: &[String]) -> io::Result<()> {
        self.columns = columns.to_vec();

        writeln!(self.out, "-- {table}")?;
        writeln!(self.out)?;
        if self.options.truncate {
            writeln!(self.out, "truncate table {table} cascade;")?;
        }
        writeln!(self.out, "copy {table} ({}) from stdin;", columns.join(","))
    }

    fn write_row(&mut self, _row_index: u64, values: &RowValues) -> io::Result<()> {
        let mut line = String::new();
        for (i, column) in self.columns.iter().enumerate() {
            if i > 0 {
                line.push('\t');
            }
            let cell = values.get(column).unwrap_or(&Cell::Null);
            line.push_str(&cell.to_pg_text());
        }
        writeln!(self.out, "{line}")
    }

    fn flush_table(&mut self) -> io::Result<()> {
        writeln!(self.out, "\\.")?;
        writeln!(self.out)?;
        self.out.flush()
    }

    fn add_sequence_fix(&mut self, sequence: &str, new_value: i64) -> io::Result<()> {
        writeln!(self.out, "select setval('{sequence}', {new_value});")?;
        writeln!(self.out)?;
        info!("sequence {sequence} advanced to {new_value}");
        Ok(())
    }

    fn write_file_footer(&mut self) -> io::Result<()> {
        if self.options.replica_mode {
            writeln!(self.out, "set session_replication_role to default;")?;
        }
        writeln!(self.out, "commit;")?;
        self.out.flush()
    }
}
