//! tabcopy library: single-pass relational table export.
//!
//! This library exports tables from a SQLite database into destination text
//! formats over one read-consistent transaction. The flagship destination is
//! a transactional PostgreSQL bulk-load dump (`copy ... from stdin` blocks
//! with optional truncate/replica toggles and post-load sequence repair);
//! CSV/TSV, JSON Lines, JSON array, and XML writers honor the same contract
//! with format-native rendering.
//!
//! # Example
//!
//! ```no_run
//! use tabcopy::{open_source_pool, run_session, DumpOptions, PgDumpWriter, TableSpec};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let pool = open_source_pool(std::path::Path::new("app.db")).await?;
//! let specs = vec![TableSpec::new("users"), TableSpec::new("orders")];
//! let mut writer = PgDumpWriter::new(std::io::stdout(), DumpOptions::default());
//! let report = run_session(&pool, &specs, &mut writer).await?;
//! eprintln!("{} tables, {} rows", report.tables_exported, report.total_rows);
//! # Ok(())
//! # }
//! ```
//!
//! Sessions are strictly sequential by design: one transaction, one writer,
//! tables in declared order. That is what makes the single-snapshot guarantee
//! meaningful, so there is no parallel mode.

#![warn(missing_docs)]

pub mod cli;
pub mod config;
pub mod error;
pub mod exporter;
pub mod session;
pub mod source;
pub mod value;
pub mod writer;

// Re-export public API
pub use config::{load_table_list, DumpOptions, TableSpec};
pub use error::ExportError;
pub use exporter::{export_table, TableReport};
pub use session::{run_session, SessionReport};
pub use source::open_source_pool;
pub use value::{decode_row, escape_pg_text, Cell, RowValues};
pub use writer::{
    CsvWriter, FormatWriter, JsonArrayWriter, JsonLinesWriter, PgDumpWriter, XmlWriter,
};
