//! Export error taxonomy.
//!
//! Errors split into two severities:
//! - **Fatal**: the session cannot continue (no connection, bad table list, or
//!   a failed write to the destination, after which later statements cannot be
//!   trusted).
//! - **Per-table**: the current table is abandoned and reported, and the
//!   session moves on to the next table.

use thiserror::Error;

/// Errors produced by the export pipeline.
#[derive(Debug, Error)]
pub enum ExportError {
    /// The source database could not be opened or the transaction could not
    /// be acquired. Fatal: nothing has been exported.
    #[error("failed to open source database: {0}")]
    Connection(#[source] sqlx::Error),

    /// The table list or CLI configuration is malformed. Fatal: raised before
    /// any table is processed.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// A query failed for one table. Recoverable: the table is reported and
    /// skipped, the session continues.
    #[error("query failed for table {table:?}: {source}")]
    Query {
        /// Table the failing query belongs to
        table: String,
        /// Underlying database error
        source: sqlx::Error,
    },

    /// A cell could not be decoded into the closed value model. Treated like
    /// a query failure for that table: remaining rows are abandoned, the
    /// session continues.
    #[error("could not decode column {column:?} of table {table:?}: {source}")]
    Encoding {
        /// Table the cell belongs to
        table: String,
        /// Column that failed to decode
        column: String,
        /// Underlying decode error
        source: sqlx::Error,
    },

    /// A write to the destination sink failed. Fatal: destination integrity
    /// is compromised, the whole session aborts.
    #[error("write to destination failed: {0}")]
    Sink(#[from] std::io::Error),
}

impl ExportError {
    /// Whether this error aborts the whole session rather than one table.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            ExportError::Connection(_) | ExportError::Config(_) | ExportError::Sink(_)
        )
    }
}
