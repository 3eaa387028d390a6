//! Table-list configuration and export tunables.
//!
//! A multi-table export is driven by an ordered list of [`TableSpec`] entries,
//! loaded from a TOML file:
//!
//! ```toml
//! [[tables]]
//! name = "users"
//! id = "id"
//! sequence = "users_id_seq"
//!
//! [[tables]]
//! name = "orders"
//! sql = "select * from orders where deleted = 0"
//! ```
//!
//! Declaration order is preserved and becomes the export order.

use std::path::Path;

use serde::Deserialize;

use crate::error::ExportError;

/// Progress is logged every this many rows during a table export.
///
/// Observability only: the cadence never shows up in the destination output.
pub const PROGRESS_EVERY: u64 = 10_000;

/// One table to export.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct TableSpec {
    /// Table name, used in load markers and as the default query target
    pub name: String,

    /// Query override; defaults to `select * from <name>`
    #[serde(default)]
    pub sql: Option<String>,

    /// Primary-key column for the post-load sequence probe
    #[serde(default)]
    pub id: Option<String>,

    /// Sequence to advance past the observed max id
    #[serde(default)]
    pub sequence: Option<String>,
}

impl TableSpec {
    /// Creates a spec that exports the whole table with no sequence repair.
    pub fn new(name: impl Into<String>) -> Self {
        TableSpec {
            name: name.into(),
            sql: None,
            id: None,
            sequence: None,
        }
    }

    /// The query to run for this table.
    pub fn query(&self) -> String {
        self.sql
            .clone()
            .unwrap_or_else(|| format!("select * from {}", self.name))
    }

    /// The (id column, sequence name) pair, when both are configured.
    ///
    /// Sequence repair only runs when both halves are present.
    pub fn sequence_fix(&self) -> Option<(&str, &str)> {
        match (self.id.as_deref(), self.sequence.as_deref()) {
            (Some(id), Some(sequence)) => Some((id, sequence)),
            _ => None,
        }
    }
}

/// Global toggles for the bulk-load dump writer.
#[derive(Clone, Copy, Debug, Default)]
pub struct DumpOptions {
    /// Emit `truncate table ... cascade;` before each table's load block
    pub truncate: bool,
    /// Defer constraints and switch the session to replica role for the load
    pub replica_mode: bool,
}

#[derive(Debug, Deserialize)]
struct TableList {
    #[serde(default)]
    tables: Vec<TableSpec>,
}

/// Loads an ordered table list from a TOML file.
///
/// # Errors
///
/// Returns [`ExportError::Config`] when the file cannot be read, does not
/// parse, or declares no tables.
pub fn load_table_list(path: &Path) -> Result<Vec<TableSpec>, ExportError> {
    let raw = std::fs::read_to_string(path).map_err(|e| {
        ExportError::Config(format!("cannot read table list {}: {e}", path.display()))
    })?;

    let list: TableList = toml::from_str(&raw).map_err(|e| {
        ExportError::Config(format!("cannot parse table list {}: {e}", path.display()))
    })?;

    if list.tables.is_empty() {
        return Err(ExportError::Config(format!(
            "table list {} declares no tables",
            path.display()
        )));
    }

    Ok(list.tables)
}
