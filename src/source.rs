//! Source database access.
//!
//! The export pipeline reads from a SQLite database opened read-only. One
//! connection is enough: the session is strictly sequential and everything
//! runs inside a single transaction.

use std::path::Path;

use log::info;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;

use crate::error::ExportError;

/// Opens the source database read-only.
///
/// # Errors
///
/// [`ExportError::Config`] when the file does not exist,
/// [`ExportError::Connection`] when it cannot be opened.
pub async fn open_source_pool(db_path: &Path) -> Result<SqlitePool, ExportError> {
    if !db_path.exists() {
        return Err(ExportError::Config(format!(
            "database file {} does not exist",
            db_path.display()
        )));
    }

    let options = SqliteConnectOptions::new()
        .filename(db_path)
        .read_only(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await
        .map_err(ExportError::Connection)?;

    info!("opened source database {} read-only", db_path.display());
    Ok(pool)
}
