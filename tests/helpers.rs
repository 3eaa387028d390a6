// Shared test helpers for database setup and test data creation.
//
// Integration tests run against real SQLite files in a tempdir: seeding goes
// through a read-write pool, and the same file can then be opened through the
// library's read-only source pool.

use std::path::Path;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;

/// Creates (or opens) a test database file with a single-connection pool.
#[allow(dead_code)] // Used by other test files
pub async fn create_test_pool(db_path: &Path) -> SqlitePool {
    let options = SqliteConnectOptions::new()
        .filename(db_path)
        .create_if_missing(true);

    SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await
        .expect("Failed to create test database pool")
}

/// Seeds the two-table fixture from the end-to-end scenario:
/// t1 holds (1, "a") and (2, NULL); t2 exists but is empty.
#[allow(dead_code)]
pub async fn seed_two_tables(pool: &SqlitePool) {
    sqlx::query("CREATE TABLE t1 (id INTEGER, name TEXT)")
        .execute(pool)
        .await
        .expect("Failed to create t1");
    sqlx::query("INSERT INTO t1 (id, name) VALUES (1, 'a'), (2, NULL)")
        .execute(pool)
        .await
        .expect("Failed to seed t1");
    sqlx::query("CREATE TABLE t2 (id INTEGER)")
        .execute(pool)
        .await
        .expect("Failed to create t2");
}

/// Seeds a table exercising every cell variant: text with characters that
/// need escaping, binary data, a float, a boolean, and a timestamp.
#[allow(dead_code)]
pub async fn seed_misc_types(pool: &SqlitePool) {
    sqlx::query(
        "CREATE TABLE misc (txt TEXT, bin BLOB, flt REAL, flag BOOLEAN, seen DATETIME)",
    )
    .execute(pool)
    .await
    .expect("Failed to create misc");

    sqlx::query("INSERT INTO misc (txt, bin, flt, flag, seen) VALUES (?, ?, ?, ?, ?)")
        .bind("a\tb\nc\\d")
        .bind(&[0xDEu8, 0xAD][..])
        .bind(2.5f64)
        .bind(true)
        .bind("2024-01-15T10:30:00+00:00")
        .execute(pool)
        .await
        .expect("Failed to seed misc");
}
