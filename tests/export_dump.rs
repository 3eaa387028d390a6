//! Integration tests for the bulk-load dump pipeline: wire shape, toggles,
//! sequence repair, and per-table failure isolation, all against real SQLite
//! databases.

use std::io;

use tempfile::TempDir;

use tabcopy::{
    open_source_pool, run_session, DumpOptions, ExportError, FormatWriter, PgDumpWriter,
    RowValues, TableSpec,
};

#[path = "helpers.rs"]
mod helpers;

use helpers::{create_test_pool, seed_misc_types, seed_two_tables};

async fn dump_session(
    db: &sqlx::SqlitePool,
    specs: &[TableSpec],
    options: DumpOptions,
) -> (String, tabcopy::SessionReport) {
    let mut writer = PgDumpWriter::new(Vec::new(), options);
    let report = run_session(db, specs, &mut writer)
        .await
        .expect("session should not fail fatally");
    let out = String::from_utf8(writer.into_inner()).expect("dump output is UTF-8");
    (out, report)
}

#[tokio::test]
async fn end_to_end_two_tables_exact_wire_shape() {
    let dir = TempDir::new().unwrap();
    let pool = create_test_pool(&dir.path().join("test.db")).await;
    seed_two_tables(&pool).await;

    let specs = vec![TableSpec::new("t1"), TableSpec::new("t2")];
    let (out, report) = dump_session(&pool, &specs, DumpOptions::default()).await;

    assert_eq!(
        out,
        "begin transaction;\n\
         \n\
         -- t1\n\
         \n\
         copy t1 (id,name) from stdin;\n\
         1\ta\n\
         2\t\\N\n\
         \\.\n\
         \n\
         -- t2\n\
         \n\
         copy t2 (id) from stdin;\n\
         \\.\n\
         \n\
         commit;\n"
    );
    assert_eq!(report.tables_exported, 2);
    assert_eq!(report.tables_failed, 0);
    assert_eq!(report.total_rows, 2);
}

#[tokio::test]
async fn failing_table_is_isolated_and_footer_written_once() {
    let dir = TempDir::new().unwrap();
    let pool = create_test_pool(&dir.path().join("test.db")).await;
    seed_two_tables(&pool).await;

    // First spec queries a table that does not exist.
    let specs = vec![TableSpec::new("missing"), TableSpec::new("t1")];
    let (out, report) = dump_session(&pool, &specs, DumpOptions::default()).await;

    assert_eq!(report.tables_failed, 1);
    assert_eq!(report.tables_exported, 1);

    // The failed table produced no block at all.
    assert!(!out.contains("-- missing"));

    // t1's full block is present and the envelope appears exactly once.
    assert!(out.contains("copy t1 (id,name) from stdin;\n1\ta\n2\t\\N\n\\.\n"));
    assert_eq!(out.matches("begin transaction;").count(), 1);
    assert_eq!(out.matches("commit;").count(), 1);
}

#[tokio::test]
async fn undecodable_cell_abandons_the_table_but_not_the_session() {
    let dir = TempDir::new().unwrap();
    let pool = create_test_pool(&dir.path().join("test.db")).await;
    seed_two_tables(&pool).await;

    // Second row's DATETIME cell holds text that cannot decode.
    sqlx::query("CREATE TABLE events (id INTEGER, seen DATETIME)")
        .execute(&pool)
        .await
        .unwrap();
    sqlx::query("INSERT INTO events (id, seen) VALUES (1, '2024-01-15T10:30:00+00:00')")
        .execute(&pool)
        .await
        .unwrap();
    sqlx::query("INSERT INTO events (id, seen) VALUES (2, 'not a timestamp')")
        .execute(&pool)
        .await
        .unwrap();

    let specs = vec![TableSpec::new("events"), TableSpec::new("t1")];
    let (out, report) = dump_session(&pool, &specs, DumpOptions::default()).await;

    assert_eq!(report.tables_failed, 1);
    assert_eq!(report.tables_exported, 1);

    // The failing table's block starts, carries the rows decoded before the
    // bad cell, and is left unterminated.
    let events_block = out
        .split("-- t1")
        .next()
        .expect("events block precedes t1");
    assert!(events_block.contains("copy events (id,seen) from stdin;\n"));
    assert!(events_block.contains("1\t2024-01-15T10:30:00+00:00\n"));
    assert!(!events_block.contains("2\t"));
    assert!(!events_block.contains("\\.\n"));

    // The next table and the envelope are unaffected.
    assert!(out.contains("copy t1 (id,name) from stdin;\n1\ta\n2\t\\N\n\\.\n"));
    assert_eq!(out.matches("commit;").count(), 1);
}

#[tokio::test]
async fn sequence_fix_follows_observed_max_id() {
    let dir = TempDir::new().unwrap();
    let pool = create_test_pool(&dir.path().join("test.db")).await;
    sqlx::query("CREATE TABLE users (id INTEGER, name TEXT)")
        .execute(&pool)
        .await
        .unwrap();
    sqlx::query("INSERT INTO users (id, name) VALUES (7, 'a'), (42, 'b')")
        .execute(&pool)
        .await
        .unwrap();

    let spec = TableSpec {
        id: Some("id".into()),
        sequence: Some("users_id_seq".into()),
        ..TableSpec::new("users")
    };
    let (out, _) = dump_session(&pool, &[spec], DumpOptions::default()).await;

    assert!(out.contains("select setval('users_id_seq', 42);\n"));
}

#[tokio::test]
async fn sequence_fix_skipped_for_empty_table_and_unset_spec() {
    let dir = TempDir::new().unwrap();
    let pool = create_test_pool(&dir.path().join("test.db")).await;
    seed_two_tables(&pool).await;

    // t2 is empty: max(id) coalesces to 0, so no setval even with the pair set.
    let with_pair = TableSpec {
        id: Some("id".into()),
        sequence: Some("t2_id_seq".into()),
        ..TableSpec::new("t2")
    };
    // t1 has rows but no id/sequence pair configured.
    let without_pair = TableSpec::new("t1");

    let (out, _) = dump_session(&pool, &[with_pair, without_pair], DumpOptions::default()).await;
    assert!(!out.contains("setval"));
}

#[tokio::test]
async fn toggles_shape_the_envelope_and_table_blocks() {
    let dir = TempDir::new().unwrap();
    let pool = create_test_pool(&dir.path().join("test.db")).await;
    seed_two_tables(&pool).await;

    let specs = vec![TableSpec::new("t1"), TableSpec::new("t2")];
    let options = DumpOptions {
        truncate: true,
        replica_mode: true,
    };
    let (out, _) = dump_session(&pool, &specs, options).await;

    assert!(out.contains("set constraints all deferred;\n"));
    assert!(out.contains("set session_replication_role to replica;\n"));
    assert!(out.contains("set session_replication_role to default;\ncommit;\n"));
    assert!(out.contains("truncate table t1 cascade;\ncopy t1 "));
    assert!(out.contains("truncate table t2 cascade;\ncopy t2 "));
}

#[tokio::test]
async fn every_cell_variant_survives_the_trip() {
    let dir = TempDir::new().unwrap();
    let pool = create_test_pool(&dir.path().join("test.db")).await;
    seed_misc_types(&pool).await;

    let (out, _) = dump_session(&pool, &[TableSpec::new("misc")], DumpOptions::default()).await;

    assert!(out.contains("copy misc (txt,bin,flt,flag,seen) from stdin;\n"));
    assert!(out.contains("a\\tb\\nc\\\\d\t\\xDEAD\t2.5\ttrue\t2024-01-15T10:30:00+00:00\n"));
}

#[tokio::test]
async fn source_pool_rejects_missing_database_file() {
    let dir = TempDir::new().unwrap();
    let err = open_source_pool(&dir.path().join("nope.db"))
        .await
        .expect_err("missing file should not open");
    assert!(matches!(err, ExportError::Config(_)));
    assert!(err.is_fatal());
}

#[tokio::test]
async fn read_only_source_pool_exports_seeded_data() {
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("test.db");
    {
        let rw = create_test_pool(&db_path).await;
        seed_two_tables(&rw).await;
        rw.close().await;
    }

    let pool = open_source_pool(&db_path).await.unwrap();
    let (out, report) = dump_session(&pool, &[TableSpec::new("t1")], DumpOptions::default()).await;
    assert_eq!(report.total_rows, 2);
    assert!(out.contains("1\ta\n"));
}

/// Records every writer call so protocol ordering can be asserted.
#[derive(Default)]
struct RecordingWriter {
    events: Vec<Event>,
}

#[derive(Debug, PartialEq)]
enum Event {
    FileHeader,
    TableHeader(String, Vec<String>),
    Row(u64),
    FlushTable,
    SequenceFix(String, i64),
    FileFooter,
}

impl FormatWriter for RecordingWriter {
    fn write_file_header(&mut self) -> io::Result<()> {
        self.events.push(Event::FileHeader);
        Ok(())
    }

    fn write_table_header(&mut self, table: &str, columns: &[String]) -> io::Result<()> {
        self.events
            .push(Event::TableHeader(table.to_string(), columns.to_vec()));
        Ok(())
    }

    fn write_row(&mut self, row_index: u64, _values: &RowValues) -> io::Result<()> {
        self.events.push(Event::Row(row_index));
        Ok(())
    }

    fn flush_table(&mut self) -> io::Result<()> {
        self.events.push(Event::FlushTable);
        Ok(())
    }

    fn add_sequence_fix(&mut self, sequence: &str, new_value: i64) -> io::Result<()> {
        self.events
            .push(Event::SequenceFix(sequence.to_string(), new_value));
        Ok(())
    }

    fn write_file_footer(&mut self) -> io::Result<()> {
        self.events.push(Event::FileFooter);
        Ok(())
    }
}

#[tokio::test]
async fn writer_protocol_ordering_and_row_indices() {
    let dir = TempDir::new().unwrap();
    let pool = create_test_pool(&dir.path().join("test.db")).await;
    sqlx::query("CREATE TABLE t (id INTEGER)")
        .execute(&pool)
        .await
        .unwrap();
    sqlx::query("INSERT INTO t (id) VALUES (10), (20), (30)")
        .execute(&pool)
        .await
        .unwrap();

    let spec = TableSpec {
        id: Some("id".into()),
        sequence: Some("t_id_seq".into()),
        ..TableSpec::new("t")
    };
    let mut writer = RecordingWriter::default();
    run_session(&pool, &[spec], &mut writer).await.unwrap();

    assert_eq!(
        writer.events,
        vec![
            Event::FileHeader,
            Event::TableHeader("t".to_string(), vec!["id".to_string()]),
            Event::Row(0),
            Event::Row(1),
            Event::Row(2),
            Event::FlushTable,
            Event::SequenceFix("t_id_seq".to_string(), 30),
            Event::FileFooter,
        ]
    );
}

#[tokio::test]
async fn empty_table_still_gets_header_and_exactly_one_flush() {
    let dir = TempDir::new().unwrap();
    let pool = create_test_pool(&dir.path().join("test.db")).await;
    sqlx::query("CREATE TABLE empty_t (id INTEGER, label TEXT)")
        .execute(&pool)
        .await
        .unwrap();

    let mut writer = RecordingWriter::default();
    run_session(&pool, &[TableSpec::new("empty_t")], &mut writer)
        .await
        .unwrap();

    assert_eq!(
        writer.events,
        vec![
            Event::FileHeader,
            Event::TableHeader(
                "empty_t".to_string(),
                vec!["id".to_string(), "label".to_string()]
            ),
            Event::FlushTable,
            Event::FileFooter,
        ]
    );
}

#[tokio::test]
async fn failed_table_gets_no_flush_but_session_footer_still_arrives() {
    let dir = TempDir::new().unwrap();
    let pool = create_test_pool(&dir.path().join("test.db")).await;
    seed_two_tables(&pool).await;

    let specs = vec![TableSpec::new("missing"), TableSpec::new("t2")];
    let mut writer = RecordingWriter::default();
    let report = run_session(&pool, &specs, &mut writer).await.unwrap();

    assert_eq!(report.tables_failed, 1);
    let flushes = writer
        .events
        .iter()
        .filter(|e| matches!(e, Event::FlushTable))
        .count();
    assert_eq!(flushes, 1);
    assert_eq!(writer.events.last(), Some(&Event::FileFooter));
}
