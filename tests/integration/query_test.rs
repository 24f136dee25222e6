//! Query execution integration tests.
//!
//! Tests SQL execution, row materialization and failure reporting.

use pretty_assertions::assert_eq;
use std::sync::Arc;
use tempfile::{tempdir, TempDir};
use toolbox::db::{ConnectionPolicy, Params, QueryExecutor, Row};
use toolbox::error::ToolboxError;
use toolbox::logging::{RecordingReporter, CONNECTION_FAILURE_PREFIX, QUERY_FAILURE_PREFIX};

/// Creates a SQLite file holding `T(id, name)` with rows (1, "a") and (2, "b").
fn seeded_database() -> (TempDir, String) {
    let dir = tempdir().unwrap();
    let url = format!(
        "sqlite://{}?mode=rwc",
        dir.path().join("toolbox.db").display()
    );

    let mut executor = QueryExecutor::new(&url);
    executor
        .try_query("CREATE TABLE T (id INTEGER PRIMARY KEY, name TEXT)", None)
        .unwrap();
    executor
        .try_query("INSERT INTO T (id, name) VALUES (1, 'a'), (2, 'b')", None)
        .unwrap();
    executor.close().unwrap();

    (dir, url)
}

fn executor_for(url: &str, policy: ConnectionPolicy) -> (QueryExecutor, Arc<RecordingReporter>) {
    let reporter = Arc::new(RecordingReporter::new());
    let executor = QueryExecutor::with_reporter(url, policy, reporter.clone());
    (executor, reporter)
}

fn row(pairs: &[(&str, &str)]) -> Row {
    pairs.iter().copied().collect()
}

#[test]
fn test_select_returns_rows_in_order() {
    let (_dir, url) = seeded_database();
    let (mut executor, reporter) = executor_for(&url, ConnectionPolicy::KeepOpen);

    let rows = executor.query("SELECT id, name FROM T ORDER BY id", None);

    assert_eq!(
        rows,
        vec![
            row(&[("id", "1"), ("name", "a")]),
            row(&[("id", "2"), ("name", "b")]),
        ]
    );
    assert_eq!(reporter.count(), 0);
}

#[test]
fn test_rows_serialize_with_column_order() {
    let (_dir, url) = seeded_database();
    let (mut executor, _) = executor_for(&url, ConnectionPolicy::KeepOpen);

    let rows = executor.query("SELECT name, id FROM T ORDER BY id", None);
    let json = serde_json::to_string(&rows).unwrap();

    assert_eq!(json, r#"[{"name":"a","id":"1"},{"name":"b","id":"2"}]"#);
}

#[test]
fn test_zero_rows_reports_nothing() {
    let (_dir, url) = seeded_database();
    let (mut executor, reporter) = executor_for(&url, ConnectionPolicy::KeepOpen);

    let rows = executor.query("SELECT id, name FROM T WHERE id > 100", None);

    assert!(rows.is_empty());
    assert_eq!(reporter.count(), 0);
}

#[test]
fn test_every_row_has_every_column() {
    let (_dir, url) = seeded_database();
    let (mut executor, _) = executor_for(&url, ConnectionPolicy::KeepOpen);

    let rows = executor.query("SELECT id, name, id * 10 AS scaled FROM T", None);

    assert_eq!(rows.len(), 2);
    for row in &rows {
        assert_eq!(row.len(), 3);
        assert_eq!(row.columns().collect::<Vec<_>>(), vec!["id", "name", "scaled"]);
    }
}

#[test]
fn test_unopenable_connection_reports_one_connection_failure() {
    let dir = tempdir().unwrap();
    let url = format!(
        "sqlite://{}",
        dir.path().join("missing").join("nested").join("db.sqlite").display()
    );
    let (mut executor, reporter) = executor_for(&url, ConnectionPolicy::KeepOpen);

    let rows = executor.query("SELECT 1", None);

    assert!(rows.is_empty());
    assert!(!executor.is_open());
    let reports = reporter.reports();
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].0, CONNECTION_FAILURE_PREFIX);
    assert!(matches!(reports[0].1, ToolboxError::Connection(_)));
}

#[test]
fn test_unsupported_scheme_fails_every_query() {
    let (mut executor, reporter) =
        executor_for("mssql://localhost/db", ConnectionPolicy::KeepOpen);
    assert_eq!(reporter.count(), 1);

    assert!(executor.query("SELECT 1", None).is_empty());
    assert!(executor.query("SELECT 2", None).is_empty());

    let reports = reporter.reports();
    assert_eq!(reports.len(), 3);
    assert!(reports
        .iter()
        .all(|(_, e)| matches!(e, ToolboxError::Connection(_))));
}

#[test]
fn test_malformed_statement_reports_one_execution_failure() {
    let (_dir, url) = seeded_database();
    let (mut executor, reporter) = executor_for(&url, ConnectionPolicy::KeepOpen);

    let rows = executor.query("SELECT id FROM", None);

    assert!(rows.is_empty());
    let reports = reporter.reports();
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].0, QUERY_FAILURE_PREFIX);
    assert!(matches!(reports[0].1, ToolboxError::Execution(_)));

    // The connection survives the failed statement.
    assert!(executor.is_open());
    assert_eq!(executor.query("SELECT id FROM T", None).len(), 2);
}

#[test]
fn test_try_query_returns_typed_failure() {
    let (_dir, url) = seeded_database();
    let (mut executor, reporter) = executor_for(&url, ConnectionPolicy::KeepOpen);

    let err = executor.try_query("SELECT * FROM nonexistent_table_xyz", None).unwrap_err();

    assert!(matches!(err, ToolboxError::Execution(_)));
    assert!(err.to_string().contains("nonexistent_table_xyz"));
    assert_eq!(reporter.count(), 0);
}

#[test]
fn test_named_parameters_bind_each_entry() {
    let (_dir, url) = seeded_database();
    let (mut executor, _) = executor_for(&url, ConnectionPolicy::KeepOpen);

    let params: Params = [
        ("@name".to_string(), "b".to_string()),
        ("unused".to_string(), "x".to_string()),
    ]
    .into();
    let rows = executor.query("SELECT id FROM T WHERE name = @name", Some(&params));

    assert_eq!(rows, vec![row(&[("id", "2")])]);
}

#[test]
fn test_statement_without_parameters_runs_verbatim() {
    let (_dir, url) = seeded_database();
    let (mut executor, _) = executor_for(&url, ConnectionPolicy::KeepOpen);

    let rows = executor.query("SELECT ':name' AS literal FROM T WHERE name = 'a'", None);

    assert_eq!(rows, vec![row(&[("literal", ":name")])]);
}

#[test]
fn test_repeated_query_is_idempotent() {
    let (_dir, url) = seeded_database();
    let (mut executor, _) = executor_for(&url, ConnectionPolicy::KeepOpen);

    let first = executor.query("SELECT id, name FROM T ORDER BY id", None);
    let second = executor.query("SELECT id, name FROM T ORDER BY id", None);

    assert_eq!(first, second);
    assert_eq!(first.len(), 2);
}

#[test]
fn test_close_after_query_reopens_each_time() {
    let (_dir, url) = seeded_database();
    let (mut executor, reporter) = executor_for(&url, ConnectionPolicy::CloseAfterQuery);

    assert_eq!(executor.query("SELECT id FROM T", None).len(), 2);
    assert!(!executor.is_open());

    executor.query("INSERT INTO T (id, name) VALUES (3, 'c')", None);
    assert!(!executor.is_open());

    assert_eq!(executor.query("SELECT id FROM T", None).len(), 3);
    assert!(executor.query("SELECT broken FROM", None).is_empty());
    assert!(!executor.is_open());
    assert_eq!(reporter.count(), 1);
}

#[test]
fn test_keep_open_holds_one_connection() {
    let (_dir, url) = seeded_database();
    let (mut executor, _) = executor_for(&url, ConnectionPolicy::KeepOpen);

    assert!(!executor.is_open());
    executor.query("SELECT id FROM T", None);
    assert!(executor.is_open());
    executor.query("SELECT name FROM T", None);
    assert!(executor.is_open());

    executor.close().unwrap();
    assert!(!executor.is_open());
}

#[test]
fn test_null_renders_as_empty_string() {
    let (_dir, url) = seeded_database();
    let (mut executor, _) = executor_for(&url, ConnectionPolicy::KeepOpen);

    executor.query("INSERT INTO T (id, name) VALUES (3, NULL)", None);
    let rows = executor.query("SELECT name FROM T WHERE id = 3", None);

    assert_eq!(rows, vec![row(&[("name", "")])]);
}
