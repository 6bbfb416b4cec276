//! End-to-end script runs against SQLite databases
//!
//! Covers per-statement commit and rollback through the public API.

use pgscript::{SqliteExecutor, StatementExecutor, load_statements, run_statements, split_sql_statements};
use std::io::Write;

const SCHEMA_SCRIPT: &str = r#"
-- Titles catalog
CREATE TABLE titles (
    show_id TEXT PRIMARY KEY,
    title TEXT NOT NULL,
    release_year INTEGER
);

INSERT INTO titles VALUES ('s1', 'Sample Movie 1', 2001);
INSERT INTO titles VALUES ('s2', 'Semicolons; inside; strings', 2010);
-- duplicate key fails, the rest of the script keeps going
INSERT INTO titles VALUES ('s1', 'Duplicate', 1999);
INSERT INTO titles VALUES ('s3', 'It''s quoted', 2020);
SELECT show_id, title FROM titles ORDER BY show_id
"#;

fn count_titles(executor: &SqliteExecutor) -> i64 {
    executor
        .connection()
        .query_row("SELECT COUNT(*) FROM titles", [], |row| row.get(0))
        .unwrap()
}

#[tokio::test]
async fn test_script_with_failing_statement_keeps_going() {
    let statements = split_sql_statements(SCHEMA_SCRIPT);
    assert_eq!(statements.len(), 6);

    let mut executor = SqliteExecutor::open_in_memory().unwrap();
    let report = run_statements(&mut executor, &statements).await;

    assert_eq!(report.total, 6);
    assert_eq!(report.executed, 5);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].index, 4);
    assert!(report.failures[0].preview.starts_with("INSERT INTO titles VALUES ('s1', 'Duplicate'"));
    assert_eq!(report.to_string(), "Successfully executed 5/6 statements");

    // Everything except the duplicate was committed
    assert_eq!(count_titles(&executor), 3);
    let title: String = executor
        .connection()
        .query_row("SELECT title FROM titles WHERE show_id = 's2'", [], |row| {
            row.get(0)
        })
        .unwrap();
    assert_eq!(title, "Semicolons; inside; strings");
    assert!(executor.connection().is_autocommit());
}

#[tokio::test]
async fn test_committed_statements_persist_in_database_file() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("netflix.db");
    let script_path = dir.path().join("load.sql");

    let mut script = std::fs::File::create(&script_path).unwrap();
    script.write_all(SCHEMA_SCRIPT.as_bytes()).unwrap();
    drop(script);

    let statements = load_statements(&script_path).unwrap();
    let mut executor = SqliteExecutor::open(&db_path).unwrap();
    let report = run_statements(&mut executor, &statements).await;
    executor.close().await.unwrap();
    assert_eq!(report.executed, 5);

    let reopened = SqliteExecutor::open(&db_path).unwrap();
    assert_eq!(count_titles(&reopened), 3);
}

#[tokio::test]
async fn test_select_rows_are_returned_as_json_objects() {
    let mut executor = SqliteExecutor::open_in_memory().unwrap();
    for statement in split_sql_statements(SCHEMA_SCRIPT).iter().take(3) {
        executor.execute(statement).await.unwrap();
        executor.commit().await.unwrap();
    }

    let rows = executor
        .execute("SELECT show_id, release_year FROM titles ORDER BY show_id")
        .await
        .unwrap();
    assert_eq!(
        rows,
        vec![
            serde_json::json!({"show_id": "s1", "release_year": 2001}),
            serde_json::json!({"show_id": "s2", "release_year": 2010}),
        ]
    );
}
