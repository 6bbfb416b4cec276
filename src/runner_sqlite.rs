use crate::{
    result::Result,
    runner::StatementExecutor,
    str_utils::{TransactionControl, transaction_control},
};
use rusqlite::{Batch, Connection, fallible_iterator::FallibleIterator};
use std::path::Path;
use tracing::warn;

// Map a single SQLite value to JSON
fn value_ref_to_json(value: rusqlite::types::ValueRef<'_>) -> serde_json::Value {
    match value {
        rusqlite::types::ValueRef::Integer(i) => serde_json::Value::Number(i.into()),
        rusqlite::types::ValueRef::Real(r) => serde_json::Number::from_f64(r)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        rusqlite::types::ValueRef::Text(s) => {
            serde_json::Value::String(String::from_utf8_lossy(s).to_string())
        }
        rusqlite::types::ValueRef::Blob(b) => serde_json::Value::Array(
            b.iter()
                .map(|&byte| serde_json::Value::Number(byte.into()))
                .collect(),
        ),
        rusqlite::types::ValueRef::Null => serde_json::Value::Null,
    }
}

/// SQLite backend, mainly for running scripts against local database files.
/// An open transaction is detected through the connection's autocommit flag,
/// so `BEGIN`/`COMMIT` written in a script are run as-is instead of nesting.
pub struct SqliteExecutor {
    conn: Connection,
}

impl SqliteExecutor {
    pub fn new(conn: Connection) -> Self {
        Self { conn }
    }

    /// Open (or create) a database file
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(Self::new(Connection::open(path)?))
    }

    pub fn open_in_memory() -> Result<Self> {
        Ok(Self::new(Connection::open_in_memory()?))
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    fn finish_transaction(&mut self, command: &str) -> Result<()> {
        if self.conn.is_autocommit() {
            return Ok(());
        }
        self.conn.execute_batch(command)?;
        Ok(())
    }

    fn run(&mut self, sql: &str) -> Result<Vec<serde_json::Value>> {
        match transaction_control(sql) {
            // Same outcome as PostgreSQL, which only warns on these
            Some(TransactionControl::Begin) if !self.conn.is_autocommit() => {
                warn!("there is already a transaction in progress");
                return Ok(vec![]);
            }
            Some(TransactionControl::Finish) if self.conn.is_autocommit() => {
                warn!("there is no transaction in progress");
                return Ok(vec![]);
            }
            Some(_) => {}
            None => {
                if self.conn.is_autocommit() {
                    self.conn.execute_batch("BEGIN")?;
                }
            }
        }

        // A unit may hold several statements written on one line
        let mut data = Vec::new();
        let mut batch = Batch::new(&self.conn, sql);
        while let Some(mut stmt) = batch.next()? {
            if stmt.column_count() == 0 {
                stmt.execute([])?;
                continue;
            }
            data.extend(query_rows(&mut stmt)?);
        }

        Ok(data)
    }
}

// Run a row-returning statement and map every row to a JSON object
fn query_rows(stmt: &mut rusqlite::Statement<'_>) -> Result<Vec<serde_json::Value>> {
    let column_names: Vec<String> = stmt
        .column_names()
        .into_iter()
        .map(|name| name.to_string())
        .collect();
    let rows = stmt.query_map([], |row| {
        let mut obj = serde_json::Map::new();
        for (idx, name) in column_names.iter().enumerate() {
            obj.insert(name.clone(), value_ref_to_json(row.get_ref(idx)?));
        }
        Ok(serde_json::Value::Object(obj))
    })?;

    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

impl StatementExecutor for SqliteExecutor {
    async fn execute(&mut self, sql: &str) -> Result<Vec<serde_json::Value>> {
        self.run(sql)
    }

    async fn commit(&mut self) -> Result<()> {
        self.finish_transaction("COMMIT")
    }

    async fn rollback(&mut self) -> Result<()> {
        self.finish_transaction("ROLLBACK")
    }

    async fn close(self) -> Result<()> {
        self.conn.close().map_err(|(_, e)| e)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_value_ref_to_json() {
        use rusqlite::types::ValueRef;

        assert_eq!(value_ref_to_json(ValueRef::Integer(7)), json!(7));
        assert_eq!(value_ref_to_json(ValueRef::Real(2.5)), json!(2.5));
        assert_eq!(
            value_ref_to_json(ValueRef::Real(f64::NAN)),
            serde_json::Value::Null
        );
        assert_eq!(value_ref_to_json(ValueRef::Text(b"abc")), json!("abc"));
        assert_eq!(value_ref_to_json(ValueRef::Blob(&[1, 255])), json!([1, 255]));
        assert_eq!(value_ref_to_json(ValueRef::Null), serde_json::Value::Null);
    }

    #[tokio::test]
    async fn test_select_returns_rows_in_column_order() {
        let mut executor = SqliteExecutor::open_in_memory().unwrap();
        executor
            .execute("CREATE TABLE titles (show_id TEXT, release_year INTEGER, score REAL)")
            .await
            .unwrap();
        executor
            .execute("INSERT INTO titles VALUES ('s1', 2001, 4.5), ('s2', 1999, NULL)")
            .await
            .unwrap();
        executor.commit().await.unwrap();

        let rows = executor
            .execute("SELECT show_id, release_year, score FROM titles ORDER BY show_id;")
            .await
            .unwrap();
        executor.commit().await.unwrap();

        assert_eq!(
            rows,
            vec![
                json!({"show_id": "s1", "release_year": 2001, "score": 4.5}),
                json!({"show_id": "s2", "release_year": 1999, "score": null}),
            ]
        );
        let keys: Vec<&String> = rows[0].as_object().unwrap().keys().collect();
        assert_eq!(keys, vec!["show_id", "release_year", "score"]);
    }

    #[tokio::test]
    async fn test_rollback_discards_uncommitted_statement() {
        let mut executor = SqliteExecutor::open_in_memory().unwrap();
        executor.execute("CREATE TABLE t (id INTEGER)").await.unwrap();
        executor.commit().await.unwrap();

        executor.execute("INSERT INTO t VALUES (1)").await.unwrap();
        executor.rollback().await.unwrap();

        let count: i64 = executor
            .connection()
            .query_row("SELECT COUNT(*) FROM t", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn test_invalid_statement_is_an_error_and_rollback_recovers() {
        let mut executor = SqliteExecutor::open_in_memory().unwrap();
        assert!(executor.execute("SELEC nothing").await.is_err());
        executor.rollback().await.unwrap();
        assert!(executor.connection().is_autocommit());

        executor.execute("SELECT 1").await.unwrap();
        executor.commit().await.unwrap();
        executor.close().await.unwrap();
    }

    #[tokio::test]
    async fn test_statements_sharing_one_line_all_run() {
        let mut executor = SqliteExecutor::open_in_memory().unwrap();
        executor.execute("CREATE TABLE t (id INTEGER)").await.unwrap();
        executor.commit().await.unwrap();

        let rows = executor
            .execute("INSERT INTO t VALUES (1); INSERT INTO t VALUES (2); SELECT COUNT(*) AS n FROM t;")
            .await
            .unwrap();
        executor.commit().await.unwrap();

        assert_eq!(rows, vec![json!({"n": 2})]);
    }

    #[tokio::test]
    async fn test_failing_statement_on_shared_line_rolls_back_the_line() {
        let mut executor = SqliteExecutor::open_in_memory().unwrap();
        executor.execute("CREATE TABLE t (id INTEGER PRIMARY KEY)").await.unwrap();
        executor.commit().await.unwrap();

        let result = executor
            .execute("INSERT INTO t VALUES (1); INSERT INTO t VALUES (1);")
            .await;
        assert!(result.is_err());
        executor.rollback().await.unwrap();

        let count: i64 = executor
            .connection()
            .query_row("SELECT COUNT(*) FROM t", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn test_explicit_transaction_statements_do_not_nest() {
        let mut executor = SqliteExecutor::open_in_memory().unwrap();
        for sql in [
            "CREATE TABLE t (id INTEGER);",
            "BEGIN;",
            "INSERT INTO t VALUES (1);",
            "COMMIT;",
            "ROLLBACK;",
        ] {
            executor.execute(sql).await.unwrap();
            executor.commit().await.unwrap();
        }

        assert!(executor.connection().is_autocommit());
        let count: i64 = executor
            .connection()
            .query_row("SELECT COUNT(*) FROM t", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 1);
    }
}
