use crate::{
    result::{Result, ScriptError},
    str_utils::{is_select_statement, split_sql_statements, statement_preview},
};
use std::path::Path;
use tracing::{error, info, warn};

/// Maximum number of rows printed for a SELECT statement
pub const MAX_PREVIEW_ROWS: usize = 10;

/// Trait for executing raw SQL statements against different database backends.
///
/// Every statement runs inside an implicit transaction that the caller closes
/// with `commit` or `rollback`.
#[allow(async_fn_in_trait)]
pub trait StatementExecutor {
    /// Execute one statement and return the rows it produced (empty for non-queries)
    async fn execute(&mut self, sql: &str) -> Result<Vec<serde_json::Value>>;
    async fn commit(&mut self) -> Result<()>;
    async fn rollback(&mut self) -> Result<()>;
    /// Release the underlying connection
    async fn close(self) -> Result<()>;
}

/// A statement that could not be executed
#[derive(Debug, Clone, PartialEq)]
pub struct StatementFailure {
    /// 1-based position of the statement in the script
    pub index: usize,
    pub error: String,
    pub preview: String,
}

/// Outcome of running a whole script
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExecutionReport {
    pub executed: usize,
    pub total: usize,
    pub failures: Vec<StatementFailure>,
}

impl ExecutionReport {
    pub fn all_succeeded(&self) -> bool {
        self.executed == self.total
    }
}

impl std::fmt::Display for ExecutionReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Successfully executed {}/{} statements",
            self.executed, self.total
        )
    }
}

/// First rows of a query result plus the number of rows left out
#[derive(Debug, Clone, PartialEq)]
pub struct RowPreview {
    pub total: usize,
    pub rows: Vec<serde_json::Value>,
}

impl RowPreview {
    pub fn new(mut rows: Vec<serde_json::Value>) -> Self {
        let total = rows.len();
        rows.truncate(MAX_PREVIEW_ROWS);
        Self { total, rows }
    }

    pub fn remaining(&self) -> usize {
        self.total - self.rows.len()
    }
}

impl std::fmt::Display for RowPreview {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Results ({} rows):", self.total)?;
        for row in &self.rows {
            write!(f, "\n  {row}")?;
        }
        if self.remaining() > 0 {
            write!(f, "\n  ... and {} more rows", self.remaining())?;
        }
        Ok(())
    }
}

/// Read a SQL script and split it into statements
pub fn load_statements(path: &Path) -> Result<Vec<String>> {
    if !path.is_file() {
        return Err(ScriptError::SqlFileNotFound(path.to_path_buf()));
    }
    let sql = std::fs::read_to_string(path)?;
    Ok(split_sql_statements(&sql))
}

/// Run a SQL file and release the connection afterwards, whatever the outcome.
/// A failure while closing is logged and never hides the report.
pub async fn run_sql_file<E: StatementExecutor>(
    mut executor: E,
    path: &Path,
) -> Result<ExecutionReport> {
    let outcome = match load_statements(path) {
        Ok(statements) => {
            info!("Executing SQL file: {}", path.display());
            Ok(run_statements(&mut executor, &statements).await)
        }
        Err(e) => Err(e),
    };

    match executor.close().await {
        Ok(()) => info!("Connection closed."),
        Err(e) => warn!("Error closing connection: {e}"),
    }

    outcome
}

async fn execute_and_commit<E: StatementExecutor>(
    executor: &mut E,
    statement: &str,
) -> Result<()> {
    let rows = executor.execute(statement).await?;

    if is_select_statement(statement) && !rows.is_empty() {
        println!("{}", RowPreview::new(rows));
    }

    executor.commit().await
}

/// Execute statements one by one, committing after each success and rolling
/// back after each failure. A failing statement never stops the run.
pub async fn run_statements<E: StatementExecutor>(
    executor: &mut E,
    statements: &[String],
) -> ExecutionReport {
    let mut report = ExecutionReport {
        total: statements.len(),
        ..Default::default()
    };

    for (i, statement) in statements.iter().enumerate() {
        let index = i + 1;
        info!("[{index}/{}] Executing statement...", report.total);

        match execute_and_commit(executor, statement).await {
            Ok(()) => report.executed += 1,
            Err(e) => {
                let preview = statement_preview(statement);
                error!("Error executing statement {index}: {e}");
                error!("Statement: {preview}");

                if let Err(rollback_err) = executor.rollback().await {
                    warn!("Rollback after statement {index} failed: {rollback_err}");
                }

                report.failures.push(StatementFailure {
                    index,
                    error: e.to_string(),
                    preview,
                });
            }
        }
    }

    report
}
