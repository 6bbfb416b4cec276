pub mod config;
pub mod csv_writer;
pub mod logging;
pub mod result;
pub mod runner;
#[cfg(feature = "postgresql")]
pub mod runner_postgresql;
#[cfg(feature = "sqlite")]
pub mod runner_sqlite;
pub mod sample_data;
pub mod str_utils;

// Re-export types for convenience
pub use config::PostgresConfig;
pub use result::{Result, ScriptError};
pub use runner::{
    ExecutionReport, StatementExecutor, StatementFailure, load_statements, run_sql_file,
    run_statements,
};
#[cfg(feature = "postgresql")]
pub use runner_postgresql::PostgresExecutor;
#[cfg(feature = "sqlite")]
pub use runner_sqlite::SqliteExecutor;
pub use sample_data::SampleDataPlan;
pub use str_utils::split_sql_statements;

// Re-export third-party types used in the public API to provide fallback for dependency conflicts
pub use serde_json::Value as JsonValue;
