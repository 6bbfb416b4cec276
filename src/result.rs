use std::path::PathBuf;
use thiserror::Error;

/// Main error type for pgscript
#[derive(Error, Debug)]
pub enum ScriptError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[cfg(feature = "postgresql")]
    #[error("PostgreSQL error: {0}")]
    Postgres(#[from] tokio_postgres::Error),
    #[cfg(feature = "sqlite")]
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("Missing required environment variables: {}", .missing.join(", "))]
    MissingEnvironment { missing: Vec<String> },
    #[error("Invalid port in {variable}: {value}")]
    InvalidPort { variable: String, value: String },
    #[error("SQL file not found: {}", .0.display())]
    SqlFileNotFound(PathBuf),
    #[error("Invalid count for {name}: {value}")]
    InvalidCount { name: String, value: usize },
}

impl ScriptError {
    pub fn new_missing_environment<S: Into<String>>(missing: impl IntoIterator<Item = S>) -> Self {
        ScriptError::MissingEnvironment {
            missing: missing.into_iter().map(Into::into).collect(),
        }
    }

    pub fn new_invalid_count(name: &str, value: usize) -> Self {
        ScriptError::InvalidCount {
            name: name.to_string(),
            value,
        }
    }
}

/// Type alias for Results using ScriptError
pub type Result<T> = std::result::Result<T, ScriptError>;
