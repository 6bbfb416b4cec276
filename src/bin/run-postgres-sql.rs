use anyhow::Context;
use clap::Parser;
use pgscript::{
    ExecutionReport, PostgresConfig, PostgresExecutor, ScriptError, SqliteExecutor,
    config::ENV_HELP, logging, run_sql_file,
};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(name = "run-postgres-sql")]
#[command(version)]
#[command(about = "Execute a SQL file statement by statement, committing after each one")]
#[command(after_help = ENV_HELP)]
struct Args {
    /// SQL file to execute
    #[arg(value_name = "SQL_FILE")]
    sql_file: PathBuf,

    /// Run against this SQLite database file instead of PostgreSQL
    #[arg(long, value_name = "DB_PATH")]
    sqlite: Option<PathBuf>,
}

async fn run(args: Args) -> anyhow::Result<ExecutionReport> {
    match &args.sqlite {
        Some(db_path) => {
            info!("Opening SQLite database {}...", db_path.display());
            let executor = SqliteExecutor::open(db_path)
                .with_context(|| format!("Error opening SQLite database {}", db_path.display()))?;
            Ok(run_sql_file(executor, &args.sql_file).await?)
        }
        None => {
            let config = PostgresConfig::from_env()?;
            info!("Connecting to Postgres at {}:{}...", config.host, config.port);
            let executor = PostgresExecutor::connect(&config)
                .await
                .context("Error connecting to Postgres")?;
            Ok(run_sql_file(executor, &args.sql_file).await?)
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            let _ = e.print();
            return if e.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    let _ = dotenvy::dotenv();
    logging::init_tracing();

    match run(args).await {
        Ok(report) => {
            println!("{}", "=".repeat(60));
            println!("{report}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("Error: {e:#}");
            if let Some(ScriptError::MissingEnvironment { .. }) = e.downcast_ref::<ScriptError>() {
                eprintln!("\n{ENV_HELP}");
            }
            ExitCode::FAILURE
        }
    }
}
