use crate::{config::PostgresConfig, result::Result, runner::StatementExecutor};
use tokio::task::JoinHandle;
use tokio_postgres::{Client, NoTls, SimpleQueryMessage, SimpleQueryRow};
use tracing::{debug, warn};

// Text protocol value to JSON; NULL stays null
fn text_to_json(value: Option<&str>) -> serde_json::Value {
    match value {
        Some(text) => serde_json::Value::String(text.to_string()),
        None => serde_json::Value::Null,
    }
}

// Convert a single simple-query row to a JSON object keyed by column name
fn row_to_json_object(row: &SimpleQueryRow) -> serde_json::Map<String, serde_json::Value> {
    let mut obj = serde_json::Map::new();
    for (idx, column) in row.columns().iter().enumerate() {
        obj.insert(column.name().to_string(), text_to_json(row.get(idx)));
    }
    obj
}

/// Map simple-query messages to JSON rows, skipping command completions
pub fn map_messages_to_json_data(messages: Vec<SimpleQueryMessage>) -> Vec<serde_json::Value> {
    messages
        .into_iter()
        .filter_map(|message| match message {
            SimpleQueryMessage::Row(row) => Some(serde_json::Value::Object(row_to_json_object(&row))),
            _ => None,
        })
        .collect()
}

/// PostgreSQL backend.
///
/// Statements go through the simple query protocol so any SQL text can run
/// without parameter preparation. A transaction is opened lazily before the
/// first statement after each commit or rollback.
pub struct PostgresExecutor {
    client: Client,
    connection: JoinHandle<()>,
    in_transaction: bool,
}

impl PostgresExecutor {
    /// Connect using settings read from the environment
    pub async fn connect(config: &PostgresConfig) -> Result<Self> {
        Self::connect_with(config.to_pg_config()).await
    }

    /// Connect using a libpq-style connection string
    pub async fn connect_str(connection_string: &str) -> Result<Self> {
        let config: tokio_postgres::Config = connection_string.parse()?;
        Self::connect_with(config).await
    }

    async fn connect_with(config: tokio_postgres::Config) -> Result<Self> {
        let (client, connection) = config.connect(NoTls).await?;

        // Run the connection in the background
        let connection = tokio::spawn(async move {
            if let Err(e) = connection.await {
                warn!("Connection error: {e}");
            }
        });

        Ok(Self {
            client,
            connection,
            in_transaction: false,
        })
    }

    async fn ensure_transaction(&mut self) -> Result<()> {
        if !self.in_transaction {
            self.client.batch_execute("BEGIN").await?;
            self.in_transaction = true;
        }
        Ok(())
    }

    async fn finish_transaction(&mut self, command: &str) -> Result<()> {
        if !self.in_transaction {
            return Ok(());
        }
        self.in_transaction = false;
        self.client.batch_execute(command).await?;
        Ok(())
    }
}

impl StatementExecutor for PostgresExecutor {
    async fn execute(&mut self, sql: &str) -> Result<Vec<serde_json::Value>> {
        self.ensure_transaction().await?;
        let messages = self.client.simple_query(sql).await?;
        Ok(map_messages_to_json_data(messages))
    }

    async fn commit(&mut self) -> Result<()> {
        self.finish_transaction("COMMIT").await
    }

    async fn rollback(&mut self) -> Result<()> {
        self.finish_transaction("ROLLBACK").await
    }

    async fn close(self) -> Result<()> {
        let PostgresExecutor {
            client, connection, ..
        } = self;

        // Dropping the client ends the connection task
        drop(client);
        if let Err(e) = connection.await {
            warn!("Connection task did not shut down cleanly: {e}");
        }
        debug!("PostgreSQL connection closed");
        Ok(())
    }
}
