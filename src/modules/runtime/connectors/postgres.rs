//! PostgreSQL connector implementation

use async_trait::async_trait;
use authgate_core::{AuthgateError, DatabaseConfig, Endpoint, Operation, Outcome, Row};
use authgate_types::FetchMode;
use sqlx::postgres::{PgConnectOptions, PgConnection, PgRow, PgTypeInfo};
use sqlx::{Column, ConnectOptions, Connection, Executor, Row as _, Statement};
use tracing::debug;

use super::classify::classify_sqlx_error;
use super::traits::Connector;
use super::values::{bind_params, column_value};

/// PostgreSQL connector
///
/// Holds only the credentials shared by every endpoint. Each call opens a
/// fresh connection and closes it before returning.
pub struct PostgresConnector {
    database: String,
    user: String,
    password: String,
}

impl PostgresConnector {
    /// Create a connector from the shared database credentials
    pub fn new(config: &DatabaseConfig) -> Self {
        Self {
            database: config.name.clone(),
            user: config.user.clone(),
            password: config.password.clone(),
        }
    }

    /// Connection options for an endpoint
    pub fn connect_options(&self, endpoint: &Endpoint) -> PgConnectOptions {
        PgConnectOptions::new()
            .host(endpoint.host.trim_start_matches('[').trim_end_matches(']'))
            .port(endpoint.port)
            .database(&self.database)
            .username(&self.user)
            .password(&self.password)
            // The router writes its own log line without parameters
            .disable_statement_logging()
    }

    /// Open a new connection to an endpoint
    pub async fn connect(&self, endpoint: &Endpoint) -> Result<PgConnection, AuthgateError> {
        self.connect_options(endpoint)
            .connect()
            .await
            .map_err(classify_sqlx_error)
    }

    /// Run the statement on an open connection and shape the result.
    ///
    /// The statement is prepared first so each parameter can be converted to
    /// the type the server expects for its slot.
    async fn run(conn: &mut PgConnection, operation: &Operation) -> Result<Outcome, AuthgateError> {
        let statement = (&mut *conn)
            .prepare(operation.sql.as_str())
            .await
            .map_err(classify_sqlx_error)?;
        let targets: Vec<PgTypeInfo> = statement
            .parameters()
            .and_then(|params| params.left())
            .map(<[PgTypeInfo]>::to_vec)
            .unwrap_or_default();

        let query = bind_params(sqlx::query(&operation.sql), &operation.params, &targets)?;

        match operation.fetch {
            FetchMode::None => {
                let done = query
                    .execute(&mut *conn)
                    .await
                    .map_err(classify_sqlx_error)?;
                Ok(Outcome::Affected(done.rows_affected()))
            }
            FetchMode::One => {
                let row = query
                    .fetch_optional(&mut *conn)
                    .await
                    .map_err(classify_sqlx_error)?;
                Ok(Outcome::Row(row.as_ref().map(Self::convert_row).transpose()?))
            }
            FetchMode::All => {
                let rows = query
                    .fetch_all(&mut *conn)
                    .await
                    .map_err(classify_sqlx_error)?;
                let rows = rows
                    .iter()
                    .map(Self::convert_row)
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Outcome::Rows(rows))
            }
        }
    }

    /// Convert a PostgreSQL row, keeping the server's column order
    fn convert_row(row: &PgRow) -> Result<Row, AuthgateError> {
        let columns = row.columns();
        let names = columns.iter().map(|c| c.name().to_string()).collect();
        let values = columns
            .iter()
            .map(|c| column_value(row, c))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Row::new(names, values))
    }
}

#[async_trait]
impl Connector for PostgresConnector {
    async fn execute(
        &self,
        endpoint: &Endpoint,
        operation: &Operation,
    ) -> Result<Outcome, AuthgateError> {
        let mut conn = self.connect(endpoint).await?;

        let outcome = if operation.intent.commits() {
            let mut tx = conn.begin().await.map_err(classify_sqlx_error)?;
            let outcome = Self::run(&mut tx, operation).await?;
            tx.commit().await.map_err(classify_sqlx_error)?;
            outcome
        } else {
            Self::run(&mut conn, operation).await?
        };

        // The outcome is final at this point; a failed goodbye only loses the socket
        if let Err(e) = conn.close().await {
            debug!("Error closing connection to {}: {}", endpoint, e);
        }

        Ok(outcome)
    }

    fn connector_type(&self) -> &'static str {
        "postgres"
    }
}
