//! Read/write query routing
//!
//! Reads go to the replica, writes go to the primary. The mapping is fixed at
//! construction; nothing here is re-evaluated per call, and the router keeps
//! no state between calls.

use authgate_core::{AuthgateError, DatabaseConfig, Endpoint, Operation, Outcome, Params, Row};
use authgate_types::{FetchMode, Intent, Role};
use std::sync::Arc;
use tracing::info;

use crate::connectors::{Connector, PostgresConnector};

/// Routes each operation to the endpoint implied by its intent
pub struct QueryRouter {
    primary: Endpoint,
    replica: Endpoint,
    connector: Arc<dyn Connector>,
}

impl QueryRouter {
    /// Create a router over PostgreSQL using the configured endpoints
    pub fn new(config: &DatabaseConfig) -> Self {
        Self::with_connector(
            config.endpoint(Role::Primary),
            config.endpoint(Role::Replica),
            Arc::new(PostgresConnector::new(config)),
        )
    }

    /// Create a router with an explicit connector
    pub fn with_connector(
        primary: Endpoint,
        replica: Endpoint,
        connector: Arc<dyn Connector>,
    ) -> Self {
        debug_assert_eq!(primary.role, Role::Primary);
        debug_assert_eq!(replica.role, Role::Replica);
        Self {
            primary,
            replica,
            connector,
        }
    }

    /// The endpoint serving an intent
    pub fn endpoint(&self, intent: Intent) -> &Endpoint {
        match intent.role() {
            Role::Primary => &self.primary,
            Role::Replica => &self.replica,
        }
    }

    /// Execute one operation against the endpoint its intent selects
    pub async fn run(&self, operation: Operation) -> Result<Outcome, AuthgateError> {
        let endpoint = self.endpoint(operation.intent);
        let label = operation.intent.label();

        info!(
            route = label,
            role = %endpoint.role,
            query = %operation.normalized_sql(),
            "[{}] executing query",
            label
        );

        // Failures are logged by whoever handles them
        self.connector.execute(endpoint, &operation).await
    }

    /// Run an operation against the replica
    pub async fn run_read(
        &self,
        sql: &str,
        params: Params,
        fetch: FetchMode,
    ) -> Result<Outcome, AuthgateError> {
        self.run(Operation::read(sql, params, fetch)).await
    }

    /// Run an operation against the primary and commit it
    pub async fn run_write(
        &self,
        sql: &str,
        params: Params,
        fetch: FetchMode,
    ) -> Result<Outcome, AuthgateError> {
        self.run(Operation::write(sql, params, fetch)).await
    }

    /// Read at most one row from the replica
    pub async fn read_one(&self, sql: &str, params: Params) -> Result<Option<Row>, AuthgateError> {
        self.run_read(sql, params, FetchMode::One).await?.into_row()
    }

    /// Read every row from the replica
    pub async fn read_all(&self, sql: &str, params: Params) -> Result<Vec<Row>, AuthgateError> {
        self.run_read(sql, params, FetchMode::All).await?.into_rows()
    }

    /// Write on the primary, returning the first row the statement produced
    pub async fn write_one(&self, sql: &str, params: Params) -> Result<Option<Row>, AuthgateError> {
        self.run_write(sql, params, FetchMode::One).await?.into_row()
    }

    /// Write on the primary, returning the affected-row count
    pub async fn write(&self, sql: &str, params: Params) -> Result<u64, AuthgateError> {
        self.run_write(sql, params, FetchMode::None)
            .await?
            .rows_affected()
    }

    /// Name of the underlying connector
    pub fn connector_type(&self) -> &'static str {
        self.connector.connector_type()
    }
}
