//! Connector trait definition

use async_trait::async_trait;
use authgate_core::{AuthgateError, Endpoint, Operation, Outcome};

/// Trait for database connectors
///
/// Implementations must not keep connections between calls.
#[async_trait]
pub trait Connector: Send + Sync {
    /// Execute one operation against the given endpoint
    ///
    /// # Arguments
    /// * `endpoint` - The endpoint chosen by the router
    /// * `operation` - SQL text, positional parameters, intent, and fetch mode
    ///
    /// # Returns
    /// The outcome shaped by the operation's fetch mode. Write operations are
    /// committed before this returns.
    async fn execute(
        &self,
        endpoint: &Endpoint,
        operation: &Operation,
    ) -> Result<Outcome, AuthgateError>;

    /// Get the connector type name
    fn connector_type(&self) -> &'static str;
}
