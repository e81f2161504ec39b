//! Database connectors for authgate
//!
//! A connector opens a connection to one endpoint, runs one operation, and
//! closes the connection again. Which endpoint to use is the router's job.

mod classify;
mod postgres;
mod traits;
mod values;

pub use classify::{classify_database_error, classify_sqlx_error};
pub use postgres::PostgresConnector;
pub use traits::Connector;
