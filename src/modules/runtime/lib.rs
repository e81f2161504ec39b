//! Runtime for authgate
//!
//! This crate provides the read/write query router, the PostgreSQL connector,
//! the HTTP handlers and server, and the bootstrap seeder.

pub mod connectors;
pub mod handlers;
pub mod router;
pub mod seed;
pub mod server;
pub mod state;

pub use connectors::{Connector, PostgresConnector};
pub use router::QueryRouter;
pub use seed::{SeedUser, Seeder};
pub use server::Runtime;
pub use state::AppState;
