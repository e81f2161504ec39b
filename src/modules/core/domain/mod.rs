//! Domain models for authgate

mod endpoint;
mod operation;
mod outcome;
mod settings;

pub use endpoint::Endpoint;
pub use operation::{Operation, Params};
pub use outcome::{Outcome, Row};
pub use settings::{DatabaseConfig, SeedConfig, ServerConfig, Settings};
