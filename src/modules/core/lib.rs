//! Core domain logic for authgate
//!
//! This crate contains the domain models (endpoints, operations, outcomes,
//! settings), credential hashing, and the error type shared by every crate.

pub mod credentials;
pub mod domain;
pub mod error;

pub use domain::*;
pub use error::AuthgateError;
