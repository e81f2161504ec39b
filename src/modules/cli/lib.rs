//! authgate CLI
//!
//! This crate provides the command-line interface for authgate:
//! - run: Start the HTTP server
//! - seed: Insert or update the initial users on the primary

pub mod commands;

pub use commands::{Cli, Commands, LogFormat};
