//! Type definitions for authgate
//!
//! This crate contains shared type definitions used across the authgate codebase:
//! the routing enums (intent, endpoint role, fetch mode) and the HTTP request and
//! response bodies.

pub mod api;
pub mod intent;

pub use intent::{FetchMode, Intent, Role};
