//! Database endpoint

use authgate_types::Role;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A database endpoint: network address plus role
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoint {
    /// Host name or IP address
    pub host: String,

    /// TCP port
    pub port: u16,

    /// Whether this endpoint is the primary or a replica
    pub role: Role,
}

impl Endpoint {
    /// Create a new endpoint
    pub fn new(role: Role, host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            role,
        }
    }

    /// `host:port` form of the address
    pub fn address(&self) -> String {
        join_host_port(&self.host, self.port)
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.role, self.address())
    }
}

/// `host:port`, bracketing a bare IPv6 host
pub(crate) fn join_host_port(host: &str, port: u16) -> String {
    if host.contains(':') && !host.starts_with('[') {
        format!("[{}]:{}", host, port)
    } else {
        format!("{}:{}", host, port)
    }
}
