//! Process settings, resolved once at start

use authgate_types::Role;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::time::Duration;

use super::endpoint::join_host_port;
use super::Endpoint;

/// Origins always accepted by CORS in addition to the configured frontend
const DEFAULT_ORIGINS: &[&str] = &[
    "http://localhost",
    "http://localhost:8080",
    "http://127.0.0.1",
    "http://127.0.0.1:8080",
];

/// Database endpoints and the credentials shared by both
#[derive(Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub primary_host: String,
    pub replica_host: String,
    pub port: u16,
    pub name: String,
    pub user: String,
    #[serde(skip_serializing)]
    pub password: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            primary_host: "db_primary".to_string(),
            replica_host: "db_replica".to_string(),
            port: 5432,
            name: "auth_db".to_string(),
            user: "user_auth".to_string(),
            password: "password_auth".to_string(),
        }
    }
}

impl DatabaseConfig {
    /// The endpoint serving the given role
    pub fn endpoint(&self, role: Role) -> Endpoint {
        match role {
            Role::Primary => Endpoint::new(Role::Primary, self.primary_host.clone(), self.port),
            Role::Replica => Endpoint::new(Role::Replica, self.replica_host.clone(), self.port),
        }
    }
}

impl fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("primary_host", &self.primary_host)
            .field("replica_host", &self.replica_host)
            .field("port", &self.port)
            .field("name", &self.name)
            .field("user", &self.user)
            .field("password", &"***")
            .finish()
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind host (default: 0.0.0.0)
    pub host: String,

    /// Bind port (default: 8000)
    pub port: u16,

    /// Frontend origin allowed by CORS
    pub frontend_origin: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            frontend_origin: "http://localhost:8080".to_string(),
        }
    }
}

impl ServerConfig {
    /// `host:port` the server binds to; IPv6 hosts are bracketed
    pub fn bind_address(&self) -> String {
        join_host_port(&self.host, self.port)
    }

    /// CORS origins: the frontend origin without a trailing slash plus the
    /// local development origins, deduplicated and sorted
    pub fn allowed_origins(&self) -> Vec<String> {
        let mut origins: BTreeSet<String> = DEFAULT_ORIGINS.iter().map(|o| o.to_string()).collect();
        let frontend = self.frontend_origin.trim().trim_end_matches('/');
        if !frontend.is_empty() {
            origins.insert(frontend.to_string());
        }
        origins.into_iter().collect()
    }
}

/// Bootstrap seeding retry policy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedConfig {
    /// Connection attempts before giving up (default: 10)
    pub max_retries: u32,

    /// Fixed delay between attempts in seconds (default: 5)
    pub retry_delay_secs: u64,
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            max_retries: 10,
            retry_delay_secs: 5,
        }
    }
}

impl SeedConfig {
    pub fn retry_delay(&self) -> Duration {
        Duration::from_secs(self.retry_delay_secs)
    }
}

/// All process settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    pub seed: SeedConfig,
}
