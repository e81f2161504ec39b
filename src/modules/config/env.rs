//! Environment variable loading

use authgate_core::{AuthgateError, DatabaseConfig, SeedConfig, ServerConfig, Settings};
use std::collections::HashMap;
use std::fmt::Display;
use std::str::FromStr;
use tracing::debug;

type Lookup = Box<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// Reads settings from a variable source.
///
/// Empty values count as unset, so `FOO=` in a `.env` file falls back to the
/// default.
pub struct EnvLoader {
    lookup: Lookup,
}

impl EnvLoader {
    /// Read from the process environment, loading `.env` first if present
    pub fn from_process() -> Self {
        // Missing .env is fine
        match dotenvy::dotenv() {
            Ok(path) => debug!("Loaded environment from {}", path.display()),
            Err(e) if e.not_found() => {}
            Err(e) => debug!("Ignoring unreadable .env file: {}", e),
        }
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read from an arbitrary lookup function
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String> + Send + Sync + 'static,
    {
        Self {
            lookup: Box::new(lookup),
        }
    }

    /// Read from a fixed set of pairs
    pub fn from_pairs(pairs: &[(&str, &str)]) -> Self {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Self::from_lookup(move |name| vars.get(name).cloned())
    }

    /// Value of a variable, `None` when unset or blank
    pub fn var(&self, name: &str) -> Option<String> {
        (self.lookup)(name).filter(|v| !v.trim().is_empty())
    }

    fn string_or(&self, name: &str, default: &str) -> String {
        self.var(name).unwrap_or_else(|| default.to_string())
    }

    fn parse_or<T>(&self, name: &str, default: T) -> Result<T, AuthgateError>
    where
        T: FromStr,
        T::Err: Display,
    {
        match self.var(name) {
            Some(raw) => raw.trim().parse().map_err(|e| {
                AuthgateError::Config(format!("Invalid value for {}: '{}' ({})", name, raw, e))
            }),
            None => Ok(default),
        }
    }

    /// Build the full settings struct
    pub fn load(&self) -> Result<Settings, AuthgateError> {
        let db_defaults = DatabaseConfig::default();
        let primary_host = self
            .var("PRIMARY_DB_HOST")
            .or_else(|| self.var("DB_HOST"))
            .unwrap_or(db_defaults.primary_host);

        let database = DatabaseConfig {
            primary_host,
            replica_host: self.string_or("REPLICA_DB_HOST", &db_defaults.replica_host),
            port: self.parse_or("DB_PORT", db_defaults.port)?,
            name: self.string_or("POSTGRES_DB", &db_defaults.name),
            user: self.string_or("POSTGRES_USER", &db_defaults.user),
            password: self.string_or("POSTGRES_PASSWORD", &db_defaults.password),
        };

        let server_defaults = ServerConfig::default();
        let server = ServerConfig {
            host: self.string_or("HOST", &server_defaults.host),
            port: self.parse_or("PORT", server_defaults.port)?,
            frontend_origin: self.string_or("FRONTEND_ORIGIN", &server_defaults.frontend_origin),
        };

        let seed_defaults = SeedConfig::default();
        let seed = SeedConfig {
            max_retries: self.parse_or("SEED_MAX_RETRIES", seed_defaults.max_retries)?,
            retry_delay_secs: self.parse_or("SEED_RETRY_DELAY_SECS", seed_defaults.retry_delay_secs)?,
        };

        Ok(Settings {
            database,
            server,
            seed,
        })
    }
}
