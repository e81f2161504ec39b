//! Settings validation

use authgate_core::{AuthgateError, Settings};
use once_cell::sync::Lazy;
use regex::Regex;
use std::net::Ipv6Addr;

/// Host names, IPv4 addresses, and bracketed IPv6 addresses; bare IPv6 is parsed separately
static HOST_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:[A-Za-z0-9](?:[A-Za-z0-9_.-]*[A-Za-z0-9])?|\[[0-9A-Fa-f:.]+\])$").unwrap()
});

/// Database and role names
static IDENTIFIER_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_$-]*$").unwrap());

/// Browser origins: scheme, host, optional port, optional trailing slash
static ORIGIN_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^https?://[^\s/?#]+/?$").unwrap());

/// Settings validator
pub struct ConfigValidator;

impl ConfigValidator {
    pub fn new() -> Self {
        Self
    }

    /// Validate the entire settings struct
    pub fn validate(&self, settings: &Settings) -> Result<(), AuthgateError> {
        let db = &settings.database;
        self.validate_host("PRIMARY_DB_HOST", &db.primary_host)?;
        self.validate_host("REPLICA_DB_HOST", &db.replica_host)?;
        self.validate_port("DB_PORT", db.port)?;
        self.validate_identifier("POSTGRES_DB", &db.name)?;
        self.validate_identifier("POSTGRES_USER", &db.user)?;

        let server = &settings.server;
        self.validate_host("HOST", &server.host)?;
        self.validate_port("PORT", server.port)?;
        if !ORIGIN_PATTERN.is_match(&server.frontend_origin) {
            return Err(AuthgateError::Validation(format!(
                "Invalid FRONTEND_ORIGIN '{}': expected http(s)://host[:port]",
                server.frontend_origin
            )));
        }

        if settings.seed.max_retries == 0 {
            return Err(AuthgateError::Validation(
                "SEED_MAX_RETRIES must be at least 1".to_string(),
            ));
        }

        Ok(())
    }

    fn validate_host(&self, var: &str, host: &str) -> Result<(), AuthgateError> {
        if HOST_PATTERN.is_match(host) || host.parse::<Ipv6Addr>().is_ok() {
            Ok(())
        } else {
            Err(AuthgateError::Validation(format!(
                "Invalid {} '{}': expected a host name or IP address",
                var, host
            )))
        }
    }

    fn validate_port(&self, var: &str, port: u16) -> Result<(), AuthgateError> {
        if port == 0 {
            return Err(AuthgateError::Validation(format!("{} cannot be 0", var)));
        }
        Ok(())
    }

    fn validate_identifier(&self, var: &str, value: &str) -> Result<(), AuthgateError> {
        if IDENTIFIER_PATTERN.is_match(value) {
            Ok(())
        } else {
            Err(AuthgateError::Validation(format!(
                "Invalid {} '{}'",
                var, value
            )))
        }
    }
}

impl Default for ConfigValidator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings_are_valid() {
        assert!(ConfigValidator::new().validate(&Settings::default()).is_ok());
    }

    #[test]
    fn test_hosts() {
        let validator = ConfigValidator::new();
        assert!(validator.validate_host("H", "db_replica").is_ok());
        assert!(validator.validate_host("H", "10.0.0.12").is_ok());
        assert!(validator.validate_host("H", "[::1]").is_ok());
        assert!(validator.validate_host("H", "::").is_ok());
        assert!(validator.validate_host("H", "fd00::5").is_ok());
        assert!(validator.validate_host("H", ":::").is_err());
        assert!(validator.validate_host("H", "").is_err());
        assert!(validator.validate_host("H", "db primary").is_err());
        assert!(validator.validate_host("H", "-db").is_err());
    }

    #[test]
    fn test_ipv6_wildcard_bind_host() {
        let mut settings = Settings::default();
        settings.server.host = "::".to_string();
        assert!(ConfigValidator::new().validate(&settings).is_ok());
        assert_eq!(settings.server.bind_address(), "[::]:8000");
    }

    #[test]
    fn test_zero_port_rejected() {
        let mut settings = Settings::default();
        settings.database.port = 0;
        assert!(ConfigValidator::new().validate(&settings).is_err());
    }

    #[test]
    fn test_origins() {
        let mut settings = Settings::default();
        settings.server.frontend_origin = "https://app.example.com:8443/".to_string();
        assert!(ConfigValidator::new().validate(&settings).is_ok());

        settings.server.frontend_origin = "app.example.com".to_string();
        assert!(ConfigValidator::new().validate(&settings).is_err());

        settings.server.frontend_origin = "https://app.example.com/login".to_string();
        assert!(ConfigValidator::new().validate(&settings).is_err());
    }

    #[test]
    fn test_seed_retries_must_be_positive() {
        let mut settings = Settings::default();
        settings.seed.max_retries = 0;
        assert!(matches!(
            ConfigValidator::new().validate(&settings),
            Err(AuthgateError::Validation(_))
        ));
    }
}
