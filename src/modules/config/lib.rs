//! Configuration loading for authgate
//!
//! Settings come from the process environment (after loading a `.env` file if
//! one exists) and are validated once, at process start.

pub mod env;
pub mod validator;

pub use env::EnvLoader;
pub use validator::ConfigValidator;

use authgate_core::{AuthgateError, Settings};

/// Load and validate settings from the process environment
pub fn load_settings() -> Result<Settings, AuthgateError> {
    load_from(&EnvLoader::from_process())
}

/// Load and validate settings from the given source
pub fn load_from(loader: &EnvLoader) -> Result<Settings, AuthgateError> {
    let settings = loader.load()?;

    let validator = ConfigValidator::new();
    validator.validate(&settings)?;

    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_defaults() {
        let settings = load_from(&EnvLoader::from_pairs(&[])).unwrap();
        assert_eq!(settings.database.primary_host, "db_primary");
        assert_eq!(settings.server.port, 8000);
    }

    #[test]
    fn test_load_rejects_invalid_origin() {
        let loader = EnvLoader::from_pairs(&[("FRONTEND_ORIGIN", "not a url")]);
        assert!(matches!(
            load_from(&loader),
            Err(AuthgateError::Validation(_))
        ));
    }
}
