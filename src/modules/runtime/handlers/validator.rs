//! Input validation for request bodies

use authgate_core::AuthgateError;
use authgate_types::api::{LoginRequest, TestItemCreate, UserCreate};
use once_cell::sync::Lazy;
use regex::Regex;

/// Pragmatic email check: one `@`, no whitespace, a dotted domain
static EMAIL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^@\s]+@[A-Za-z0-9](?:[A-Za-z0-9-]*[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]*[A-Za-z0-9])?)+$")
        .unwrap()
});

/// Input validator for request bodies
pub struct InputValidator;

impl InputValidator {
    pub fn new() -> Self {
        Self
    }

    pub fn validate_user(&self, user: &UserCreate) -> Result<(), AuthgateError> {
        Self::require("username", &user.username)?;
        Self::require("password", &user.password)?;
        if !EMAIL_PATTERN.is_match(&user.email) {
            return Err(AuthgateError::Validation(format!(
                "email: '{}' is not a valid email address",
                user.email
            )));
        }
        Ok(())
    }

    pub fn validate_login(&self, login: &LoginRequest) -> Result<(), AuthgateError> {
        Self::require("username", &login.username)?;
        Self::require("password", &login.password)
    }

    pub fn validate_item(&self, item: &TestItemCreate) -> Result<(), AuthgateError> {
        Self::require("name", &item.name)
    }

    fn require(field: &str, value: &str) -> Result<(), AuthgateError> {
        if value.trim().is_empty() {
            return Err(AuthgateError::Validation(format!("{}: must not be empty", field)));
        }
        Ok(())
    }
}

impl Default for InputValidator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(username: &str, email: &str, password: &str) -> UserCreate {
        UserCreate {
            username: username.to_string(),
            email: email.to_string(),
            password: password.to_string(),
        }
    }

    #[test]
    fn test_valid_user() {
        let validator = InputValidator::new();
        assert!(validator.validate_user(&user("ana", "ana@example.com", "secret")).is_ok());
        assert!(validator
            .validate_user(&user("juan", "juan.perez+test@mail.example.org", "prueba123"))
            .is_ok());
    }

    #[test]
    fn test_invalid_email() {
        let validator = InputValidator::new();
        for email in ["ana", "ana@", "@example.com", "ana@example", "ana @example.com", "ana@-x.com"] {
            let result = validator.validate_user(&user("ana", email, "secret"));
            assert!(
                matches!(result, Err(AuthgateError::Validation(_))),
                "{} should be rejected",
                email
            );
        }
    }

    #[test]
    fn test_blank_fields() {
        let validator = InputValidator::new();
        assert!(validator.validate_user(&user("  ", "ana@example.com", "secret")).is_err());
        assert!(validator.validate_user(&user("ana", "ana@example.com", "")).is_err());

        let login = LoginRequest {
            username: "ana".to_string(),
            password: String::new(),
        };
        assert!(validator.validate_login(&login).is_err());

        let item = TestItemCreate {
            name: "".to_string(),
            description: None,
        };
        assert!(validator.validate_item(&item).is_err());
    }
}
