//! Error types for authgate

use thiserror::Error;

/// Main error type for authgate operations
#[derive(Error, Debug)]
pub enum AuthgateError {
    /// The selected database endpoint could not be reached, or the
    /// connection dropped mid-operation
    #[error("Database unavailable: {0}")]
    Unavailable(String),

    /// A write violated a uniqueness constraint
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Any other query execution failure
    #[error("Query execution failed: {0}")]
    Unclassified(String),

    /// Configuration loading error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Request or configuration validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Unknown user or wrong password
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// HTTP server error
    #[error("Server error: {0}")]
    Server(String),

    /// File system error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AuthgateError {
    /// Returns true if this error should be logged at error level
    pub fn is_error(&self) -> bool {
        matches!(
            self,
            AuthgateError::Unavailable(_)
                | AuthgateError::Unclassified(_)
                | AuthgateError::Server(_)
                | AuthgateError::Internal(_)
        )
    }

    /// Returns true if this error is a client error (4xx)
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            AuthgateError::Conflict(_)
                | AuthgateError::Validation(_)
                | AuthgateError::InvalidCredentials
        )
    }

    /// Returns true if the user may retry the request later
    pub fn is_retryable(&self) -> bool {
        matches!(self, AuthgateError::Unavailable(_))
    }

    /// Returns the appropriate HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            AuthgateError::Unavailable(_) => 503,
            AuthgateError::Conflict(_) => 409,
            AuthgateError::InvalidCredentials => 401,
            AuthgateError::Validation(_) => 422,
            _ => 500,
        }
    }

    /// Sanitize the error message to avoid leaking sensitive information
    pub fn sanitized_message(&self) -> String {
        match self {
            // Don't expose hosts or driver messages
            AuthgateError::Unavailable(_) => "Database service unavailable.".to_string(),

            // Conflict messages are written by the router and handlers, never the driver
            AuthgateError::Conflict(msg) => msg.clone(),
            AuthgateError::Validation(msg) => msg.clone(),
            AuthgateError::InvalidCredentials => "Invalid credentials".to_string(),

            _ => "Internal server error".to_string(),
        }
    }
}

/// Result type alias using AuthgateError
pub type Result<T> = std::result::Result<T, AuthgateError>;
