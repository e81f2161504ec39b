//! Translation of driver errors into service-level errors

use authgate_core::AuthgateError;

/// SQLSTATE for `unique_violation`
const UNIQUE_VIOLATION: &str = "23505";

/// SQLSTATEs meaning the server is going away or not yet accepting work
const SERVER_UNAVAILABLE: &[&str] = &["57P01", "57P02", "57P03"];

/// Classify a sqlx error as `Unavailable`, `Conflict`, or `Unclassified`
pub fn classify_sqlx_error(err: sqlx::Error) -> AuthgateError {
    match err {
        sqlx::Error::Io(e) => AuthgateError::Unavailable(e.to_string()),
        sqlx::Error::Tls(e) => AuthgateError::Unavailable(format!("TLS: {}", e)),
        sqlx::Error::Database(db) => classify_database_error(
            db.code().as_deref(),
            db.constraint(),
            db.message(),
        ),
        other => AuthgateError::Unclassified(other.to_string()),
    }
}

/// Classify a server-reported error by SQLSTATE
pub fn classify_database_error(
    code: Option<&str>,
    constraint: Option<&str>,
    message: &str,
) -> AuthgateError {
    match code {
        Some(UNIQUE_VIOLATION) => AuthgateError::Conflict(match constraint {
            Some(name) => format!("Duplicate value violates unique constraint {}", name),
            None => "Duplicate value violates a unique constraint".to_string(),
        }),
        // Class 08: connection exception
        Some(c) if c.starts_with("08") => AuthgateError::Unavailable(message.to_string()),
        Some(c) if SERVER_UNAVAILABLE.contains(&c) => {
            AuthgateError::Unavailable(message.to_string())
        }
        _ => AuthgateError::Unclassified(message.to_string()),
    }
}
