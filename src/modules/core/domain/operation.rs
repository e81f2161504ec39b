//! A single data-access operation

use authgate_types::{FetchMode, Intent};

/// Ordered positional parameters (`$1`, `$2`, ...), converted to the type the
/// server describes for each slot when bound
pub type Params = Vec<serde_json::Value>;

/// One SQL statement with its parameters, intent, and expected result shape.
///
/// Built fresh for every router call and dropped afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct Operation {
    pub sql: String,
    pub params: Params,
    pub intent: Intent,
    pub fetch: FetchMode,
}

impl Operation {
    pub fn new(intent: Intent, sql: impl Into<String>, params: Params, fetch: FetchMode) -> Self {
        Self {
            sql: sql.into(),
            params,
            intent,
            fetch,
        }
    }

    /// Read operation (routed to the replica)
    pub fn read(sql: impl Into<String>, params: Params, fetch: FetchMode) -> Self {
        Self::new(Intent::Read, sql, params, fetch)
    }

    /// Write operation (routed to the primary and committed)
    pub fn write(sql: impl Into<String>, params: Params, fetch: FetchMode) -> Self {
        Self::new(Intent::Write, sql, params, fetch)
    }

    /// SQL text with every run of whitespace collapsed to a single space,
    /// suitable for a one-line log record
    pub fn normalized_sql(&self) -> String {
        self.sql.split_whitespace().collect::<Vec<_>>().join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_constructors_set_intent() {
        let read = Operation::read("SELECT 1", vec![], FetchMode::One);
        assert_eq!(read.intent, Intent::Read);
        assert_eq!(read.fetch, FetchMode::One);

        let write = Operation::write("DELETE FROM users", vec![], FetchMode::None);
        assert_eq!(write.intent, Intent::Write);
    }

    #[test]
    fn test_normalized_sql() {
        let op = Operation::write(
            "\n            INSERT INTO users (username, email, password_hash)\n\t\t VALUES ($1, $2, $3)\n            ",
            vec![json!("ana"), json!("ana@example.com"), json!("hash")],
            FetchMode::One,
        );
        assert_eq!(
            op.normalized_sql(),
            "INSERT INTO users (username, email, password_hash) VALUES ($1, $2, $3)"
        );
    }

    #[test]
    fn test_normalized_sql_excludes_params() {
        let op = Operation::read(
            "SELECT id FROM users WHERE username = $1",
            vec![json!("hunter2")],
            FetchMode::One,
        );
        assert!(!op.normalized_sql().contains("hunter2"));
    }
}
