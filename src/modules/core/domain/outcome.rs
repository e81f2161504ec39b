//! Operation results

use authgate_types::FetchMode;
use serde_json::Value;

use crate::error::{AuthgateError, Result};

/// A single result row, in server column order
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    columns: Vec<String>,
    values: Vec<Value>,
}

impl Row {
    /// Create a row from parallel column-name and value lists
    pub fn new(columns: Vec<String>, values: Vec<Value>) -> Self {
        debug_assert_eq!(columns.len(), values.len());
        Self { columns, values }
    }

    /// Build a row from `(column, value)` pairs
    pub fn from_pairs<I, K>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        let (columns, values) = pairs.into_iter().map(|(k, v)| (k.into(), v)).unzip();
        Self { columns, values }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Value by column name (first match)
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.columns
            .iter()
            .position(|c| c == column)
            .map(|idx| &self.values[idx])
    }

    /// Value by position
    pub fn get_index(&self, idx: usize) -> Option<&Value> {
        self.values.get(idx)
    }

    /// Required integer column
    pub fn get_i64(&self, column: &str) -> Result<i64> {
        self.get(column)
            .and_then(Value::as_i64)
            .ok_or_else(|| Self::bad_column(column, "integer"))
    }

    /// Required text column
    pub fn get_str(&self, column: &str) -> Result<&str> {
        self.get(column)
            .and_then(Value::as_str)
            .ok_or_else(|| Self::bad_column(column, "text"))
    }

    /// Nullable text column; a missing column is an error, SQL NULL is `None`
    pub fn get_opt_str(&self, column: &str) -> Result<Option<&str>> {
        match self.get(column) {
            Some(Value::Null) => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.as_str())),
            _ => Err(Self::bad_column(column, "nullable text")),
        }
    }

    /// Convert into a JSON object keyed by column name
    pub fn into_object(self) -> serde_json::Map<String, Value> {
        self.columns.into_iter().zip(self.values).collect()
    }

    fn bad_column(column: &str, expected: &str) -> AuthgateError {
        AuthgateError::Internal(format!(
            "column '{}' is missing or not {}",
            column, expected
        ))
    }
}

/// Result payload of one operation, shaped by its fetch mode
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// `FetchMode::None`: number of rows affected
    Affected(u64),
    /// `FetchMode::One`: the first row, `None` when the statement returned nothing
    Row(Option<Row>),
    /// `FetchMode::All`: every row in server order
    Rows(Vec<Row>),
}

impl Outcome {
    /// The fetch mode that produces this shape
    pub fn fetch_mode(&self) -> FetchMode {
        match self {
            Outcome::Affected(_) => FetchMode::None,
            Outcome::Row(_) => FetchMode::One,
            Outcome::Rows(_) => FetchMode::All,
        }
    }

    pub fn into_row(self) -> Result<Option<Row>> {
        match self {
            Outcome::Row(row) => Ok(row),
            other => Err(Self::shape_mismatch(FetchMode::One, &other)),
        }
    }

    pub fn into_rows(self) -> Result<Vec<Row>> {
        match self {
            Outcome::Rows(rows) => Ok(rows),
            other => Err(Self::shape_mismatch(FetchMode::All, &other)),
        }
    }

    pub fn rows_affected(&self) -> Result<u64> {
        match self {
            Outcome::Affected(n) => Ok(*n),
            other => Err(Self::shape_mismatch(FetchMode::None, other)),
        }
    }

    fn shape_mismatch(expected: FetchMode, actual: &Outcome) -> AuthgateError {
        AuthgateError::Internal(format!(
            "expected '{}' outcome, got '{}'",
            expected,
            actual.fetch_mode()
        ))
    }
}
