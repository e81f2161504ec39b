//! Routing enums: operation intent, endpoint role, and result fetch mode

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Caller-declared classification of a data-access operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Intent {
    /// Read-only operation, served by the replica
    Read,
    /// Mutating operation, served by the primary and committed
    Write,
}

impl Intent {
    /// The endpoint role an operation with this intent is routed to
    pub fn role(self) -> Role {
        match self {
            Intent::Read => Role::Replica,
            Intent::Write => Role::Primary,
        }
    }

    /// Returns true if the operation must be committed before returning
    pub fn commits(self) -> bool {
        matches!(self, Intent::Write)
    }

    /// Log label, e.g. `READ->replica`
    pub fn label(self) -> &'static str {
        match self {
            Intent::Read => "READ->replica",
            Intent::Write => "WRITE->primary",
        }
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Intent::Read => write!(f, "read"),
            Intent::Write => write!(f, "write"),
        }
    }
}

/// Role of a database endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Writable endpoint; all commits land here first
    Primary,
    /// Read-only endpoint, eventually consistent with the primary
    Replica,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Primary => write!(f, "primary"),
            Role::Replica => write!(f, "replica"),
        }
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "primary" => Ok(Role::Primary),
            "replica" => Ok(Role::Replica),
            _ => Err(format!("Unknown endpoint role: {}", s)),
        }
    }
}

/// Expected shape of an operation's result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FetchMode {
    /// No rows; only the affected-row count
    #[default]
    None,
    /// The first row, if any
    One,
    /// Every row, in server order
    All,
}

impl fmt::Display for FetchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchMode::None => write!(f, "none"),
            FetchMode::One => write!(f, "one"),
            FetchMode::All => write!(f, "all"),
        }
    }
}

impl FromStr for FetchMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "none" => Ok(FetchMode::None),
            "one" => Ok(FetchMode::One),
            "all" => Ok(FetchMode::All),
            _ => Err(format!("Unknown fetch mode: {}", s)),
        }
    }
}
