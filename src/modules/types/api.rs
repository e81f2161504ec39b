//! HTTP request and response bodies

use serde::{Deserialize, Serialize};

use crate::Role;

/// Login request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// New user registration request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserCreate {
    pub username: String,
    pub email: String,
    /// Plaintext password; hashed before it reaches the database
    pub password: String,
}

/// New test item request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestItemCreate {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// Public view of a stored user (never carries the credential hash)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub created_at: Option<String>,
}

/// Response for `GET /api/users`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserListResponse {
    pub read_from: Role,
    pub users: Vec<UserRecord>,
}

/// Response for `POST /api/users`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserCreatedResponse {
    pub write_to: Role,
    pub user: UserRecord,
}

/// Identity returned after a successful login
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoginUser {
    pub id: i64,
    pub username: String,
}

/// Response for `POST /api/login`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub message: String,
    pub user: LoginUser,
}

/// Stored test item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestItemRecord {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub created_at: Option<String>,
}

/// Response for `POST /test-items/`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestItemCreatedResponse {
    pub message: String,
    pub item: TestItemRecord,
}

/// Response for `GET /test-items/`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestItemListResponse {
    pub items: Vec<TestItemRecord>,
}

/// Overall service health
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Ok,
    Degraded,
}

/// Health of a single dependency
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentStatus {
    Ok,
    Error,
}

/// Per-dependency health
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthServices {
    pub database_read_replica: ComponentStatus,
}

/// Response for `GET /healthz`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: HealthStatus,
    pub services: HealthServices,
}

impl HealthResponse {
    /// Build a health report from the replica's status
    pub fn from_replica(replica: ComponentStatus) -> Self {
        let status = match replica {
            ComponentStatus::Ok => HealthStatus::Ok,
            ComponentStatus::Error => HealthStatus::Degraded,
        };
        Self {
            status,
            services: HealthServices {
                database_read_replica: replica,
            },
        }
    }
}

/// Error body returned by every failing route
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub detail: String,
}

impl ErrorResponse {
    pub fn new(detail: impl Into<String>) -> Self {
        Self {
            detail: detail.into(),
        }
    }
}
