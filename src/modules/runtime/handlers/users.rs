//! User listing and registration handlers

use authgate_core::credentials::hash_password;
use authgate_core::{AuthgateError, Row};
use authgate_types::api::{UserCreate, UserCreatedResponse, UserListResponse, UserRecord};
use authgate_types::Role;
use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde_json::json;
use tracing::info;

use super::{ApiResult, InputValidator};
use crate::state::AppState;

const LIST_USERS: &str = "SELECT id, username, email, created_at FROM users ORDER BY id DESC";

const INSERT_USER: &str = r#"
    INSERT INTO users (username, email, password_hash)
    VALUES ($1, $2, $3)
    RETURNING id, username, email, created_at
"#;

/// Handler for the user endpoints
pub struct UsersHandler;

impl UsersHandler {
    /// Handle GET /api/users
    pub async fn list(State(state): State<AppState>) -> ApiResult<UserListResponse> {
        let rows = state.router.read_all(LIST_USERS, vec![]).await?;
        let users = rows.iter().map(user_from_row).collect::<Result<Vec<_>, _>>()?;

        Ok(Json(UserListResponse {
            read_from: Role::Replica,
            users,
        }))
    }

    /// Handle POST /api/users
    pub async fn create(
        State(state): State<AppState>,
        payload: Result<Json<UserCreate>, JsonRejection>,
    ) -> ApiResult<UserCreatedResponse> {
        let Json(payload) = payload?;
        InputValidator::new().validate_user(&payload)?;

        let params = vec![
            json!(payload.username),
            json!(payload.email),
            json!(hash_password(&payload.password)),
        ];
        let row = state
            .router
            .write_one(INSERT_USER, params)
            .await
            .map_err(|e| match e {
                AuthgateError::Conflict(_) => {
                    AuthgateError::Conflict("User or email already exists.".to_string())
                }
                other => other,
            })?
            .ok_or_else(|| AuthgateError::Internal("INSERT ... RETURNING produced no row".to_string()))?;

        let user = user_from_row(&row)?;
        info!("Created user '{}' (id {})", user.username, user.id);

        Ok(Json(UserCreatedResponse {
            write_to: Role::Primary,
            user,
        }))
    }
}

fn user_from_row(row: &Row) -> Result<UserRecord, AuthgateError> {
    Ok(UserRecord {
        id: row.get_i64("id")?,
        username: row.get_str("username")?.to_string(),
        email: row.get_str("email")?.to_string(),
        created_at: row.get_opt_str("created_at")?.map(str::to_string),
    })
}
