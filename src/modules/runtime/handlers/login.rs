//! Login handler

use authgate_core::credentials::verify_password;
use authgate_core::AuthgateError;
use authgate_types::api::{LoginRequest, LoginResponse, LoginUser};
use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde_json::json;
use tracing::{info, warn};

use super::{ApiResult, InputValidator};
use crate::state::AppState;

const FIND_USER: &str = r#"
    SELECT id, username, password_hash FROM users
    WHERE username = $1
"#;

/// Handler for the login endpoint
pub struct LoginHandler;

impl LoginHandler {
    /// Handle POST /api/login
    ///
    /// Unknown users and wrong passwords both answer 401 with the same body.
    pub async fn login(
        State(state): State<AppState>,
        payload: Result<Json<LoginRequest>, JsonRejection>,
    ) -> ApiResult<LoginResponse> {
        let Json(payload) = payload?;
        InputValidator::new().validate_login(&payload)?;

        let row = state
            .router
            .read_one(FIND_USER, vec![json!(payload.username)])
            .await?;

        let row = match row {
            Some(row) if verify_password(&payload.password, row.get_str("password_hash")?) => row,
            _ => {
                warn!("Failed login for '{}'", payload.username);
                return Err(AuthgateError::InvalidCredentials.into());
            }
        };

        let user = LoginUser {
            id: row.get_i64("id")?,
            username: row.get_str("username")?.to_string(),
        };
        info!("User '{}' logged in", user.username);

        Ok(Json(LoginResponse {
            message: "Login successful".to_string(),
            user,
        }))
    }
}
