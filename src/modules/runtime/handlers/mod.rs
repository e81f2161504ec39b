//! HTTP request handlers for the authgate server
//!
//! This module contains handlers for health checks, user registration and
//! listing, login, and the test-item endpoints.

mod health;
mod items;
mod login;
mod users;
mod validator;

pub use health::HealthHandler;
pub use items::ItemsHandler;
pub use login::LoginHandler;
pub use users::UsersHandler;
pub use validator::InputValidator;

use authgate_core::AuthgateError;
use authgate_types::api::ErrorResponse;
use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use tracing::{error, warn};

/// Error returned by handlers; renders as `{"detail": "..."}`
#[derive(Debug)]
pub struct ApiError(pub AuthgateError);

impl From<AuthgateError> for ApiError {
    fn from(err: AuthgateError) -> Self {
        Self(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self(AuthgateError::Validation(rejection.body_text()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let err = self.0;
        if err.is_error() {
            error!("Request failed: {}", err);
        } else if !err.is_client_error() {
            warn!("Request failed: {}", err);
        }

        let status =
            StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(ErrorResponse::new(err.sanitized_message()))).into_response()
    }
}

/// Handler result type
pub type ApiResult<T> = Result<Json<T>, ApiError>;

#[cfg(test)]
pub(crate) mod testing {
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use axum::Router;
    use serde_json::Value;
    use std::sync::Arc;
    use tower::ServiceExt;

    use crate::router::testing::{router_with, FakeConnector};
    use crate::server::Runtime;
    use authgate_core::Settings;

    pub fn app(connector: Arc<FakeConnector>) -> Router {
        Runtime::with_router(Settings::default(), Arc::new(router_with(connector))).build_router()
    }

    pub async fn send(app: Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(json) => {
                builder = builder.header("content-type", "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };
        let response = app.oneshot(builder.body(body).unwrap()).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_status() {
        let response = ApiError(AuthgateError::Unavailable("refused".into())).into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

        let response = ApiError(AuthgateError::Conflict("dup".into())).into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);

        let response = ApiError(AuthgateError::Unclassified("boom".into())).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
